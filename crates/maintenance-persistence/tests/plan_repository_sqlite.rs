use chrono::NaiveDate;
use diesel::prelude::*;
use maintenance_domain::{DomainError, Equipment, MaintenancePlan, PlanRepository, RecurrenceUnit};
use maintenance_persistence::Database;
use plan_scheduler::{FixedClock, SchedulerConfig, SchedulerService};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

// Temporary file-backed SQLite DB; removed on drop.
struct TempDb {
  path: PathBuf,
  db: Database,
}

impl TempDb {
  fn new() -> Self {
    let path = std::env::temp_dir().join(format!("maintenance_test_{}.db", Uuid::new_v4()));
    let db = Database::connect(path.to_str().unwrap()).expect("connect sqlite");
    Self { path, db }
  }

  fn url(&self) -> String {
    self.path.to_str().unwrap().to_string()
  }
}

impl Drop for TempDb {
  fn drop(&mut self) {
    let _ = std::fs::remove_file(&self.path);
  }
}

fn d(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn plan_round_trips_through_sqlite() {
  if cfg!(feature = "pg") {
    eprintln!("skipping sqlite-only persistence test because 'pg' feature is enabled");
    return;
  }
  let t = TempDb::new();
  let repo = t.db.plans();
  let eq_id = repo.save_equipment(Equipment::new("Compressor")).unwrap();
  let plan = MaintenancePlan::new(eq_id, Some(d("2023-01-25")), 2, RecurrenceUnit::Week, 4).with_name("Filters")
                                                                                            .with_kind("Cleaning")
                                                                                            .with_note("check seals")
                                                                                            .with_duration_hours(1.5)
                                                                                            .unwrap()
                                                                                            .with_next_maintenance_date(Some(d("2023-03-01")));
  let plan_id = repo.save_plan(plan.clone()).unwrap();
  let got = repo.get_plan(&plan_id).unwrap().expect("plan stored");
  assert_eq!(got, plan);
  assert_eq!(got.next_maintenance_date(), Some(d("2023-03-01")));
  let eq = repo.get_equipment(&eq_id).unwrap().expect("equipment stored");
  assert_eq!(eq.name(), "Compressor");
  assert!(eq.is_active());
  assert!(repo.get_plan(&Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn saving_again_updates_in_place_and_keeps_listing_order() {
  if cfg!(feature = "pg") {
    return;
  }
  let t = TempDb::new();
  let repo = t.db.plans();
  let eq_id = repo.save_equipment(Equipment::new("Laptop")).unwrap();
  let first = repo.save_plan(MaintenancePlan::new(eq_id, None, 1, RecurrenceUnit::Month, 1)).unwrap();
  let second = repo.save_plan(MaintenancePlan::new(eq_id, None, 1, RecurrenceUnit::Year, 1)).unwrap();
  let third = repo.save_plan(MaintenancePlan::new(eq_id, None, 3, RecurrenceUnit::Day, 1)).unwrap();
  // re-saving the first plan must not move it to the end
  let updated = repo.get_plan(&first).unwrap().unwrap().with_horizon(5);
  repo.save_plan(updated).unwrap();
  assert_eq!(repo.list_plan_ids().unwrap(), vec![first, second, third]);
  assert_eq!(repo.get_plan(&first).unwrap().unwrap().maintenance_plan_horizon(), 5);
}

#[test]
fn equipment_and_horizon_updates() {
  if cfg!(feature = "pg") {
    return;
  }
  let t = TempDb::new();
  let repo = t.db.plans();
  let eq_id = repo.save_equipment(Equipment::new("Press")).unwrap();
  let plan_id = repo.save_plan(MaintenancePlan::new(eq_id, None, 1, RecurrenceUnit::Month, 3)).unwrap();
  repo.set_equipment_active(&eq_id, false).unwrap();
  assert!(!repo.get_equipment(&eq_id).unwrap().unwrap().is_active());
  repo.set_plan_horizon(&plan_id, 6).unwrap();
  assert_eq!(repo.get_plan(&plan_id).unwrap().unwrap().maintenance_plan_horizon(), 6);
  match repo.set_plan_horizon(&Uuid::new_v4(), 2) {
    Err(DomainError::NotFound(_)) => {}
    other => panic!("expected NotFound, got {:?}", other),
  }
  match repo.set_equipment_active(&Uuid::new_v4(), true) {
    Err(DomainError::NotFound(_)) => {}
    other => panic!("expected NotFound, got {:?}", other),
  }
}

#[test]
fn unknown_unit_in_storage_is_reported_as_invalid_unit() {
  if cfg!(feature = "pg") {
    return;
  }
  let t = TempDb::new();
  let repo = t.db.plans();
  let eq_id = repo.save_equipment(Equipment::new("Lathe")).unwrap();
  let plan_id = Uuid::new_v4();
  // write a row the domain types cannot produce
  let mut raw = SqliteConnection::establish(&t.url()).unwrap();
  diesel::sql_query(format!("INSERT INTO maintenance_plans (id, equipment_id, recurrence_quantity, recurrence_unit, \
                             maintenance_plan_horizon, created_at_ts) VALUES ('{}', '{}', 1, 'fortnight', 3, 0)",
                            plan_id, eq_id)).execute(&mut raw)
                                            .unwrap();
  match repo.get_plan(&plan_id) {
    Err(DomainError::InvalidUnit(u)) => assert_eq!(u, "fortnight"),
    other => panic!("expected InvalidUnit, got {:?}", other),
  }
  // listing still works: decoding happens per plan
  assert_eq!(repo.list_plan_ids().unwrap(), vec![plan_id]);
}

#[test]
fn unknown_unit_fails_only_its_plan_in_a_batch() {
  if cfg!(feature = "pg") {
    return;
  }
  let t = TempDb::new();
  let plans = Arc::new(t.db.plans());
  let eq_id = plans.save_equipment(Equipment::new("Laptop")).unwrap();
  let good = plans.save_plan(MaintenancePlan::new(eq_id, Some(d("2023-01-25")), 1, RecurrenceUnit::Month, 3)).unwrap();
  let broken = Uuid::new_v4();
  let mut raw = SqliteConnection::establish(&t.url()).unwrap();
  diesel::sql_query(format!("INSERT INTO maintenance_plans (id, equipment_id, start_maintenance_date, \
                             recurrence_quantity, recurrence_unit, maintenance_plan_horizon, created_at_ts) \
                             VALUES ('{}', '{}', '2023-01-25', 1, 'fortnight', 3, 0)",
                            broken, eq_id)).execute(&mut raw)
                                           .unwrap();

  let service = SchedulerService::new(plans,
                                      Arc::new(t.db.requests()),
                                      Arc::new(FixedClock::new(d("2023-01-25"))),
                                      SchedulerConfig::default());
  let report = service.run_periodic().unwrap();
  assert_eq!(report.failures.len(), 1);
  assert_eq!(report.failures[0].plan_id, broken);
  assert_eq!(report.failures[0].error, DomainError::InvalidUnit("fortnight".into()).to_string());
  let dates: Vec<NaiveDate> = report.created_for(&good).iter().map(|r| r.request_date).collect();
  assert_eq!(dates, vec![d("2023-01-25"), d("2023-02-25"), d("2023-03-25")]);
}
