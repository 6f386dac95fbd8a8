use chrono::NaiveDate;
use maintenance_domain::{MaintenancePlan, MaintenanceRequest, RecurrenceUnit, RequestStage};
use plan_scheduler::{InMemoryRequestStore, RequestChanges, RequestFilter, RequestOrder, RequestStore, SchedulerError};
use uuid::Uuid;

fn d(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn plan() -> MaintenancePlan {
  MaintenancePlan::new(Uuid::new_v4(), Some(d("2023-01-01")), 1, RecurrenceUnit::Month, 3)
}

#[test]
fn find_filters_by_plan_and_range_and_orders() {
  let store = InMemoryRequestStore::new();
  let p = plan();
  let other = plan();
  for day in ["2023-03-01", "2023-01-01", "2023-02-01"] {
    store.create(MaintenanceRequest::preventive(&p, "p", d(day))).unwrap();
  }
  store.create(MaintenanceRequest::preventive(&other, "o", d("2023-01-15"))).unwrap();

  let all = store.find(&p.id(), &RequestFilter::all(), RequestOrder::RequestDateAsc).unwrap();
  let days: Vec<NaiveDate> = all.iter().map(|r| r.request_date).collect();
  assert_eq!(days, vec![d("2023-01-01"), d("2023-02-01"), d("2023-03-01")]);

  let desc = store.find(&p.id(), &RequestFilter::all(), RequestOrder::RequestDateDesc).unwrap();
  assert_eq!(desc[0].request_date, d("2023-03-01"));

  let ranged = store.find(&p.id(), &RequestFilter::between(d("2023-01-15"), d("2023-02-15")), RequestOrder::default())
                    .unwrap();
  assert_eq!(ranged.len(), 1);
  assert_eq!(ranged[0].request_date, d("2023-02-01"));

  let from = store.find(&p.id(), &RequestFilter::from_date(d("2023-02-01")), RequestOrder::default()).unwrap();
  assert_eq!(from.len(), 2);
  assert_eq!(store.len().unwrap(), 4);
}

#[test]
fn duplicate_plan_date_is_a_conflict() {
  let store = InMemoryRequestStore::new();
  let p = plan();
  store.create(MaintenanceRequest::preventive(&p, "p", d("2023-01-01"))).unwrap();
  match store.create(MaintenanceRequest::preventive(&p, "p", d("2023-01-01"))) {
    Err(SchedulerError::Conflict(_)) => {}
    other => panic!("expected conflict, got {:?}", other),
  }
  // same date on another plan is fine
  store.create(MaintenanceRequest::preventive(&plan(), "q", d("2023-01-01"))).unwrap();
}

#[test]
fn update_changes_stage_and_dates() {
  let store = InMemoryRequestStore::new();
  let p = plan();
  let a = store.create(MaintenanceRequest::preventive(&p, "p", d("2023-01-01"))).unwrap();
  let b = store.create(MaintenanceRequest::preventive(&p, "p", d("2023-02-01"))).unwrap();

  let done = store.update(&a.id, &RequestChanges::stage(RequestStage::Repaired)).unwrap();
  assert!(done.is_done());
  assert_eq!(store.get(&a.id).unwrap().unwrap().stage, RequestStage::Repaired);

  let noted = store.update(&a.id, &RequestChanges::note("TEST-INSTRUCTIONS")).unwrap();
  assert_eq!(noted.note.as_deref(), Some("TEST-INSTRUCTIONS"));

  // moving b onto a's date collides
  match store.update(&b.id, &RequestChanges::request_date(d("2023-01-01"))) {
    Err(SchedulerError::Conflict(_)) => {}
    other => panic!("expected conflict, got {:?}", other),
  }
  let moved = store.update(&b.id, &RequestChanges::request_date(d("2023-05-01"))).unwrap();
  assert_eq!(moved.request_date, d("2023-05-01"));
  assert_eq!(moved.schedule_date, d("2023-02-01"));

  match store.update(&Uuid::new_v4(), &RequestChanges::default()) {
    Err(SchedulerError::NotFound(_)) => {}
    other => panic!("expected not found, got {:?}", other),
  }
}

#[test]
fn report_serializes_to_json() {
  let report = plan_scheduler::BatchReport::default();
  let json = serde_json::to_value(&report).unwrap();
  assert!(json["created"].as_array().unwrap().is_empty());
}
