use crate::connection::{Conn, Database};
use crate::schema;
use crate::schema::equipment::dsl as eq_dsl;
use crate::schema::maintenance_plans::dsl as plan_dsl;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use log::warn;
use maintenance_domain::{DomainError, Equipment, MaintenancePlan, PlanRepository, RecurrenceUnit};
use uuid::Uuid;

/// Repo Diesel que implementa `PlanRepository`.
pub struct DieselPlanRepository {
  db: Database,
}

impl DieselPlanRepository {
  pub fn new(db: Database) -> Self {
    Self { db }
  }

  fn conn(&self) -> Result<Conn, DomainError> {
    self.db.conn().map_err(|e| DomainError::ExternalError(format!("pool: {}", e)))
  }
}

// Diesel row structs
#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::equipment)]
struct EquipmentRow {
  pub id: String,
  pub name: String,
  pub active: bool,
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::maintenance_plans)]
struct PlanRow {
  pub id: String,
  pub name: Option<String>,
  pub equipment_id: String,
  pub kind: Option<String>,
  pub start_maintenance_date: Option<String>,
  pub recurrence_quantity: i64,
  pub recurrence_unit: String,
  pub maintenance_plan_horizon: i32,
  pub note: Option<String>,
  pub duration_hours: Option<f64>,
  pub next_maintenance_date: Option<String>,
  pub created_at_ts: i64,
}

fn map_db_err<T>(res: std::result::Result<T, DieselError>) -> Result<T, DomainError> {
  res.map_err(|e| DomainError::ExternalError(format!("db: {}", e)))
}

fn parse_uuid(s: &str) -> Result<Uuid, DomainError> {
  Uuid::parse_str(s).map_err(|e| DomainError::ExternalError(format!("invalid uuid {}: {}", s, e)))
}

fn horizon_to_db(horizon: u32) -> Result<i32, DomainError> {
  i32::try_from(horizon).map_err(|_| DomainError::ValidationError(format!("horizonte demasiado grande: {}", horizon)))
}

fn readable_date(plan_id: &str, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
  let s = raw?;
  match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    Ok(d) => Some(d),
    Err(e) => {
      warn!("plan {}: fecha de {} ilegible '{}': {}", plan_id, field, s, e);
      None
    }
  }
}

impl EquipmentRow {
  fn into_domain(self) -> Result<Equipment, DomainError> {
    Ok(Equipment::from_parts(parse_uuid(&self.id)?, self.name, self.active))
  }
}

impl PlanRow {
  fn from_domain(plan: &MaintenancePlan, created_at_ts: i64) -> Result<Self, DomainError> {
    Ok(Self { id: plan.id().to_string(),
              name: plan.name().map(str::to_string),
              equipment_id: plan.equipment_id().to_string(),
              kind: plan.kind().map(str::to_string),
              start_maintenance_date: plan.start_maintenance_date().map(|d| d.to_string()),
              recurrence_quantity: plan.recurrence_quantity(),
              recurrence_unit: plan.recurrence_unit().as_str().to_string(),
              maintenance_plan_horizon: horizon_to_db(plan.maintenance_plan_horizon())?,
              note: plan.note().map(str::to_string),
              duration_hours: plan.duration_hours(),
              next_maintenance_date: plan.next_maintenance_date().map(|d| d.to_string()),
              created_at_ts })
  }

  /// Decodifica la fila. Una unidad desconocida falla con `InvalidUnit`; una
  /// fecha ilegible se trata como ausente.
  fn into_domain(self) -> Result<MaintenancePlan, DomainError> {
    let unit: RecurrenceUnit = self.recurrence_unit.parse()?;
    let start = readable_date(&self.id, "inicio", self.start_maintenance_date.as_deref());
    let pinned = readable_date(&self.id, "próxima", self.next_maintenance_date.as_deref());
    let horizon = u32::try_from(self.maintenance_plan_horizon).map_err(|_| {
                    DomainError::ValidationError(format!("horizonte negativo: {}", self.maintenance_plan_horizon))
                  })?;
    let mut plan = MaintenancePlan::new(parse_uuid(&self.equipment_id)?, start, self.recurrence_quantity, unit, horizon)
      .with_id(parse_uuid(&self.id)?)
      .with_next_maintenance_date(pinned);
    if let Some(n) = self.name {
      plan = plan.with_name(n);
    }
    if let Some(k) = self.kind {
      plan = plan.with_kind(k);
    }
    if let Some(n) = self.note {
      plan = plan.with_note(n);
    }
    if let Some(h) = self.duration_hours {
      plan = plan.with_duration_hours(h)?;
    }
    Ok(plan)
  }
}

impl PlanRepository for DieselPlanRepository {
  fn save_equipment(&self, equipment: Equipment) -> Result<Uuid, DomainError> {
    let mut conn = self.conn()?;
    let row = EquipmentRow { id: equipment.id().to_string(),
                             name: equipment.name().to_string(),
                             active: equipment.is_active() };
    // Upsert: delete + insert dentro de una transacción
    map_db_err(conn.transaction::<_, DieselError, _>(|conn| {
                     diesel::delete(eq_dsl::equipment.filter(eq_dsl::id.eq(&row.id))).execute(conn)?;
                     diesel::insert_into(eq_dsl::equipment).values(&row).execute(conn)
                   }))?;
    Ok(equipment.id())
  }

  fn get_equipment(&self, id: &Uuid) -> Result<Option<Equipment>, DomainError> {
    let mut conn = self.conn()?;
    let opt = map_db_err(eq_dsl::equipment.filter(eq_dsl::id.eq(id.to_string()))
                                          .first::<EquipmentRow>(&mut conn)
                                          .optional())?;
    opt.map(EquipmentRow::into_domain).transpose()
  }

  fn set_equipment_active(&self, id: &Uuid, active: bool) -> Result<(), DomainError> {
    let mut conn = self.conn()?;
    let n = map_db_err(diesel::update(eq_dsl::equipment.filter(eq_dsl::id.eq(id.to_string())))
                         .set(eq_dsl::active.eq(active))
                         .execute(&mut conn))?;
    if n == 0 {
      return Err(DomainError::NotFound(format!("equipo {}", id)));
    }
    Ok(())
  }

  fn save_plan(&self, plan: MaintenancePlan) -> Result<Uuid, DomainError> {
    let mut conn = self.conn()?;
    let id_s = plan.id().to_string();
    // conservar la marca de creación para que el orden de listado sea estable
    let existing_ts = map_db_err(plan_dsl::maintenance_plans.filter(plan_dsl::id.eq(&id_s))
                                                            .select(plan_dsl::created_at_ts)
                                                            .first::<i64>(&mut conn)
                                                            .optional())?;
    let ts = existing_ts.unwrap_or_else(|| Utc::now().timestamp_micros());
    let row = PlanRow::from_domain(&plan, ts)?;
    map_db_err(conn.transaction::<_, DieselError, _>(|conn| {
                     diesel::delete(plan_dsl::maintenance_plans.filter(plan_dsl::id.eq(&id_s))).execute(conn)?;
                     diesel::insert_into(plan_dsl::maintenance_plans).values(&row).execute(conn)
                   }))?;
    Ok(plan.id())
  }

  fn get_plan(&self, id: &Uuid) -> Result<Option<MaintenancePlan>, DomainError> {
    let mut conn = self.conn()?;
    let opt = map_db_err(plan_dsl::maintenance_plans.filter(plan_dsl::id.eq(id.to_string()))
                                                    .first::<PlanRow>(&mut conn)
                                                    .optional())?;
    opt.map(PlanRow::into_domain).transpose()
  }

  fn list_plan_ids(&self) -> Result<Vec<Uuid>, DomainError> {
    let mut conn = self.conn()?;
    let ids = map_db_err(plan_dsl::maintenance_plans.select(plan_dsl::id)
                                                    .order((plan_dsl::created_at_ts.asc(), plan_dsl::id.asc()))
                                                    .load::<String>(&mut conn))?;
    ids.iter().map(|s| parse_uuid(s)).collect()
  }

  fn set_plan_horizon(&self, id: &Uuid, horizon: u32) -> Result<(), DomainError> {
    let mut conn = self.conn()?;
    let n = map_db_err(diesel::update(plan_dsl::maintenance_plans.filter(plan_dsl::id.eq(id.to_string())))
                         .set(plan_dsl::maintenance_plan_horizon.eq(horizon_to_db(horizon)?))
                         .execute(&mut conn))?;
    if n == 0 {
      return Err(DomainError::NotFound(format!("plan {}", id)));
    }
    Ok(())
  }
}
