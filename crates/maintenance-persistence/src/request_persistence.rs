// Archivo: request_persistence.rs
// Propósito: `RequestStore` sobre Diesel. La unicidad (plan, request_date) la
// garantiza el índice único de la migración; una violación se traduce a
// `SchedulerError::Conflict`.
use crate::connection::{Conn, Database, DbConn};
use crate::schema;
use crate::schema::maintenance_requests::dsl as req_dsl;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use maintenance_domain::{DomainError, MaintenanceRequest};
use plan_scheduler::{RequestChanges, RequestFilter, RequestOrder, RequestStore, Result, SchedulerError};
use uuid::Uuid;

pub struct DieselRequestStore {
    db: Database,
}

impl DieselRequestStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn conn(&self) -> Result<Conn> {
        self.db
            .conn()
            .map_err(|e| SchedulerError::Storage(format!("pool: {}", e)))
    }
}

#[derive(Debug, Queryable, Insertable)]
#[diesel(table_name = schema::maintenance_requests)]
struct RequestRow {
    pub id: String,
    pub plan_id: String,
    pub equipment_id: String,
    pub name: String,
    pub kind: Option<String>,
    pub schedule_date: String,
    pub request_date: String,
    pub stage: String,
    pub maintenance_type: String,
    pub note: Option<String>,
    pub duration_hours: Option<f64>,
}

impl RequestRow {
    fn from_domain(r: &MaintenanceRequest) -> Self {
        Self { id: r.id.to_string(),
               plan_id: r.plan_id.to_string(),
               equipment_id: r.equipment_id.to_string(),
               name: r.name.clone(),
               kind: r.kind.clone(),
               schedule_date: r.schedule_date.to_string(),
               request_date: r.request_date.to_string(),
               stage: r.stage.as_str().to_string(),
               maintenance_type: r.maintenance_type.as_str().to_string(),
               note: r.note.clone(),
               duration_hours: r.duration_hours }
    }

    fn into_domain(self) -> Result<MaintenanceRequest> {
        Ok(MaintenanceRequest { id: parse_uuid(&self.id)?,
                                plan_id: parse_uuid(&self.plan_id)?,
                                equipment_id: parse_uuid(&self.equipment_id)?,
                                name: self.name,
                                kind: self.kind,
                                schedule_date: parse_date(&self.schedule_date)?,
                                request_date: parse_date(&self.request_date)?,
                                stage: self.stage.parse()?,
                                maintenance_type: self.maintenance_type.parse()?,
                                note: self.note,
                                duration_hours: self.duration_hours })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| SchedulerError::Storage(format!("invalid uuid {}: {}", s, e)))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                                                SchedulerError::Domain(DomainError::DateOutOfRange(format!("{}: {}",
                                                                                                           s, e)))
                                            })
}

/// Traduce errores Diesel. La violación del índice único es un conflicto de
/// fecha, no un fallo de almacenamiento.
fn map_db_err(e: DieselError, plan_id: &str, date: &str) -> SchedulerError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            SchedulerError::Conflict(format!("plan {} ya tiene solicitud el {}", plan_id, date))
        }
        other => SchedulerError::Storage(format!("db: {}", other)),
    }
}

fn storage_err(e: DieselError) -> SchedulerError {
    SchedulerError::Storage(format!("db: {}", e))
}

fn load_row(conn: &mut DbConn, id: &str) -> Result<Option<RequestRow>> {
    req_dsl::maintenance_requests.filter(req_dsl::id.eq(id))
                                 .first::<RequestRow>(conn)
                                 .optional()
                                 .map_err(storage_err)
}

impl RequestStore for DieselRequestStore {
    fn find(&self, plan_id: &Uuid, filter: &RequestFilter, order: RequestOrder) -> Result<Vec<MaintenanceRequest>> {
        let mut conn = self.conn()?;
        let mut query = req_dsl::maintenance_requests.filter(req_dsl::plan_id.eq(plan_id.to_string()))
                                                     .into_boxed();
        // fechas YYYY-MM-DD: el orden lexicográfico coincide con el cronológico
        // sólo con años de cuatro cifras (0000..=9999)
        if let Some(from) = filter.request_date_from {
            query = query.filter(req_dsl::request_date.ge(from.to_string()));
        }
        if let Some(to) = filter.request_date_to {
            query = query.filter(req_dsl::request_date.le(to.to_string()));
        }
        query = match order {
            RequestOrder::RequestDateAsc => query.order((req_dsl::request_date.asc(), req_dsl::id.asc())),
            RequestOrder::RequestDateDesc => query.order((req_dsl::request_date.desc(), req_dsl::id.asc())),
            RequestOrder::ScheduleDateAsc => query.order((req_dsl::schedule_date.asc(), req_dsl::id.asc())),
        };
        let rows = query.load::<RequestRow>(&mut conn).map_err(storage_err)?;
        rows.into_iter().map(RequestRow::into_domain).collect()
    }

    fn create(&self, request: MaintenanceRequest) -> Result<MaintenanceRequest> {
        let mut conn = self.conn()?;
        let row = RequestRow::from_domain(&request);
        diesel::insert_into(req_dsl::maintenance_requests).values(&row)
                                                          .execute(&mut conn)
                                                          .map_err(|e| map_db_err(e, &row.plan_id, &row.request_date))?;
        Ok(request)
    }

    fn update(&self, request_id: &Uuid, changes: &RequestChanges) -> Result<MaintenanceRequest> {
        let mut conn = self.conn()?;
        let id_s = request_id.to_string();
        let current = load_row(&mut conn, &id_s)?.ok_or_else(|| {
                                                     SchedulerError::NotFound(format!("solicitud {}", request_id))
                                                 })?
                                                 .into_domain()?;
        let updated = changes.apply_to(&current);
        let row = RequestRow::from_domain(&updated);
        diesel::update(req_dsl::maintenance_requests.filter(req_dsl::id.eq(&id_s)))
            .set((req_dsl::stage.eq(&row.stage),
                  req_dsl::request_date.eq(&row.request_date),
                  req_dsl::schedule_date.eq(&row.schedule_date),
                  req_dsl::note.eq(&row.note)))
            .execute(&mut conn)
            .map_err(|e| map_db_err(e, &row.plan_id, &row.request_date))?;
        Ok(updated)
    }

    fn get(&self, request_id: &Uuid) -> Result<Option<MaintenanceRequest>> {
        let mut conn = self.conn()?;
        load_row(&mut conn, &request_id.to_string())?.map(RequestRow::into_domain)
                                                     .transpose()
    }
}
