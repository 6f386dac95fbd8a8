// Archivo: stubs.rs
// Propósito: implementaciones en memoria para pruebas y wiring rápido.
//
// Incluye un almacén de solicitudes en memoria (`InMemoryRequestStore`) y un
// reloj fijo (`FixedClock`). Estas implementaciones no son durables y se usan
// para demos o pruebas locales.
use crate::errors::{Result, SchedulerError};
use crate::repository::{RequestChanges, RequestFilter, RequestOrder, RequestStore};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use maintenance_domain::MaintenanceRequest;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Reloj manipulable que fija "hoy". Implementa `mockable::Clock` para
/// poder inyectarse donde se espera `Arc<dyn Clock>`.
#[derive(Debug)]
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    /// Reloj fijado a las 00:00 UTC de `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self(Mutex::new(Self::midnight(date)))
    }

    /// Mueve el reloj a otra fecha.
    pub fn set(&self, date: NaiveDate) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = Self::midnight(date);
    }

    fn midnight(date: NaiveDate) -> DateTime<Utc> {
        date.and_time(NaiveTime::MIN).and_utc()
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// Minimal in-memory request store (not durable)
pub struct InMemoryRequestStore {
    /// Solicitudes indexadas por id.
    requests: Mutex<HashMap<Uuid, MaintenanceRequest>>,
}

impl InMemoryRequestStore {
    /// Crea un almacén vacío.
    pub fn new() -> Self {
        Self { requests: Mutex::new(HashMap::new()) }
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `SchedulerError::Storage`.
    fn lock(&self) -> std::result::Result<MutexGuard<'_, HashMap<Uuid, MaintenanceRequest>>, SchedulerError> {
        self.requests
            .lock()
            .map_err(|e| SchedulerError::Storage(format!("mutex poisoned: {:?}", e)))
    }

    /// Número total de solicitudes almacenadas (todas los planes).
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}

impl Default for InMemoryRequestStore {
    fn default() -> Self {
        Self::new()
    }
}

fn date_taken(map: &HashMap<Uuid, MaintenanceRequest>, plan_id: Uuid, date: NaiveDate, except: Option<Uuid>) -> bool {
    map.values()
       .any(|r| r.plan_id == plan_id && r.request_date == date && Some(r.id) != except)
}

impl RequestStore for InMemoryRequestStore {
    fn find(&self, plan_id: &Uuid, filter: &RequestFilter, order: RequestOrder) -> Result<Vec<MaintenanceRequest>> {
        let map = self.lock()?;
        let mut out: Vec<MaintenanceRequest> = map.values()
                                                  .filter(|r| &r.plan_id == plan_id && filter.matches(r))
                                                  .cloned()
                                                  .collect();
        // HashMap no tiene orden: desempate por id para resultados deterministas
        out.sort_by_key(|r| r.id);
        order.sort(&mut out);
        Ok(out)
    }

    /// Inserta la solicitud respetando la unicidad (plan, request_date).
    fn create(&self, request: MaintenanceRequest) -> Result<MaintenanceRequest> {
        let mut map = self.lock()?;
        if map.contains_key(&request.id) {
            return Err(SchedulerError::Conflict(format!("solicitud {} ya existe", request.id)));
        }
        if date_taken(&map, request.plan_id, request.request_date, None) {
            return Err(SchedulerError::Conflict(format!("plan {} ya tiene solicitud el {}",
                                                        request.plan_id, request.request_date)));
        }
        map.insert(request.id, request.clone());
        Ok(request)
    }

    fn update(&self, request_id: &Uuid, changes: &RequestChanges) -> Result<MaintenanceRequest> {
        let mut map = self.lock()?;
        let current = map.get(request_id)
                         .ok_or_else(|| SchedulerError::NotFound(format!("solicitud {}", request_id)))?;
        let updated = changes.apply_to(current);
        if updated.request_date != current.request_date
           && date_taken(&map, updated.plan_id, updated.request_date, Some(updated.id))
        {
            return Err(SchedulerError::Conflict(format!("plan {} ya tiene solicitud el {}",
                                                        updated.plan_id, updated.request_date)));
        }
        map.insert(*request_id, updated.clone());
        Ok(updated)
    }

    fn get(&self, request_id: &Uuid) -> Result<Option<MaintenanceRequest>> {
        Ok(self.lock()?.get(request_id).cloned())
    }
}
