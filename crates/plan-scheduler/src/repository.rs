// Archivo: repository.rs
// Propósito: definir el trait `RequestStore` y los tipos de consulta que usa
// el planificador. Describe el contrato que deben implementar las
// persistencias de solicitudes (Diesel, in-memory, etc.).
use crate::errors::Result;
use chrono::NaiveDate;
use maintenance_domain::{MaintenanceRequest, RequestStage};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Filtro de búsqueda de solicitudes de un plan. Los límites son inclusivos
/// y se aplican sobre `request_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    pub request_date_from: Option<NaiveDate>,
    pub request_date_to: Option<NaiveDate>,
}

impl RequestFilter {
    /// Sin restricciones: todas las solicitudes del plan.
    pub fn all() -> Self {
        Self::default()
    }

    /// Solicitudes con `request_date >= from`.
    pub fn from_date(from: NaiveDate) -> Self {
        Self { request_date_from: Some(from), request_date_to: None }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self { request_date_from: Some(from), request_date_to: Some(to) }
    }

    /// Evalúa el filtro sobre una solicitud ya cargada.
    pub fn matches(&self, request: &MaintenanceRequest) -> bool {
        self.request_date_from.map_or(true, |from| request.request_date >= from)
        && self.request_date_to.map_or(true, |to| request.request_date <= to)
    }
}

/// Orden de los resultados de `RequestStore::find`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOrder {
    #[default]
    RequestDateAsc,
    RequestDateDesc,
    ScheduleDateAsc,
}

impl RequestOrder {
    /// Ordena en sitio. El orden es estable ante fechas iguales.
    pub fn sort(&self, requests: &mut [MaintenanceRequest]) {
        match self {
            RequestOrder::RequestDateAsc => requests.sort_by_key(|r| r.request_date),
            RequestOrder::RequestDateDesc => requests.sort_by(|a, b| b.request_date.cmp(&a.request_date)),
            RequestOrder::ScheduleDateAsc => requests.sort_by_key(|r| r.schedule_date),
        }
    }
}

/// Campos modificables de una solicitud existente. `None` deja el campo
/// como está.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestChanges {
    pub stage: Option<RequestStage>,
    pub request_date: Option<NaiveDate>,
    pub schedule_date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl RequestChanges {
    pub fn stage(stage: RequestStage) -> Self {
        Self { stage: Some(stage), ..Default::default() }
    }

    pub fn request_date(date: NaiveDate) -> Self {
        Self { request_date: Some(date), ..Default::default() }
    }

    pub fn note(note: impl Into<String>) -> Self {
        Self { note: Some(note.into()), ..Default::default() }
    }

    /// Aplica los cambios sobre una copia de `request`.
    pub fn apply_to(&self, request: &MaintenanceRequest) -> MaintenanceRequest {
        let mut out = request.clone();
        if let Some(stage) = self.stage {
            out.stage = stage;
        }
        if let Some(date) = self.request_date {
            out.request_date = date;
        }
        if let Some(date) = self.schedule_date {
            out.schedule_date = date;
        }
        if let Some(note) = &self.note {
            out.note = Some(note.clone());
        }
        out
    }
}

/// Contrato del almacén de solicitudes de mantenimiento.
///
/// El planificador sólo necesita filtrar por plan, por rango de fechas y
/// ordenar por fecha. Las implementaciones deben garantizar que no existen
/// dos solicitudes del mismo plan con la misma `request_date` y devolver
/// `SchedulerError::Conflict` si se intenta.
pub trait RequestStore: Send + Sync {
    /// Solicitudes del plan que cumplen `filter`, en el orden pedido.
    fn find(&self, plan_id: &Uuid, filter: &RequestFilter, order: RequestOrder) -> Result<Vec<MaintenanceRequest>>;

    /// Persiste una nueva solicitud y devuelve la versión almacenada.
    fn create(&self, request: MaintenanceRequest) -> Result<MaintenanceRequest>;

    /// Aplica `changes` a la solicitud `request_id`. `NotFound` si no existe.
    fn update(&self, request_id: &Uuid, changes: &RequestChanges) -> Result<MaintenanceRequest>;

    /// Obtiene una solicitud por id.
    fn get(&self, request_id: &Uuid) -> Result<Option<MaintenanceRequest>>;
}
