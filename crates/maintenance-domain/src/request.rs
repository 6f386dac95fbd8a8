// request.rs
use crate::{DomainError, MaintenancePlan};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Etapa del ciclo de vida de una solicitud. `Repaired` y `Scrap` son
/// terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStage {
  New,
  InProgress,
  Repaired,
  Scrap,
}

impl RequestStage {
  pub fn is_done(&self) -> bool {
    matches!(self, RequestStage::Repaired | RequestStage::Scrap)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      RequestStage::New => "new",
      RequestStage::InProgress => "in_progress",
      RequestStage::Repaired => "repaired",
      RequestStage::Scrap => "scrap",
    }
  }
}

impl FromStr for RequestStage {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "new" => Ok(RequestStage::New),
      "in_progress" => Ok(RequestStage::InProgress),
      "repaired" => Ok(RequestStage::Repaired),
      "scrap" => Ok(RequestStage::Scrap),
      other => Err(DomainError::ValidationError(format!("Etapa desconocida: {}", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceType {
  Preventive,
  Corrective,
}

impl MaintenanceType {
  pub fn as_str(&self) -> &'static str {
    match self {
      MaintenanceType::Preventive => "preventive",
      MaintenanceType::Corrective => "corrective",
    }
  }
}

impl FromStr for MaintenanceType {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "preventive" => Ok(MaintenanceType::Preventive),
      "corrective" => Ok(MaintenanceType::Corrective),
      other => Err(DomainError::ValidationError(format!("Tipo de mantenimiento desconocido: {}", other))),
    }
  }
}

/// Texto usado cuando el plan no tiene tipo de mantenimiento.
pub const UNSPECIFIED_KIND: &str = "Unspecified kind";

/// Nombre de una solicitud preventiva generada desde un plan.
pub fn preventive_request_name(kind: Option<&str>, plan_name: &str) -> String {
  format!("Preventive Maintenance ({}) - {}", kind.unwrap_or(UNSPECIFIED_KIND), plan_name)
}

/// Solicitud de mantenimiento. Registro autocontenido que maneja el
/// `RequestStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
  pub id: Uuid,
  pub plan_id: Uuid,
  pub equipment_id: Uuid,
  pub name: String,
  pub kind: Option<String>,
  pub schedule_date: NaiveDate,
  pub request_date: NaiveDate,
  pub stage: RequestStage,
  pub maintenance_type: MaintenanceType,
  pub note: Option<String>,
  pub duration_hours: Option<f64>,
}

impl MaintenanceRequest {
  /// Construye la solicitud preventiva de `plan` para la fecha `due`. Ambas
  /// fechas (programada y de solicitud) quedan en `due`.
  pub fn preventive(plan: &MaintenancePlan, plan_name: &str, due: NaiveDate) -> Self {
    Self { id: Uuid::new_v4(),
           plan_id: plan.id(),
           equipment_id: plan.equipment_id(),
           name: preventive_request_name(plan.kind(), plan_name),
           kind: plan.kind().map(str::to_string),
           schedule_date: due,
           request_date: due,
           stage: RequestStage::New,
           maintenance_type: MaintenanceType::Preventive,
           note: plan.note().map(str::to_string),
           duration_hours: plan.duration_hours() }
  }

  pub fn is_done(&self) -> bool {
    self.stage.is_done()
  }
}

impl fmt::Display for MaintenanceRequest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "{} [{}] {} ({})",
           self.request_date,
           self.stage.as_str(),
           self.name,
           self.maintenance_type.as_str())?;
    if let Some(note) = &self.note {
      write!(f, ": {}", note)?;
    }
    Ok(())
  }
}
