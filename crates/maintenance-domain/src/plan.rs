// plan.rs
use crate::{DomainError, Equipment, RecurrenceInterval, RecurrenceUnit};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Plan de mantenimiento preventivo de un equipo.
///
/// La próxima fecha de mantenimiento se deriva del historial de solicitudes
/// (ver `plan_scheduler::next_maintenance_date`). `next_maintenance_date`
/// guarda sólo una fecha fijada a mano, que manda mientras ninguna solicitud
/// del plan llegue a esa fecha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePlan {
  id: Uuid,
  name: Option<String>,
  equipment_id: Uuid,
  kind: Option<String>,
  start_maintenance_date: Option<NaiveDate>,
  recurrence_quantity: i64,
  recurrence_unit: RecurrenceUnit,
  maintenance_plan_horizon: u32,
  note: Option<String>,
  duration_hours: Option<f64>,
  #[serde(default)]
  next_maintenance_date: Option<NaiveDate>,
}

impl MaintenancePlan {
  pub fn new(equipment_id: Uuid,
             start_maintenance_date: Option<NaiveDate>,
             recurrence_quantity: i64,
             recurrence_unit: RecurrenceUnit,
             maintenance_plan_horizon: u32)
             -> Self {
    Self { id: Uuid::new_v4(),
           name: None,
           equipment_id,
           kind: None,
           start_maintenance_date,
           recurrence_quantity,
           recurrence_unit,
           maintenance_plan_horizon,
           note: None,
           duration_hours: None,
           next_maintenance_date: None }
  }

  pub fn with_id(mut self, id: Uuid) -> Self {
    self.id = id;
    self
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
    self.kind = Some(kind.into());
    self
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }

  pub fn with_duration_hours(mut self, hours: f64) -> Result<Self, DomainError> {
    if !hours.is_finite() || hours < 0.0 {
      return Err(DomainError::ValidationError(format!("Duración inválida: {}", hours)));
    }
    self.duration_hours = Some(hours);
    Ok(self)
  }

  pub fn with_start_maintenance_date(mut self, date: Option<NaiveDate>) -> Self {
    self.start_maintenance_date = date;
    self
  }

  /// Fija (o con `None` libera) la próxima fecha de mantenimiento.
  pub fn with_next_maintenance_date(mut self, date: Option<NaiveDate>) -> Self {
    self.next_maintenance_date = date;
    self
  }

  pub fn with_horizon(mut self, horizon: u32) -> Self {
    self.maintenance_plan_horizon = horizon;
    self
  }

  pub fn with_recurrence(mut self, quantity: i64, unit: RecurrenceUnit) -> Self {
    self.recurrence_quantity = quantity;
    self.recurrence_unit = unit;
    self
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn equipment_id(&self) -> Uuid {
    self.equipment_id
  }

  pub fn kind(&self) -> Option<&str> {
    self.kind.as_deref()
  }

  pub fn start_maintenance_date(&self) -> Option<NaiveDate> {
    self.start_maintenance_date
  }

  /// Próxima fecha fijada a mano, si la hay.
  pub fn next_maintenance_date(&self) -> Option<NaiveDate> {
    self.next_maintenance_date
  }

  pub fn recurrence_quantity(&self) -> i64 {
    self.recurrence_quantity
  }

  pub fn recurrence_unit(&self) -> RecurrenceUnit {
    self.recurrence_unit
  }

  pub fn maintenance_plan_horizon(&self) -> u32 {
    self.maintenance_plan_horizon
  }

  pub fn note(&self) -> Option<&str> {
    self.note.as_deref()
  }

  pub fn duration_hours(&self) -> Option<f64> {
    self.duration_hours
  }

  /// Valida y devuelve el intervalo de recurrencia del plan.
  pub fn recurrence(&self) -> Result<RecurrenceInterval, DomainError> {
    RecurrenceInterval::new(self.recurrence_quantity, self.recurrence_unit)
  }

  /// Nombre visible del plan: el nombre explícito, o
  /// `"Unnamed {kind} plan ({equipo})"` con el tipo en blanco si falta.
  pub fn display_name(&self, equipment: &Equipment) -> String {
    match &self.name {
      Some(name) => name.clone(),
      None => format!("Unnamed {} plan ({})", self.kind.as_deref().unwrap_or(""), equipment.name()),
    }
  }
}

impl fmt::Display for MaintenancePlan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "MaintenancePlan(id: {}, name: {}, every {} {}, horizon: {})",
           self.id,
           self.name.as_deref().unwrap_or("sin nombre"),
           self.recurrence_quantity,
           self.recurrence_unit,
           self.maintenance_plan_horizon)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unnamed_plan_without_kind_leaves_blank() {
    let eq = Equipment::new("Laptop");
    let plan = MaintenancePlan::new(eq.id(), None, 1, RecurrenceUnit::Month, 3);
    assert_eq!(plan.display_name(&eq), "Unnamed  plan (Laptop)");
  }

  #[test]
  fn unnamed_plan_uses_kind() {
    let eq = Equipment::new("Laptop");
    let plan = MaintenancePlan::new(eq.id(), None, 1, RecurrenceUnit::Week, 3).with_kind("Weekly");
    assert_eq!(plan.display_name(&eq), "Unnamed Weekly plan (Laptop)");
  }

  #[test]
  fn explicit_name_wins() {
    let eq = Equipment::new("Laptop");
    let plan = MaintenancePlan::new(eq.id(), None, 1, RecurrenceUnit::Week, 3).with_kind("Weekly")
                                                                            .with_name("Laptop cleanup");
    assert_eq!(plan.display_name(&eq), "Laptop cleanup");
  }

  #[test]
  fn recurrence_validates_quantity() {
    let plan = MaintenancePlan::new(Uuid::new_v4(), None, 0, RecurrenceUnit::Day, 1);
    assert_eq!(plan.recurrence(), Err(DomainError::InvalidQuantity(0)));
  }

  #[test]
  fn manual_next_date_can_be_set_and_cleared() {
    let day = NaiveDate::from_ymd_opt(2023, 4, 25).unwrap();
    let plan = MaintenancePlan::new(Uuid::new_v4(), None, 1, RecurrenceUnit::Month, 3).with_next_maintenance_date(Some(day));
    assert_eq!(plan.next_maintenance_date(), Some(day));
    assert_eq!(plan.with_next_maintenance_date(None).next_maintenance_date(), None);
  }

  #[test]
  fn negative_duration_is_rejected() {
    let plan = MaintenancePlan::new(Uuid::new_v4(), None, 1, RecurrenceUnit::Day, 1);
    assert!(plan.with_duration_hours(-1.0).is_err());
  }
}
