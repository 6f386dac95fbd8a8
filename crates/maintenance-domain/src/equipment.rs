// equipment.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Equipo al que se asocian planes y solicitudes. El planificador sólo lee
/// `name` y `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
  id: Uuid,
  name: String,
  active: bool,
}

impl Equipment {
  pub fn new(name: impl Into<String>) -> Self {
    Self { id: Uuid::new_v4(), name: name.into(), active: true }
  }

  pub fn from_parts(id: Uuid, name: impl Into<String>, active: bool) -> Self {
    Self { id, name: name.into(), active }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn with_active(mut self, active: bool) -> Self {
    self.active = active;
    self
  }
}

impl fmt::Display for Equipment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "Equipment(id: {}, name: {}, active: {})",
           self.id, self.name, self.active)
  }
}
