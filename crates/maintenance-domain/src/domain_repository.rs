use crate::DomainError;
use crate::{Equipment, MaintenancePlan};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Trait que define la persistencia de equipos y planes de mantenimiento.
///
/// Las solicitudes generadas no pasan por aquí: las gestiona el
/// `RequestStore` del crate `plan-scheduler`.
pub trait PlanRepository: Send + Sync {
    /// Guarda (o reemplaza) un equipo y devuelve su `Uuid`.
    fn save_equipment(&self, equipment: Equipment) -> Result<Uuid, DomainError>;

    /// Recupera un equipo por su `Uuid`.
    fn get_equipment(&self, id: &Uuid) -> Result<Option<Equipment>, DomainError>;

    /// Activa o desactiva un equipo. `NotFound` si no existe.
    fn set_equipment_active(&self, id: &Uuid, active: bool) -> Result<(), DomainError>;

    /// Guarda (o reemplaza) un plan y devuelve su `Uuid`.
    fn save_plan(&self, plan: MaintenancePlan) -> Result<Uuid, DomainError>;

    /// Recupera un plan por su `Uuid`. Un plan cuya fila no se puede
    /// decodificar (por ejemplo una unidad desconocida) devuelve error sólo
    /// para ese plan.
    fn get_plan(&self, id: &Uuid) -> Result<Option<MaintenancePlan>, DomainError>;

    /// Ids de todos los planes, en orden estable de inserción.
    fn list_plan_ids(&self) -> Result<Vec<Uuid>, DomainError>;

    /// Cambia el horizonte de un plan. `NotFound` si no existe.
    fn set_plan_horizon(&self, id: &Uuid, horizon: u32) -> Result<(), DomainError>;
}

/// Implementación en memoria para tests y desarrollo.
pub struct InMemoryPlanRepository {
    equipment: Arc<Mutex<IndexMap<Uuid, Equipment>>>,
    plans: Arc<Mutex<IndexMap<Uuid, MaintenancePlan>>>,
}

impl InMemoryPlanRepository {
    pub fn new() -> Self {
        Self { equipment: Arc::new(Mutex::new(IndexMap::new())),
               plans: Arc::new(Mutex::new(IndexMap::new())) }
    }

    // Helper to map poisoned mutex errors into DomainError
    fn lock_map<'a, T>(&'a self, m: &'a Mutex<T>, name: &str) -> Result<std::sync::MutexGuard<'a, T>, DomainError> {
        m.lock()
         .map_err(|e| DomainError::ExternalError(format!("Mutex '{}' poisoned: {}", name, e)))
    }
}

impl Default for InMemoryPlanRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanRepository for InMemoryPlanRepository {
    fn save_equipment(&self, equipment: Equipment) -> Result<Uuid, DomainError> {
        let id = equipment.id();
        let mut map = self.lock_map(&self.equipment, "equipment")?;
        map.insert(id, equipment);
        Ok(id)
    }

    fn get_equipment(&self, id: &Uuid) -> Result<Option<Equipment>, DomainError> {
        let map = self.lock_map(&self.equipment, "equipment")?;
        Ok(map.get(id).cloned())
    }

    fn set_equipment_active(&self, id: &Uuid, active: bool) -> Result<(), DomainError> {
        let mut map = self.lock_map(&self.equipment, "equipment")?;
        let current = map.get(id)
                         .cloned()
                         .ok_or_else(|| DomainError::NotFound(format!("equipo {}", id)))?;
        map.insert(*id, current.with_active(active));
        Ok(())
    }

    fn save_plan(&self, plan: MaintenancePlan) -> Result<Uuid, DomainError> {
        let id = plan.id();
        let mut map = self.lock_map(&self.plans, "plans")?;
        map.insert(id, plan);
        Ok(id)
    }

    fn get_plan(&self, id: &Uuid) -> Result<Option<MaintenancePlan>, DomainError> {
        let map = self.lock_map(&self.plans, "plans")?;
        Ok(map.get(id).cloned())
    }

    fn list_plan_ids(&self) -> Result<Vec<Uuid>, DomainError> {
        let map = self.lock_map(&self.plans, "plans")?;
        Ok(map.keys().copied().collect())
    }

    fn set_plan_horizon(&self, id: &Uuid, horizon: u32) -> Result<(), DomainError> {
        let mut map = self.lock_map(&self.plans, "plans")?;
        let current = map.get(id)
                         .cloned()
                         .ok_or_else(|| DomainError::NotFound(format!("plan {}", id)))?;
        map.insert(*id, current.with_horizon(horizon));
        Ok(())
    }
}
