// Archivo: service.rs
// Propósito: implementar `SchedulerService`, la capa orquestadora que expone
// los disparadores de generación (periódico y manual) sobre todos los planes
// del `PlanRepository`. Esta capa debe ser invocada desde el cron, la CLI o
// handlers externos.
use crate::engine::{GenerationOutcome, PlanScheduler, SchedulerConfig, SkipReason};
use crate::errors::{Result, SchedulerError};
use crate::repository::{RequestChanges, RequestFilter, RequestOrder, RequestStore};
use chrono::NaiveDate;
use log::{error, info, warn};
use maintenance_domain::{Equipment, MaintenancePlan, MaintenanceRequest, PlanRepository, RequestStage};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Plan omitido en una ejecución por lotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSkip {
    pub plan_id: Uuid,
    pub reason: SkipReason,
}

/// Plan que falló en una ejecución por lotes. El resto del lote sigue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFailure {
    pub plan_id: Uuid,
    pub error: String,
}

/// Resumen de una ejecución de `run_periodic`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub created: Vec<MaintenanceRequest>,
    pub skipped: Vec<PlanSkip>,
    pub failures: Vec<PlanFailure>,
}

impl BatchReport {
    /// Solicitudes creadas para un plan concreto.
    pub fn created_for(&self, plan_id: &Uuid) -> Vec<&MaintenanceRequest> {
        self.created.iter().filter(|r| &r.plan_id == plan_id).collect()
    }
}

/// Servicio de alto nivel que expone la API del planificador.
///
/// Orquesta el repositorio de planes, el almacén de solicitudes y el motor.
pub struct SchedulerService<S, P>
    where S: RequestStore,
          P: PlanRepository
{
    plans: Arc<P>,
    store: Arc<S>,
    engine: PlanScheduler<S>,
}

impl<S, P> SchedulerService<S, P>
    where S: RequestStore,
          P: PlanRepository
{
    /// Crea el servicio inyectando repositorio, almacén, reloj y
    /// configuración. El `PlanScheduler` se construye internamente.
    pub fn new(plans: Arc<P>, store: Arc<S>, clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        let engine = PlanScheduler::new(store.clone(), clock, config);
        Self { plans, store, engine }
    }

    pub fn engine(&self) -> &PlanScheduler<S> {
        &self.engine
    }

    fn load(&self, plan_id: &Uuid) -> Result<(MaintenancePlan, Equipment)> {
        let plan = self.plans
                       .get_plan(plan_id)?
                       .ok_or_else(|| SchedulerError::NotFound(format!("plan {}", plan_id)))?;
        let equipment = self.plans
                            .get_equipment(&plan.equipment_id())?
                            .ok_or_else(|| SchedulerError::NotFound(format!("equipo {}", plan.equipment_id())))?;
        Ok((plan, equipment))
    }

    /// Disparador periódico: genera solicitudes para todos los planes.
    ///
    /// Un fallo en un plan (unidad o cantidad inválida, plan ilegible) se
    /// registra en el informe y no detiene el lote. Sólo un fallo al listar
    /// los planes aborta la ejecución.
    pub fn run_periodic(&self) -> Result<BatchReport> {
        let ids = self.plans.list_plan_ids()?;
        let mut report = BatchReport::default();
        for plan_id in ids {
            match self.generate_for_plan(&plan_id) {
                Ok(GenerationOutcome::Generated(reqs)) => report.created.extend(reqs),
                Ok(GenerationOutcome::Skipped(reason)) => {
                    warn!("plan {} omitido: {:?}", plan_id, reason);
                    report.skipped.push(PlanSkip { plan_id, reason });
                }
                Err(e) => {
                    error!("plan {} falló: {}", plan_id, e);
                    report.failures.push(PlanFailure { plan_id, error: e.to_string() });
                }
            }
        }
        info!("generación periódica: {} creadas, {} omitidos, {} fallidos",
              report.created.len(),
              report.skipped.len(),
              report.failures.len());
        Ok(report)
    }

    /// Disparador manual para un único plan. Mismo procedimiento que el
    /// periódico; los errores se devuelven al llamador.
    pub fn generate_for_plan(&self, plan_id: &Uuid) -> Result<GenerationOutcome> {
        let (plan, equipment) = self.load(plan_id)?;
        self.engine.generate_requests(&plan, &equipment)
    }

    /// Próxima fecha de mantenimiento del plan.
    pub fn next_maintenance_date(&self, plan_id: &Uuid) -> Result<Option<NaiveDate>> {
        let plan = self.plans
                       .get_plan(plan_id)?
                       .ok_or_else(|| SchedulerError::NotFound(format!("plan {}", plan_id)))?;
        self.engine.next_date(&plan)
    }

    /// Fija a mano la próxima fecha del plan (o la libera con `None`). La
    /// siguiente generación parte de esa fecha.
    pub fn set_next_maintenance_date(&self, plan_id: &Uuid, date: Option<NaiveDate>) -> Result<MaintenancePlan> {
        let plan = self.plans
                       .get_plan(plan_id)?
                       .ok_or_else(|| SchedulerError::NotFound(format!("plan {}", plan_id)))?
                       .with_next_maintenance_date(date);
        self.plans.save_plan(plan.clone())?;
        Ok(plan)
    }

    /// Nombre visible del plan (ver `MaintenancePlan::display_name`).
    pub fn plan_display_name(&self, plan_id: &Uuid) -> Result<String> {
        let (plan, equipment) = self.load(plan_id)?;
        Ok(plan.display_name(&equipment))
    }

    /// Solicitudes del plan ordenadas por fecha programada.
    pub fn requests_for_plan(&self, plan_id: &Uuid) -> Result<Vec<MaintenanceRequest>> {
        self.store
            .find(plan_id, &RequestFilter::all(), RequestOrder::ScheduleDateAsc)
    }

    /// Marca una solicitud como terminada (`Repaired`).
    pub fn complete_request(&self, request_id: &Uuid) -> Result<MaintenanceRequest> {
        self.store
            .update(request_id, &RequestChanges::stage(RequestStage::Repaired))
    }

    /// Mueve la fecha de solicitud de una solicitud existente.
    pub fn reschedule_request(&self, request_id: &Uuid, date: NaiveDate) -> Result<MaintenanceRequest> {
        self.store.update(request_id, &RequestChanges::request_date(date))
    }
}
