// Archivo: engine.rs
// Propósito: implementar `PlanScheduler`, que deriva la próxima fecha de
// mantenimiento de un plan a partir de su historial de solicitudes y genera
// las solicitudes pendientes hasta el horizonte del plan.
use crate::errors::{Result, SchedulerError};
use crate::repository::{RequestFilter, RequestOrder, RequestStore};
use chrono::NaiveDate;
use log::{debug, warn};
use maintenance_domain::{DomainError, Equipment, MaintenancePlan, MaintenanceRequest};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

/// Variable de entorno que selecciona la política de horizonte.
pub const HORIZON_POLICY_ENV: &str = "MAINTENANCE_HORIZON_POLICY";

/// Qué ocurrencias cuentan para el horizonte de un plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonPolicy {
    /// La ocurrencia con fecha de hoy cuenta como una más.
    #[default]
    IncludeDue,
    /// Sólo cuentan ocurrencias estrictamente posteriores a hoy. La de hoy se
    /// genera igualmente.
    StrictlyFuture,
}

impl HorizonPolicy {
    fn counts(&self, due: NaiveDate, today: NaiveDate) -> bool {
        match self {
            HorizonPolicy::IncludeDue => due >= today,
            HorizonPolicy::StrictlyFuture => due > today,
        }
    }
}

impl FromStr for HorizonPolicy {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "include_due" => Ok(HorizonPolicy::IncludeDue),
            "strictly_future" => Ok(HorizonPolicy::StrictlyFuture),
            other => Err(SchedulerError::Domain(DomainError::ValidationError(format!("política de horizonte desconocida: {}",
                                                                                        other)))),
        }
    }
}

/// Configuración del planificador.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub horizon_policy: HorizonPolicy,
}

impl SchedulerConfig {
    /// Lee `MAINTENANCE_HORIZON_POLICY`; ausente equivale a `IncludeDue`.
    pub fn from_env() -> Result<Self> {
        match std::env::var(HORIZON_POLICY_ENV) {
            Ok(v) => Ok(Self { horizon_policy: v.parse()? }),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Motivo por el que un plan no generó solicitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EquipmentInactive,
    NoDueDate,
}

/// Resultado de generar solicitudes para un plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    /// Solicitudes creadas en esta ejecución (puede estar vacío si el
    /// horizonte ya estaba cubierto).
    Generated(Vec<MaintenanceRequest>),
    Skipped(SkipReason),
}

impl GenerationOutcome {
    pub fn created(&self) -> &[MaintenanceRequest] {
        match self {
            GenerationOutcome::Generated(reqs) => reqs,
            GenerationOutcome::Skipped(_) => &[],
        }
    }
}

/// Deriva la próxima fecha de mantenimiento de `plan` a partir de
/// `requests` en una sola pasada.
///
/// - Sólo cuentan solicitudes del plan con `request_date >= start`.
/// - Una fecha fijada a mano en el plan manda mientras ninguna de esas
///   solicitudes tenga fecha igual o posterior.
/// - La solicitud pendiente más temprana con fecha `>= today` fija la
///   fecha, aunque se haya movido arbitrariamente al futuro.
/// - Nunca antes de `start` ni de la última terminada + un paso.
/// - Con una terminada y nada pendiente, es la terminada + un paso aunque
///   quede en el pasado (mantenimiento atrasado).
/// - Sin solicitudes, `start` avanza por pasos completos hasta `>= today`.
///
/// Devuelve `Ok(None)` si el plan no tiene fecha de inicio.
pub fn next_maintenance_date(plan: &MaintenancePlan,
                             requests: &[MaintenanceRequest],
                             today: NaiveDate)
                             -> std::result::Result<Option<NaiveDate>, DomainError> {
    let Some(start) = plan.start_maintenance_date() else {
        return Ok(None);
    };
    let interval = plan.recurrence()?;

    let mut earliest_pending: Option<NaiveDate> = None;
    let mut latest_done: Option<NaiveDate> = None;
    let mut latest_any: Option<NaiveDate> = None;
    for r in requests.iter()
                     .filter(|r| r.plan_id == plan.id() && r.request_date >= start)
    {
        latest_any = latest_any.max(Some(r.request_date));
        if r.is_done() {
            latest_done = latest_done.max(Some(r.request_date));
        } else if r.request_date >= today {
            earliest_pending = Some(earliest_pending.map_or(r.request_date, |d| d.min(r.request_date)));
        }
    }

    let floor = match latest_done {
        Some(done) => interval.step(done)?.max(start),
        None => start,
    };
    if let Some(pinned) = plan.next_maintenance_date() {
        if latest_any.map_or(true, |d| d < pinned) {
            return Ok(Some(pinned.max(floor)));
        }
    }
    if let Some(pending) = earliest_pending {
        return Ok(Some(pending.max(floor)));
    }
    if latest_done.is_some() {
        return Ok(Some(floor));
    }
    let mut next = floor;
    while next < today {
        next = interval.step(next)?;
    }
    Ok(Some(next))
}

/// Motor de generación de solicitudes de un plan.
///
/// Responsabilidades principales:
/// - Calcular la próxima fecha de mantenimiento (`next_date`)
/// - Materializar solicitudes hasta el horizonte sin duplicar fechas
/// - Usar `RequestStore` para leer el historial y persistir
///
/// "Hoy" sale del `Clock` inyectado; nada en el motor consulta la hora del
/// sistema directamente.
pub struct PlanScheduler<S>
    where S: RequestStore
{
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl<S> PlanScheduler<S> where S: RequestStore
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: SchedulerConfig) -> Self {
        Self { store, clock, config }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Fecha de hoy según el reloj inyectado.
    pub fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    /// Historial completo del plan ordenado por fecha de solicitud.
    pub fn history(&self, plan: &MaintenancePlan) -> Result<Vec<MaintenanceRequest>> {
        self.store
            .find(&plan.id(), &RequestFilter::all(), RequestOrder::RequestDateAsc)
    }

    /// Próxima fecha de mantenimiento del plan según su historial actual.
    pub fn next_date(&self, plan: &MaintenancePlan) -> Result<Option<NaiveDate>> {
        let history = self.history(plan)?;
        Ok(next_maintenance_date(plan, &history, self.today())?)
    }

    /// Genera las solicitudes que faltan para cubrir el horizonte del plan.
    ///
    /// Recorre las fechas desde la próxima fecha de mantenimiento avanzando
    /// un paso de recurrencia cada vez. Una fecha que ya tiene solicitud en
    /// el plan se cuenta pero no se vuelve a crear. El recorrido termina al
    /// contar `maintenance_plan_horizon` ocurrencias.
    ///
    /// Si la próxima fecha ya pasó, se crea una única solicitud atrasada en
    /// esa fecha y el recorrido sigue desde la primera ocurrencia `>= today`.
    pub fn generate_requests(&self, plan: &MaintenancePlan, equipment: &Equipment) -> Result<GenerationOutcome> {
        if !equipment.is_active() {
            return Ok(GenerationOutcome::Skipped(SkipReason::EquipmentInactive));
        }
        let interval = plan.recurrence()?;
        let today = self.today();
        let history = self.history(plan)?;
        let Some(mut due) = next_maintenance_date(plan, &history, today)? else {
            return Ok(GenerationOutcome::Skipped(SkipReason::NoDueDate));
        };

        let materialized: HashSet<NaiveDate> = history.iter().map(|r| r.request_date).collect();
        let plan_name = plan.display_name(equipment);
        let horizon = plan.maintenance_plan_horizon();
        let mut created = Vec::new();

        if due < today && horizon > 0 {
            if !materialized.contains(&due) {
                self.materialize(plan, &plan_name, due, &mut created)?;
            }
            while due < today {
                due = interval.step(due)?;
            }
        }

        let mut counted = 0u32;
        while counted < horizon {
            if !materialized.contains(&due) {
                self.materialize(plan, &plan_name, due, &mut created)?;
            }
            if self.config.horizon_policy.counts(due, today) {
                counted += 1;
            }
            due = interval.step(due)?;
        }
        Ok(GenerationOutcome::Generated(created))
    }

    fn materialize(&self,
                   plan: &MaintenancePlan,
                   plan_name: &str,
                   due: NaiveDate,
                   created: &mut Vec<MaintenanceRequest>)
                   -> Result<()> {
        let request = MaintenanceRequest::preventive(plan, plan_name, due);
        match self.store.create(request) {
            Ok(stored) => {
                debug!("plan {}: solicitud {} creada para {}", plan.id(), stored.id, due);
                created.push(stored);
                Ok(())
            }
            // otra ejecución la materializó entre la lectura y la escritura
            Err(SchedulerError::Conflict(msg)) => {
                warn!("plan {}: {} (se cuenta como existente)", plan.id(), msg);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
