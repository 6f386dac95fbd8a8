//! Crate `plan-scheduler` — cálculo de fechas y generación de solicitudes
//! de mantenimiento preventivo
//!
//! Este crate define el contrato de persistencia de solicitudes
//! (`RequestStore`), una implementación en memoria útil para pruebas
//! (`InMemoryRequestStore`), el motor `PlanScheduler` y el servicio
//! `SchedulerService` con los disparadores periódico y manual.
//!
//! Diseño resumido:
//! - Derivación pura: la próxima fecha de un plan es un fold sobre su
//!   historial de solicitudes (`next_maintenance_date`).
//! - Idempotencia: nunca se crean dos solicitudes del mismo plan para la
//!   misma fecha; relanzar la generación sin cambios no crea nada.
//! - Aislamiento: un plan inválido falla solo, el lote continúa.
//! - Reloj inyectado (`mockable::Clock`) para decidir qué es "hoy".
//!
//! Ejemplo rápido:
//! ```rust
//! use maintenance_domain::{Equipment, InMemoryPlanRepository, MaintenancePlan, PlanRepository, RecurrenceUnit};
//! use plan_scheduler::{FixedClock, InMemoryRequestStore, SchedulerConfig, SchedulerService};
//! use chrono::NaiveDate;
//! use std::sync::Arc;
//!
//! let today = NaiveDate::from_ymd_opt(2023, 1, 25).unwrap();
//! let plans = Arc::new(InMemoryPlanRepository::new());
//! let eq_id = plans.save_equipment(Equipment::new("Laptop")).unwrap();
//! let plan_id = plans.save_plan(MaintenancePlan::new(eq_id, Some(today), 1, RecurrenceUnit::Month, 3)).unwrap();
//! let service = SchedulerService::new(plans,
//!                                     Arc::new(InMemoryRequestStore::new()),
//!                                     Arc::new(FixedClock::new(today)),
//!                                     SchedulerConfig::default());
//! let report = service.run_periodic().unwrap();
//! assert_eq!(report.created_for(&plan_id).len(), 3);
//! ```
pub mod engine;
pub mod errors;
pub mod repository;
pub mod service;
pub mod stubs;

pub use engine::*;
pub use errors::*;
pub use repository::*;
pub use service::*;
pub use stubs::*;
