mod domain_repository;
mod equipment;
mod errors;
mod plan;
pub mod recurrence;
mod request;

pub use domain_repository::{InMemoryPlanRepository, PlanRepository};
pub use equipment::Equipment;
pub use errors::DomainError;
pub use plan::MaintenancePlan;
pub use recurrence::{offset, CalendarOffset, RecurrenceInterval, RecurrenceUnit};
pub use request::{preventive_request_name, MaintenanceRequest, MaintenanceType, RequestStage, UNSPECIFIED_KIND};
