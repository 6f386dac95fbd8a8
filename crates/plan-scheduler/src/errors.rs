// Archivo: errors.rs
// Propósito: definir los errores del planificador y el alias Result<T> usado
// por las APIs del crate.
use maintenance_domain::DomainError;
use thiserror::Error;
/// Errores comunes del planificador de mantenimiento.
///
/// - `NotFound`: plan, equipo o solicitud inexistente.
/// - `Conflict`: ya existe una solicitud del plan para esa fecha.
/// - `Storage`: error al acceder al almacenamiento externo.
/// - `Domain`: error de dominio (unidad o cantidad inválida, etc.).
#[derive(Error, Debug)]
pub enum SchedulerError {
  /// Entidad no encontrada.
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Violación de unicidad (plan, fecha de solicitud).
  #[error("Conflicto: {0}")]
  Conflict(String),
  /// Error genérico de almacenamiento (BD, pool, mutex envenenado).
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
  /// Error propagado desde el dominio.
  #[error(transparent)]
  Domain(#[from] DomainError),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, SchedulerError>;
