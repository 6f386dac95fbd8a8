// error.rs
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
  #[error("Error de validación: {0}")]
  ValidationError(String),
  /// Unidad de recurrencia desconocida (no es day/week/month/year).
  #[error("Unidad de recurrencia inválida: {0}")]
  InvalidUnit(String),
  /// Cantidad de recurrencia menor o igual a cero.
  #[error("Cantidad de recurrencia inválida: {0}")]
  InvalidQuantity(i64),
  #[error("Fecha fuera de rango: {0}")]
  DateOutOfRange(String),
  #[error("No encontrado: {0}")]
  NotFound(String),
  #[error("Error externo: {0}")]
  ExternalError(String),
}

