//! Persistencia Diesel para el planificador de mantenimiento.
//! Expone `Database` (pool + migraciones embebidas) y los dos repositorios
//! que implementan los traits de persistencia: `DieselPlanRepository`
//! (`PlanRepository`) y `DieselRequestStore` (`RequestStore`).
//!
//! El backend por defecto es SQLite; la feature `pg` cambia a Postgres.

mod connection;
mod domain_persistence;
mod request_persistence;
pub mod schema;

pub use connection::{database_url_from_env, new_from_env, Database, DB_URL_ENV, DEFAULT_SQLITE_PATH};
pub use domain_persistence::DieselPlanRepository;
pub use request_persistence::DieselRequestStore;
