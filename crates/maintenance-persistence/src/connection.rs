// Pool de conexiones compartido por los repositorios Diesel. El backend se
// elige en compilación: Postgres con la feature `pg`, SQLite en otro caso.
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use maintenance_domain::DomainError;
use std::sync::Arc;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Variable de entorno principal con la URL de la base de datos.
pub const DB_URL_ENV: &str = "MAINTENANCE_DB_URL";
/// Fichero SQLite usado cuando no hay URL configurada.
pub const DEFAULT_SQLITE_PATH: &str = "maintenance.db";

#[cfg(feature = "pg")]
pub(crate) type DbConn = PgConnection;
#[cfg(not(feature = "pg"))]
pub(crate) type DbConn = SqliteConnection;
pub(crate) type DbPool = Pool<ConnectionManager<DbConn>>;
pub(crate) type Conn = PooledConnection<ConnectionManager<DbConn>>;

/// Base de datos de mantenimiento: un pool y las migraciones aplicadas.
///
/// Los repositorios (`plans()`, `requests()`) comparten el mismo pool.
#[derive(Clone)]
pub struct Database {
  pool: Arc<DbPool>,
}

impl Database {
  /// Abre el pool sobre `database_url` y aplica las migraciones embebidas.
  pub fn connect(database_url: &str) -> Result<Self, DomainError> {
    let manager = ConnectionManager::<DbConn>::new(database_url);
    let pool = Pool::builder().max_size(4)
                              .build(manager)
                              .map_err(|e| DomainError::ExternalError(format!("no se pudo crear el pool de conexiones: {}", e)))?;
    let db = Database { pool: Arc::new(pool) };
    let mut c = db.conn().map_err(|e| DomainError::ExternalError(format!("pool: {}", e)))?;
    #[cfg(not(feature = "pg"))]
    {
      if let Err(e) = diesel::sql_query("PRAGMA busy_timeout = 5000;").execute(&mut c) {
        log::warn!("no se pudo fijar busy_timeout: {}", e);
      }
    }
    let applied = c.run_pending_migrations(MIGRATIONS)
                   .map_err(|e| DomainError::ExternalError(format!("migraciones: {}", e)))?;
    if !applied.is_empty() {
      info!("{} migraciones aplicadas", applied.len());
    }
    Ok(db)
  }

  pub(crate) fn conn(&self) -> std::result::Result<Conn, r2d2::Error> {
    self.pool.get()
  }

  /// Repositorio de equipos y planes.
  pub fn plans(&self) -> crate::DieselPlanRepository {
    crate::DieselPlanRepository::new(self.clone())
  }

  /// Almacén de solicitudes.
  pub fn requests(&self) -> crate::DieselRequestStore {
    crate::DieselRequestStore::new(self.clone())
  }
}

/// Resuelve la URL de la base de datos desde el entorno (`.env` incluido).
///
/// `MAINTENANCE_DB_URL` tiene prioridad sobre `DATABASE_URL`. Sin ninguna, la
/// build SQLite usa `maintenance.db` y la build Postgres falla.
pub fn database_url_from_env() -> Result<String, DomainError> {
  dotenvy::dotenv().ok();
  let url = std::env::var(DB_URL_ENV).or_else(|_| std::env::var("DATABASE_URL"));
  if cfg!(feature = "pg") {
    let url = url.map_err(|_| DomainError::ExternalError(format!("{} / DATABASE_URL not set", DB_URL_ENV)))?;
    let l = url.to_lowercase();
    if !(l.starts_with("postgres://") || l.starts_with("postgresql://") || url.contains('@')) {
      return Err(DomainError::ExternalError(format!("{} / DATABASE_URL does not look like Postgres URL",
                                                   DB_URL_ENV)));
    }
    Ok(url)
  } else {
    Ok(url.unwrap_or_else(|_| DEFAULT_SQLITE_PATH.to_string()))
  }
}

/// Crear la base de datos desde las variables de entorno.
pub fn new_from_env() -> Result<Database, DomainError> {
  let url = database_url_from_env()?;
  Database::connect(&url)
}
