//! PostgreSQL schema, models, and connection management.

use diesel::pg::PgConnection;
use failure::Fail;
use folio_macros::From;
use log::info;
use r2d2_diesel::ConnectionManager;
use serde::Deserialize;
use std::env;

pub mod models;
pub mod schema;
pub mod types;

/// A pool of database connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// A connection borrowed from a [`Pool`].
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// `[database]` section of the configuration file.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub url: String,
    /// Maximum number of open connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    10
}

/// Create a connection pool.
///
/// `DATABASE_URL` takes precedence over the configured URL. The pool has
/// a single owner, the process's [`crate::PgStore`], and is expected to be
/// created once during startup. Release builds bring the schema up to date
/// before returning.
pub fn create_pool(cfg: Option<&Config>) -> Result<Pool, PoolError> {
    let url = match env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(env::VarError::NotUnicode(_)) => return Err(PoolError::InvalidUrl),
        Err(env::VarError::NotPresent) => match cfg {
            Some(cfg) => cfg.url.clone(),
            None => return Err(PoolError::NotConfigured),
        },
    };

    let pool = Pool::builder()
        .max_size(cfg.map_or_else(default_pool_size, |cfg| cfg.pool_size))
        .build(ConnectionManager::new(url))?;

    // Fail early if the database can't be reached.
    let conn = pool.get()?;
    migrate(&conn)?;

    info!("Connected to database, pool size {}", pool.max_size());

    Ok(pool)
}

#[derive(Debug, Fail, From)]
pub enum PoolError {
    #[fail(display = "No database configured, set DATABASE_URL or [database].url")]
    NotConfigured,
    #[fail(display = "DATABASE_URL is not valid Unicode")]
    InvalidUrl,
    #[fail(display = "Cannot connect to database: {}", _0)]
    Connect(#[cause] #[from] r2d2::Error),
    #[cfg(not(debug_assertions))]
    #[fail(display = "Cannot migrate database: {}", _0)]
    Migration(#[cause] diesel_migrations::RunMigrationsError),
}

#[cfg(not(debug_assertions))]
embed_migrations!();

#[cfg(not(debug_assertions))]
fn migrate(conn: &PgConnection) -> Result<(), PoolError> {
    embedded_migrations::run_with_output(conn, &mut std::io::stderr())
        .map_err(PoolError::Migration)
}

/// Development databases are migrated with the diesel CLI.
#[cfg(debug_assertions)]
fn migrate(_: &PgConnection) -> Result<(), PoolError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_size_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{"url":"postgres://localhost/folio"}"#).unwrap();
        assert_eq!(cfg.pool_size, 10);

        let cfg: Config = serde_json::from_str(
            r#"{"url":"postgres://localhost/folio","pool_size":2}"#).unwrap();
        assert_eq!(cfg.pool_size, 2);
    }
}
