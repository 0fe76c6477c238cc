use failure::Fail;
use folio_models::db::Config as DatabaseConfig;
use log::LevelFilter;
use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use crate::Result;

/// Read configuration from a TOML file.
pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read(path).map_err(ReadConfigurationError)?;
    Ok(toml::from_slice(&data).map_err(ConfigurationError)?)
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: folio_rest_api::Config,
    /// Database connection. May be left out if `DATABASE_URL` is set.
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub logging: Logging,
    pub sentry: Option<Sentry>,
}

/// Logging configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Logging {
    /// Default logging level.
    #[serde(default = "default_level_filter")]
    pub level: LevelFilter,
    /// Actix-web logging level.
    pub network: Option<LevelFilter>,
    /// Custom filters.
    #[serde(default)]
    pub filters: HashMap<String, LevelFilter>,
}

/// Sentry.io configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Sentry {
    /// Client key.
    pub dsn: String,
    /// Name of this deployment, e.g. `production`.
    pub environment: Option<String>,
}

#[derive(Debug, Fail)]
#[fail(display = "Cannot read configuration file")]
pub struct ReadConfigurationError(#[fail(cause)] std::io::Error);

#[derive(Debug, Fail)]
#[fail(display = "Invalid configuration: {}", _0)]
pub struct ConfigurationError(#[fail(cause)] toml::de::Error);

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: default_level_filter(),
            network: None,
            filters: HashMap::new(),
        }
    }
}
