//! Folio's administrative REST API.

use actix_web::web::{self, ServiceConfig};

mod config;
mod entries;
mod pages;
mod sections;

#[cfg(test)]
mod test_util;

pub use self::config::Config;

pub type Result<T, E=folio_error::Error> = std::result::Result<T, E>;

/// Configure [`App`] for an API server.
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(entries::configure)
            .configure(pages::configure)
            .configure(sections::configure)
    );
}
