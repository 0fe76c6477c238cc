//! Server administration.

use actix::System;
use actix_web::{App, HttpServer, middleware::{Compress, Logger}, web::Data};
use failure::{Error, err_msg};
use folio_models::{PgStore, SharedStore, db};
use folio_pages::Templates;
use log::info;
use std::sync::Arc;
use structopt::StructOpt;

use crate::Config;

#[derive(StructOpt)]
pub struct Opts {
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Start the server
    #[structopt(name = "start")]
    Start,
}

pub fn main(cfg: Config, opts: Opts) -> Result<(), Error> {
    match opts.command {
        Command::Start => start(cfg),
    }
}

pub fn start(config: Config) -> Result<(), Error> {
    let system = System::new("folio");

    let pool = db::create_pool(config.database.as_ref())?;
    let store: SharedStore = Arc::new(PgStore::new(pool));

    // Tera's errors can't cross threads, keep only the message.
    let templates = Data::new(Templates::new()
        .map_err(|err| err_msg(err.to_string()))?);

    let address = config.server.address;
    let domain = config.server.domain.clone();

    let server = HttpServer::new(move ||
        App::new()
            .hostname(&config.server.domain)
            .data(store.clone())
            .register_data(templates.clone())
            .wrap(Logger::default())
            .wrap(Compress::default())
            .configure(folio_rest_api::configure)
            .configure(folio_pages::configure)
    );

    let server = if let Some(fd) = listenfd::ListenFd::from_env().take_tcp_listener(0)? {
        server.listen(fd)?
    } else {
        server.bind(address)?
    };

    info!("Serving {} on {}", domain, address);

    server
        .server_hostname(domain)
        .start();

    system.run()?;

    Ok(())
}
