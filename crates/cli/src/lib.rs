use failure::Error;
use folio_models::{PgStore, db};
use sentry::protocol::Event;
use std::{env, mem, path::PathBuf, sync::Arc};
use structopt::StructOpt;

mod config;
mod entry;
mod page;
mod server;
mod util;

use self::config::Config;

pub type Result<T, E=Error> = std::result::Result<T, E>;

#[derive(StructOpt)]
#[structopt(name = "folio")]
struct Opts {
    /// Configuration file
    #[structopt(short = "c", long = "config", default_value = "config.toml",
        parse(from_os_str))]
    config: PathBuf,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Manage server
    #[structopt(name = "server")]
    Server(server::Opts),
    /// Manage pages
    #[structopt(name = "page")]
    Page(page::Opts),
    /// Manage content entries
    #[structopt(name = "entry")]
    Entry(entry::Opts),
}

pub fn main() -> Result<(), Error> {
    let opts = Opts::from_args();
    let config = config::load(&opts.config)?;

    setup_sentry(&config);
    setup_logging(&config.logging)?;

    match opts.command {
        Command::Server(opts) => server::main(config, opts),
        Command::Page(opts) => page::main(&open_store(&config)?, opts),
        Command::Entry(opts) => entry::main(&open_store(&config)?, opts),
    }
}

/// Connect to the database configured in `config`.
fn open_store(config: &Config) -> Result<PgStore> {
    let pool = db::create_pool(config.database.as_ref())?;
    Ok(PgStore::new(pool))
}

/// Report panics and errors to Sentry, if it is configured.
///
/// The returned guard is leaked so that reporting lasts for the whole process.
fn setup_sentry(config: &Config) {
    let sentry = match config.sentry {
        Some(ref sentry) => sentry,
        None => return,
    };

    env::set_var("RUST_BACKTRACE", "1");

    let options = sentry::ClientOptions {
        environment: sentry.environment.clone().map(Into::into),
        release: Some(env!("CARGO_PKG_VERSION").into()),
        server_name: Some(config.server.domain.clone().into()),
        debug: cfg!(debug_assertions),
        trim_backtraces: true,
        before_send: Some(Arc::new(Box::new(scrub_event))),
        .. Default::default()
    };

    mem::forget(sentry::init((sentry.dsn.as_str(), options)));
    sentry::integrations::panic::register_panic_handler();
}

fn setup_logging(config: &config::Logging) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(config.level);
    builder.filter_module("actix_web", config.network.unwrap_or(config.level));

    for (module, &level) in &config.filters {
        builder.filter_module(module, level);
    }

    Ok(builder.try_init()?)
}

/// Headers which may carry credentials.
const PRIVATE_HEADERS: &[&str] = &["cookie", "authorization"];

fn scrub_event(mut event: Event<'static>) -> Option<Event<'static>> {
    if let Some(ref mut request) = event.request {
        request.headers.retain(|name, _| !PRIVATE_HEADERS.iter()
            .any(|private| name.eq_ignore_ascii_case(private)));
    }
    Some(event)
}
