mod config;
mod database;
mod sanitizer;
mod server;
mod service;
mod timing;

use std::{env, error::Error, sync::Arc};

use config::{Config, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use database::sqlite::SqliteScheduleStore;
use env_logger::Env;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use log::{error, info, warn};
use r2d2_sqlite::SqliteConnectionManager;
use server::{nonce::NonceRegistry, server::Server};
use service::availability::ScheduleService;
use timing::clock::SystemClock;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match Config::from_file(&config_path)? {
        Some(config) => config,
        None => {
            warn!("No config file at {}, using defaults", config_path);
            Config::default()
        }
    };
    let timezone = config.timezone()?;
    let address = config.bind_address()?;
    if config.admin_token.is_none() {
        warn!("No admin_token configured, admin endpoints are disabled");
    }

    let manager = SqliteConnectionManager::file(&config.database_path);
    let pool = Arc::new(r2d2::Pool::builder().build(manager)?);
    let store = SqliteScheduleStore::setup(pool)?;

    let service = ScheduleService::new(
        Arc::new(store),
        Arc::new(SystemClock::new(timezone)),
        config.messages(),
    );
    let server = Server::setup(
        service,
        NonceRegistry::new(config.nonce_lifetime()),
        config.admin_token.clone(),
    );

    let listener = TcpListener::bind(address).await?;
    info!("Listening on {} ({})", address, timezone.name());

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(connection) => connection,
            Err(err) => {
                warn!("Could not accept connection: {}", err);
                continue;
            }
        };
        let io = TokioIo::new(stream);
        let server_clone = server.clone();
        tokio::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .serve_connection(io, server_clone)
                .await
            {
                warn!("{}", err);
            }
        });
    }
}
