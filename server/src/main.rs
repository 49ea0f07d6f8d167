/// Quiz statistics server
///
/// Main server entry point. Handles:
/// - Environment and command-line configuration
/// - Credential store connection (degraded mode if unavailable)
/// - HTTP server startup
use actix_web::web;
use anyhow::Context;
use quiz_stats_server::config::Config;
use quiz_stats_server::state::AppState;
use quiz_stats_server::{db, server};
use std::fs;
use std::process;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads the environment
    let dotenv = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Ok(path) = dotenv {
        log::info!("Loaded environment from {:?}", path);
    }

    let config = Config::from_args();

    log::info!("Starting Quiz Stats Server");
    log::info!("Store backend: {}", config.backend.as_str());
    log::info!("bcrypt cost: {}", config.bcrypt_cost);

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        let pid = process::id().to_string();
        fs::write(pidfile, pid)
            .with_context(|| format!("failed to write PID file {:?}", pidfile))?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    let state = AppState::from_connect_result(db::connect(&config.store_settings()).await);

    let bind_addr = config.bind_addr();
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(web::Data::new(state), &bind_addr)
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    http_server.await?;

    Ok(())
}
