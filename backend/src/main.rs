//! Roster entry-point: loads settings, migrates the schema and serves HTTP.

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use roster::config::AppConfig;
use roster::inbound::http::health::HealthState;
use roster::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use roster::server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::load().map_err(std::io::Error::other)?;
    run_pending_migrations(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let server_config = ServerConfig::from(&config);
    info!(address = %server_config.bind_addr(), "starting roster server");
    let server = create_server(health_state, server_config, pool)?;
    server.await
}
