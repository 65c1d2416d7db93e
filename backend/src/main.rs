//! Backend entry-point: loads settings, prepares stores, and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lostfound::inbound::http::health::HealthState;
use lostfound::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::settings::{AppSettings, BuildMode};
use server::{ServerConfig, create_server};

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

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let mut config = server_config(&settings, BuildMode::from_debug_assertions())?;
    let bind_addr = config.bind_addr;
    if let Some(database_url) = settings.database_url.as_deref() {
        run_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
        info!("using PostgreSQL stores");
    } else {
        warn!("no database configured; using in-memory stores");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}

/// Server configuration from loaded settings, before any database pool.
fn server_config(settings: &AppSettings, mode: BuildMode) -> std::io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let signing_key = settings
        .signing_key(mode)
        .map_err(std::io::Error::other)?;
    let deletion_policy = settings.deletion_policy().map_err(std::io::Error::other)?;
    Ok(ServerConfig::new(bind_addr, signing_key).with_deletion_policy(deletion_policy))
}
