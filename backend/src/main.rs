//! Service entry-point: loads configuration, prepares the SQLite store, and
//! serves the coil API.

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use coil_inventory::inbound::http::health::HealthState;
use coil_inventory::outbound::persistence::DbPool;
use coil_inventory::server::{ServerConfig, create_server};
use coil_inventory::settings::ServiceSettings;

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

    let settings = ServiceSettings::load().map_err(|e| {
        error!(error = %e, "failed to load configuration");
        std::io::Error::other(format!("configuration error: {e}"))
    })?;

    let pool = DbPool::new(settings.pool_config()).await.map_err(|e| {
        error!(error = %e, database_url = settings.database_url(), "store initialisation failed");
        std::io::Error::other(format!("store initialisation failed: {e}"))
    })?;
    info!(database_url = settings.database_url(), "store ready");

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(settings.bind_addr()).with_db_pool(pool);
    let server = create_server(health_state, config)?;
    server.await
}
