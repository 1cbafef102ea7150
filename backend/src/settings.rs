//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `COILS_*` environment variables, command-line flags, or
//! a configuration file. Numeric settings carry declared defaults, so the
//! service starts with nothing configured.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_DATABASE_URL: &str = "coils.db";

/// Configuration values controlling the listener and the SQLite store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COILS")]
pub struct ServiceSettings {
    /// Address the HTTP listener binds to.
    pub bind_host: Option<IpAddr>,
    /// Port the HTTP listener binds to.
    #[ortho_config(default = 8080)]
    pub bind_port: u16,
    /// Path of the SQLite database file, or `:memory:`.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    #[ortho_config(default = 8)]
    pub pool_max_size: u32,
    /// Seconds to wait for a pooled connection before failing.
    #[ortho_config(default = 30)]
    pub pool_connection_timeout_secs: u64,
}

impl ServiceSettings {
    /// Return the socket address to bind, listening on all interfaces unless
    /// a host is configured.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host.unwrap_or(DEFAULT_BIND_HOST), self.bind_port)
    }

    /// Return the configured database location, falling back to `coils.db`.
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Build the connection pool configuration from these settings.
    ///
    /// # Examples
    /// ```
    /// use coil_inventory::settings::ServiceSettings;
    ///
    /// let settings = ServiceSettings {
    ///     bind_host: None,
    ///     bind_port: 8080,
    ///     database_url: Some("stock.db".into()),
    ///     pool_max_size: 2,
    ///     pool_connection_timeout_secs: 30,
    /// };
    /// assert_eq!(settings.pool_config().database_url(), "stock.db");
    /// ```
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new(self.database_url())
            .with_max_size(self.pool_max_size)
            .with_connection_timeout(Duration::from_secs(self.pool_connection_timeout_secs))
    }
}
