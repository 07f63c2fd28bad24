//! Server bootstrap configuration.
//!
//! Everything that has its own crate-owned `from_env()` already - Postgres
//! pool sizing (`ticketledger_db::DatabaseConfig`), the bus
//! (`ticketledger_bus::BusConfig`), outbound adapters
//! (`ticketledger_adapters::{PaymentConfig, RpcConfig}`), and the engine
//! (`ticketledger_usecases::{EngineConfig, SchedulerConfig}`) - stays there.
//! This module only owns the bind address and the handful of `DATABASE__*`
//! overrides the ambient env-var surface names that the database crate's
//! own `PG_*` variables don't cover.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseOverrides,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port).parse().expect("invalid socket address")
    }
}

/// Connection-pool sizing via the `TICKETLEDGER__DATABASE__*` env keys,
/// layered on top of `ticketledger_db::DatabaseConfig::from_env()`'s own
/// `PG_MAX_CONNECTIONS`/`PG_MIN_CONNECTIONS` defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseOverrides {
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    /// Loads from `config/default.{toml,json,yaml}`, `config/local.*`, then
    /// `TICKETLEDGER__*` environment variables, in that order of increasing
    /// precedence - falling back to defaults if nothing deserializes.
    pub fn load() -> Self {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TICKETLEDGER").separator("__").try_parsing(true));

        match builder.build() {
            Ok(raw) => raw.try_deserialize().unwrap_or_else(|err| {
                tracing::warn!(error = %err, "failed to deserialize server config, using defaults");
                ServerConfig::default()
            }),
            Err(err) => {
                tracing::warn!(error = %err, "failed to build server config, using defaults");
                ServerConfig::default()
            }
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { server: ServerSettings::default(), database: DatabaseOverrides::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_to_port_8080() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
