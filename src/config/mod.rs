//! Layered environment configuration.
//!
//! Sourced entirely from environment variables with typed defaults, since this is a
//! long-running worker process rather than a desktop app reading a config file off disk.

mod broker;
mod logging;
mod store;
mod workers;

pub use broker::BrokerConfig;
pub use logging::LoggingConfig;
pub use store::StoreConfig;
pub use workers::WorkerConfig;

use serde::{Deserialize, Serialize};

/// Top-level process configuration, aggregating every environment section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    pub broker: BrokerConfig,
    pub store: StoreConfig,
    pub workers: WorkerConfig,
    pub logging: LoggingConfig,
}

impl EnvConfig {
    /// Load configuration from environment variables, falling back to documented defaults for
    /// anything unset.
    pub fn load() -> Self {
        Self {
            broker: BrokerConfig::from_env(),
            store: StoreConfig::from_env(),
            workers: WorkerConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_var(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_or_string(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}

pub(crate) use {env_or, env_or_string, env_var};
