//! Store environment section (§6).

use super::{env_or, env_or_string};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub connection_string: String,
    pub database_name: String,
    pub connection_timeout_ms: u64,
    pub socket_timeout_ms: u64,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub retry_writes: bool,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            connection_string: env_or_string(
                "STORE_CONNECTION_STRING",
                "mongodb://localhost:27017",
            ),
            database_name: env_or_string("STORE_DATABASE_NAME", "imageviewer"),
            connection_timeout_ms: env_or("STORE_CONNECTION_TIMEOUT_MS", 10_000),
            socket_timeout_ms: env_or("STORE_SOCKET_TIMEOUT_MS", 30_000),
            max_pool_size: env_or("STORE_MAX_POOL_SIZE", 100),
            min_pool_size: env_or("STORE_MIN_POOL_SIZE", 5),
            retry_writes: env_or("STORE_RETRY_WRITES", true),
        }
    }
}
