//! Broker environment section (§6).

use super::{env_or, env_or_string};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub hostname: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub vhost: String,
    pub prefetch_count: u16,
    pub max_retry_count: u32,
    pub message_timeout_hours: u64,
    pub max_queue_length: u64,
    pub message_batch_size: u32,
    pub max_image_size_bytes: u64,
    pub max_zip_entry_size_bytes: u64,
}

impl BrokerConfig {
    pub fn from_env() -> Self {
        Self {
            hostname: env_or_string("BROKER_HOSTNAME", "localhost"),
            port: env_or("BROKER_PORT", 5672),
            user: env_or_string("BROKER_USER", "guest"),
            password: env_or_string("BROKER_PASSWORD", "guest"),
            vhost: env_or_string("BROKER_VHOST", "/"),
            prefetch_count: env_or("BROKER_PREFETCH_COUNT", 100),
            max_retry_count: env_or("BROKER_MAX_RETRY_COUNT", 3),
            message_timeout_hours: env_or("BROKER_MESSAGE_TIMEOUT_HOURS", 24),
            max_queue_length: env_or("BROKER_MAX_QUEUE_LENGTH", 50_000_000),
            message_batch_size: env_or("BROKER_MESSAGE_BATCH_SIZE", 100),
            max_image_size_bytes: env_or("BROKER_MAX_IMAGE_SIZE_BYTES", 500 * 1024 * 1024),
            max_zip_entry_size_bytes: env_or(
                "BROKER_MAX_ZIP_ENTRY_SIZE_BYTES",
                20 * 1024 * 1024 * 1024,
            ),
        }
    }

    pub fn amqp_uri(&self) -> String {
        format!(
            "amqp://{}:{}@{}:{}/{}",
            self.user,
            self.password,
            self.hostname,
            self.port,
            percent_encode_vhost(&self.vhost)
        )
    }
}

fn percent_encode_vhost(vhost: &str) -> String {
    if vhost == "/" {
        "%2f".to_string()
    } else {
        vhost.to_string()
    }
}
