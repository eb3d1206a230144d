//! Logging environment section: level, format, and target, each read from its own variable.

use super::env_or_string;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let format = match env_or_string("LOG_FORMAT", "pretty").as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };
        Self {
            level: env_or_string("LOG_LEVEL", "info"),
            format,
        }
    }

    /// Install the global `tracing` subscriber (§10.2) — called once, at process start.
    pub fn init_tracing(&self) {
        let filter = || {
            tracing_subscriber::EnvFilter::try_new(&self.level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        };
        let result = match self.format {
            LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter()).try_init(),
            LogFormat::Json => tracing_subscriber::fmt()
                .with_env_filter(filter())
                .json()
                .try_init(),
        };
        if let Err(err) = result {
            eprintln!("tracing subscriber already initialized: {err}");
        }
    }
}
