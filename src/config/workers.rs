//! Worker environment section (§6).

use super::env_or;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub concurrency: usize,
    pub handler_deadline_seconds: u64,
    pub stale_job_threshold_seconds: u64,
    pub retention_days: u32,
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        Self {
            concurrency: env_or("WORKERS_CONCURRENCY", 8),
            handler_deadline_seconds: env_or("WORKERS_HANDLER_DEADLINE_SECONDS", 600),
            stale_job_threshold_seconds: env_or("WORKERS_STALE_JOB_THRESHOLD_SECONDS", 300),
            retention_days: env_or("WORKERS_RETENTION_DAYS", 30),
        }
    }
}
