use crate::domain::{JobId, JobStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Stalled,
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: HealthStatus,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Timing {
    pub started_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub estimated_time_remaining_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub items_per_second: f64,
    pub retry_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobStatusReport {
    pub job_id: JobId,
    pub status: JobStatus,
    pub progress: Progress,
    pub timing: Timing,
    pub metrics: Metrics,
    pub health: Health,
}
