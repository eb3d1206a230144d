//! `ScheduledJob` / `ScheduledJobRun` — the enqueue contract named by §6's storage collection
//! list. Cron evaluation is out of scope (§1 Non-goals); the core only persists "what should be
//! enqueued next" so an external scheduler can read and act on it.

use super::ids::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: Uuid,
    pub cron_expression: String,
    pub job_type: String,
    pub payload_template: serde_json::Value,
    pub enabled: bool,
    pub next_run_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledJobRun {
    pub id: Uuid,
    pub scheduled_job_id: Uuid,
    pub triggered_at: DateTime<Utc>,
    pub enqueued_job_id: Option<JobId>,
}
