//! Operator-visible `BackgroundJob` with per-stage counters (§3, §4.H).

use super::ids::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStage {
    pub total_items: u64,
    pub completed_items: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobStage {
    pub fn new(total_items: u64) -> Self {
        Self {
            total_items,
            completed_items: 0,
            started_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_items >= self.total_items
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundJob {
    pub id: JobId,
    pub job_type: String,
    pub status: super::job_state::JobStatus,
    pub stages: HashMap<String, JobStage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BackgroundJob {
    pub fn new(id: JobId, job_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            job_type: job_type.into(),
            status: super::job_state::JobStatus::Pending,
            stages: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
