//! `FileProcessingJobState` — one per scan/generation run.
//!
//! The set bookkeeping (`processed_image_ids`, `failed_image_ids`) and error summary are what
//! make redelivery idempotent and reporting possible.

use super::ids::{CollectionId, ImageId, JobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Scan,
    Thumbnail,
    Cache,
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::Thumbnail => write!(f, "thumbnail"),
            Self::Cache => write!(f, "cache"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Paused,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Pending | Self::Running | Self::Paused)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessingJobState {
    pub job_id: JobId,
    pub job_type: JobType,
    pub collection_id: CollectionId,
    pub status: JobStatus,

    pub total_images: u64,
    pub completed_images: u64,
    pub failed_images: u64,
    pub skipped_images: u64,
    pub total_size_bytes: u64,

    pub processed_image_ids: HashSet<ImageId>,
    pub failed_image_ids: HashSet<ImageId>,

    pub error_summary: HashMap<String, u64>,
    pub dummy_entry_count: u64,
    pub has_errors: bool,

    pub started_at: DateTime<Utc>,
    pub last_progress_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub can_resume: bool,
    pub error_message: Option<String>,
}

impl FileProcessingJobState {
    pub fn new(job_type: JobType, collection_id: CollectionId, total_images: u64) -> Self {
        let now = Utc::now();
        Self {
            job_id: JobId::new(),
            job_type,
            collection_id,
            status: JobStatus::Pending,
            total_images,
            completed_images: 0,
            failed_images: 0,
            skipped_images: 0,
            total_size_bytes: 0,
            processed_image_ids: HashSet::new(),
            failed_image_ids: HashSet::new(),
            error_summary: HashMap::new(),
            dummy_entry_count: 0,
            has_errors: false,
            started_at: now,
            last_progress_at: now,
            completed_at: None,
            can_resume: true,
            error_message: None,
        }
    }

    /// `IsProcessed(jobId, imageId)` — membership in `processedImageIds ∪ failedImageIds` (§4.D).
    pub fn is_processed(&self, image_id: ImageId) -> bool {
        self.processed_image_ids.contains(&image_id) || self.failed_image_ids.contains(&image_id)
    }

    /// `completed = |processed|`, `failed = |failed|`, and the two sets are disjoint.
    pub fn counters_sound(&self) -> bool {
        self.completed_images == self.processed_image_ids.len() as u64
            && self.failed_images == self.failed_image_ids.len() as u64
            && self.processed_image_ids.is_disjoint(&self.failed_image_ids)
            && self.completed_images + self.failed_images + self.skipped_images <= self.total_images
    }

    pub fn is_terminal_reached(&self) -> bool {
        self.completed_images + self.failed_images + self.skipped_images >= self.total_images
    }

    pub fn percentage(&self) -> f64 {
        if self.total_images == 0 {
            return 0.0;
        }
        (self.completed_images + self.failed_images + self.skipped_images) as f64
            / self.total_images as f64
    }
}
