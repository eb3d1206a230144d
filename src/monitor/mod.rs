//! Progress/Monitor (§4.H) — aggregates `FileProcessingJobState` into an operator-facing status,
//! and runs the periodic sweep that alone is allowed to mark a job `Completed`.

mod types;

pub use types::{Health, HealthStatus, JobStatusReport, Metrics, Progress, Timing};

use crate::domain::{JobId, JobStatus};
use crate::store::JobStateStore;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::Duration;

const RATE_WINDOW: chrono::Duration = chrono::Duration::seconds(60);
const DEGRADED_FAILURE_RATIO: f64 = 0.1;

pub struct Monitor {
    job_states: JobStateStore,
    stale_threshold: Duration,
    rate_samples: DashMap<JobId, VecDeque<(DateTime<Utc>, u64)>>,
}

impl Monitor {
    pub fn new(job_states: JobStateStore, stale_threshold: Duration) -> Self {
        Self {
            job_states,
            stale_threshold,
            rate_samples: DashMap::new(),
        }
    }

    /// `GetJobStatus(jobId)` (§4.H).
    pub async fn get_job_status(&self, job_id: JobId) -> crate::error::PipelineResult<JobStatusReport> {
        let state = self
            .job_states
            .get(job_id)
            .await?
            .ok_or_else(|| crate::error::PipelineError::Other(format!("job {job_id} not found")))?;

        let processed = state.completed_images + state.failed_images + state.skipped_images;
        let percentage = if state.total_images == 0 {
            0.0
        } else {
            processed as f64 / state.total_images as f64
        };

        let items_per_second = self.record_and_compute_rate(job_id, processed);

        let now = Utc::now();
        let duration_seconds = (now - state.started_at).num_seconds();

        let estimated_time_remaining_seconds = if items_per_second > 0.0 {
            Some((state.total_images.saturating_sub(processed)) as f64 / items_per_second)
        } else {
            None
        };

        let health = self.compute_health(&state, now);

        Ok(JobStatusReport {
            job_id,
            status: state.status,
            progress: Progress {
                total: state.total_images,
                completed: state.completed_images,
                failed: state.failed_images,
                skipped: state.skipped_images,
                percentage,
            },
            timing: Timing {
                started_at: state.started_at,
                duration_seconds,
                estimated_time_remaining_seconds,
            },
            metrics: Metrics {
                items_per_second,
                retry_count: state.error_summary.values().sum(),
            },
            health,
        })
    }

    fn compute_health(&self, state: &crate::domain::FileProcessingJobState, now: DateTime<Utc>) -> Health {
        let mut issues = Vec::new();

        let stalled = state.status == JobStatus::Running
            && (now - state.last_progress_at).num_seconds() as u64 > self.stale_threshold.as_secs();

        if stalled {
            let last_error_kind = state.error_summary.keys().last().cloned();
            issues.push(match last_error_kind {
                Some(kind) => format!("no progress since {}; last error kind: {kind}", state.last_progress_at),
                None => format!("no progress since {}", state.last_progress_at),
            });
            return Health {
                status: HealthStatus::Stalled,
                issues,
            };
        }

        let failure_ratio = if state.total_images == 0 {
            0.0
        } else {
            state.failed_images as f64 / state.total_images as f64
        };

        if failure_ratio > DEGRADED_FAILURE_RATIO {
            issues.push(format!(
                "{:.1}% of images have failed, exceeding the 10% threshold",
                failure_ratio * 100.0
            ));
            return Health {
                status: HealthStatus::Degraded,
                issues,
            };
        }

        Health {
            status: HealthStatus::Healthy,
            issues,
        }
    }

    /// Maintains a 60-second sliding window of `(timestamp, processed_count)` samples per job
    /// and returns the resulting items/second rate.
    fn record_and_compute_rate(&self, job_id: JobId, processed: u64) -> f64 {
        let now = Utc::now();
        let mut samples = self.rate_samples.entry(job_id).or_default();
        samples.push_back((now, processed));
        while let Some((oldest_at, _)) = samples.front() {
            if now - *oldest_at > RATE_WINDOW {
                samples.pop_front();
            } else {
                break;
            }
        }

        let Some((oldest_at, oldest_count)) = samples.front().copied() else {
            return 0.0;
        };
        let elapsed_seconds = (now - oldest_at).num_milliseconds() as f64 / 1000.0;
        if elapsed_seconds <= 0.0 {
            return 0.0;
        }
        (processed.saturating_sub(oldest_count)) as f64 / elapsed_seconds
    }

    /// Periodic sweep (§4.H): transitions jobs to `Completed` once their terminal condition is
    /// reached. Workers never set `Completed` directly, to avoid last-message ordering races.
    pub async fn sweep_completed(&self) -> crate::error::PipelineResult<u64> {
        let incomplete = self.job_states.get_incomplete_jobs().await?;
        let mut transitioned = 0;
        for job in incomplete {
            if job.is_terminal_reached() {
                self.job_states
                    .update_status(job.job_id, JobStatus::Completed, None)
                    .await?;
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }
}
