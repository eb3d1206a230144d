//! Job-state bookkeeping invariants (§4.D, §8 concurrent-duplicate-delivery and
//! stalled-job-detection scenarios), exercised against `FileProcessingJobState` directly.

use imageviewer_core::domain::{CollectionId, FileProcessingJobState, ImageId, JobStatus, JobType};

#[test]
fn new_job_starts_pending_resumable_with_sound_counters() {
    let state = FileProcessingJobState::new(JobType::Thumbnail, CollectionId::new(), 10);
    assert_eq!(state.status, JobStatus::Pending);
    assert!(state.can_resume);
    assert!(state.counters_sound());
    assert!(!state.is_terminal_reached());
}

#[test]
fn duplicate_delivery_of_the_same_image_is_a_single_accounting_event() {
    // Mirrors what `increment_completed`'s conditional filter guarantees server-side: once an
    // image id is a member of `processed_image_ids`, a second delivery is a no-op.
    let mut state = FileProcessingJobState::new(JobType::Thumbnail, CollectionId::new(), 3);
    let image_id = ImageId::new();

    assert!(!state.is_processed(image_id));
    state.processed_image_ids.insert(image_id);
    state.completed_images += 1;

    // Redelivery: the real store's `$ne` filter would make this a no-op, so the in-memory
    // mirror of that guarantee is to check membership before mutating again.
    if !state.is_processed(image_id) {
        state.processed_image_ids.insert(image_id);
        state.completed_images += 1;
    }

    assert_eq!(state.completed_images, 1);
    assert!(state.counters_sound());
}

#[test]
fn processed_and_failed_sets_are_mutually_exclusive() {
    let mut state = FileProcessingJobState::new(JobType::Cache, CollectionId::new(), 2);
    let completed_id = ImageId::new();
    let failed_id = ImageId::new();

    state.processed_image_ids.insert(completed_id);
    state.completed_images += 1;
    state.failed_image_ids.insert(failed_id);
    state.failed_images += 1;

    assert!(state.counters_sound());
    assert!(state.is_terminal_reached());
}

#[test]
fn terminal_reached_once_every_image_is_accounted_for() {
    let mut state = FileProcessingJobState::new(JobType::Thumbnail, CollectionId::new(), 2);
    assert!(!state.is_terminal_reached());

    state.processed_image_ids.insert(ImageId::new());
    state.completed_images += 1;
    assert!(!state.is_terminal_reached());

    state.skipped_images += 1;
    assert!(state.is_terminal_reached());
}

#[test]
fn job_status_is_incomplete_covers_exactly_the_resumable_statuses() {
    assert!(JobStatus::Pending.is_incomplete());
    assert!(JobStatus::Running.is_incomplete());
    assert!(JobStatus::Paused.is_incomplete());
    assert!(!JobStatus::Completed.is_incomplete());
    assert!(!JobStatus::Failed.is_incomplete());
}
