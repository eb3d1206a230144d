//! Queue-driven media-processing pipeline: archive ingestion, thumbnail/cache derivative
//! generation, and resumable, idempotent job-state tracking across a pool of consumer workers.

pub mod allocator;
pub mod archive;
pub mod broker;
pub mod config;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod renderer;
pub mod resume;
pub mod store;
pub mod workers;

pub use error::{PipelineError, PipelineResult};
