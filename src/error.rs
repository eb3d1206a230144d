//! Crate-level error aggregation: every component gets its own `thiserror` enum, aggregated
//! here with `#[from]`.

use crate::allocator::AllocatorError;
use crate::archive::ArchiveError;
use crate::broker::BrokerError;
use crate::renderer::RenderError;
use crate::store::StoreError;
use thiserror::Error;

pub type PipelineResult<T = ()> = Result<T, PipelineError>;

/// The error-kind taxonomy of §7, flattened into one enum so workers can translate any failure
/// into (ack | nack-requeue | nack-dead-letter) without matching on five separate error types.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Allocator(#[from] AllocatorError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("duplicate delivery for already-processed item")]
    DuplicateDelivery,

    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Error-kind string as recorded in `FileProcessingJobState.error_summary` (§4.D, §7).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Archive(e) => e.kind(),
            Self::Render(e) => e.kind(),
            Self::Allocator(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Broker(e) => e.kind(),
            Self::DuplicateDelivery => "duplicate-delivery",
            Self::Other(_) => "other",
        }
    }

    /// Render-deterministic errors are surfaced as failed items, never as job failures (§7
    /// propagation policy) — the handler should ack and record, not nack-requeue.
    pub fn is_render_deterministic(&self) -> bool {
        matches!(self, Self::Archive(_) | Self::Render(_))
    }

    /// Infrastructure errors should nack for broker-level retry (§7 propagation policy).
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Broker(_))
    }
}
