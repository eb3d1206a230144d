use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("amqp connection error: {0}")]
    Connection(#[from] lapin::Error),

    #[error("message envelope could not be decoded: {0}")]
    InvalidEnvelope(#[from] serde_json::Error),

    #[error("queue {queue} already exists with incompatible arguments")]
    QueueArgsMismatch { queue: String },

    #[error("broker connection pool error: {0}")]
    Pool(String),
}

impl BrokerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "broker-unavailable",
            Self::InvalidEnvelope(_) => "broker-invalid-envelope",
            Self::QueueArgsMismatch { .. } => "broker-queue-args-mismatch",
            Self::Pool(_) => "broker-unavailable",
        }
    }
}
