use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document conflict: {0}")]
    Conflict(String),

    #[error("document not found: {0}")]
    NotFound(String),

    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("bson serialization error: {0}")]
    Bson(#[from] bson::ser::Error),

    #[error("bson deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conflict(_) => "store-conflict",
            Self::NotFound(_) => "store-not-found",
            Self::Mongo(_) => "store-unavailable",
            Self::Bson(_) | Self::BsonDe(_) => "store-serialization",
        }
    }
}
