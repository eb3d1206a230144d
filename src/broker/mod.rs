//! Message Broker Adapter (§4.F) — a topic exchange over AMQP 0.9.1 with five durable queues.

mod consumer;
mod error;
mod messages;
mod publisher;
mod topology;

pub use consumer::{Consumer, Delivery};
pub use error::BrokerError;
pub use messages::{
    CacheGenerationMessage, CollectionCreationMessage, CollectionScanMessage,
    ImageProcessingMessage, JobScoped, QueueName, ThumbnailGenerationMessage,
};
pub use publisher::Publisher;

use crate::config::BrokerConfig;
use deadpool_lapin::{Config as PoolConfig, Pool, Runtime};

#[derive(Clone)]
pub struct Broker {
    pool: Pool,
}

impl Broker {
    pub async fn connect(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let pool_config = PoolConfig {
            url: Some(config.amqp_uri()),
            ..Default::default()
        };
        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| BrokerError::Pool(e.to_string()))?;

        let connection = pool.get().await.map_err(|e| BrokerError::Pool(e.to_string()))?;
        let channel = connection.create_channel().await?;
        topology::declare(&channel, config).await?;

        Ok(Self { pool })
    }

    pub async fn channel(&self) -> Result<lapin::Channel, BrokerError> {
        let connection = self.pool.get().await.map_err(|e| BrokerError::Pool(e.to_string()))?;
        Ok(connection.create_channel().await?)
    }

    pub async fn publisher(&self) -> Result<Publisher, BrokerError> {
        Ok(Publisher::new(self.channel().await?))
    }

    pub async fn consumer(
        &self,
        queue: QueueName,
        config: &BrokerConfig,
    ) -> Result<Consumer, BrokerError> {
        let channel = self.channel().await?;
        Consumer::new(channel, queue, config.prefetch_count, config.max_retry_count).await
    }

    /// `ClearQueue(queueName)` (§6 CLI surface) — purges pending messages without redeclaring
    /// the queue, so its dead-letter/TTL arguments are untouched.
    pub async fn purge_queue(&self, queue: QueueName) -> Result<u32, BrokerError> {
        let channel = self.channel().await?;
        let purged = channel
            .queue_purge(queue.as_str(), lapin::options::QueuePurgeOptions::default())
            .await?;
        Ok(purged)
    }
}
