//! Publishes typed messages onto the topic exchange (§4.F).

use super::error::BrokerError;
use super::messages::QueueName;
use super::topology::EXCHANGE;
use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use serde::Serialize;

#[derive(Clone)]
pub struct Publisher {
    channel: Channel,
}

impl Publisher {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    pub async fn publish<T: Serialize>(&self, queue: QueueName, payload: &T) -> Result<(), BrokerError> {
        let body = serde_json::to_vec(payload)?;
        self.channel
            .basic_publish(
                EXCHANGE,
                queue.routing_key(),
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default().with_delivery_mode(2),
            )
            .await?
            .await?;
        Ok(())
    }
}
