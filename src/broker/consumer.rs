//! Consumer posture: `prefetch=100`, manual ack, counted retry before dead-lettering (§4.F).

use super::error::BrokerError;
use super::messages::QueueName;
use super::topology::EXCHANGE;
use futures_util::StreamExt;
use lapin::message::Delivery as LapinDelivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{BasicProperties, Channel};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

const RETRY_COUNT_HEADER: &str = "x-retry-count";

pub struct Consumer {
    channel: Channel,
    queue: QueueName,
    max_retry_count: u32,
    stream: Mutex<lapin::Consumer>,
}

pub struct Delivery<T> {
    pub payload: T,
    raw: LapinDelivery,
    retry_count: u32,
}

impl Consumer {
    pub async fn new(channel: Channel, queue: QueueName, prefetch: u16, max_retry_count: u32) -> Result<Self, BrokerError> {
        channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await?;
        let stream = channel
            .basic_consume(
                queue.as_str(),
                "",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;
        Ok(Self {
            channel,
            queue,
            max_retry_count,
            stream: Mutex::new(stream),
        })
    }

    /// Pulls the next decodable delivery; envelopes that fail to decode are dead-lettered
    /// immediately, since no retry will ever make them parse.
    pub async fn next<T: DeserializeOwned>(&self) -> Result<Option<Delivery<T>>, BrokerError> {
        let mut stream = self.stream.lock().await;
        let Some(delivery) = stream.next().await else {
            return Ok(None);
        };
        drop(stream);
        let delivery = delivery?;

        let retry_count = read_retry_count(&delivery);

        match serde_json::from_slice::<T>(&delivery.data) {
            Ok(payload) => Ok(Some(Delivery {
                payload,
                raw: delivery,
                retry_count,
            })),
            Err(_) => {
                self.channel
                    .basic_nack(
                        delivery.delivery_tag,
                        BasicNackOptions {
                            requeue: false,
                            ..Default::default()
                        },
                    )
                    .await?;
                Ok(None)
            }
        }
    }

    pub async fn ack<T>(&self, delivery: &Delivery<T>) -> Result<(), BrokerError> {
        self.channel
            .basic_ack(delivery.raw.delivery_tag, BasicAckOptions::default())
            .await?;
        Ok(())
    }

    /// Transient failure: republish with an incremented retry counter while it is still below
    /// `maxRetryCount`, otherwise dead-letter it (§4.F).
    pub async fn retry_or_dead_letter<T>(&self, delivery: &Delivery<T>) -> Result<(), BrokerError> {
        if delivery.retry_count + 1 < self.max_retry_count {
            let mut headers = FieldTable::default();
            headers.insert(
                RETRY_COUNT_HEADER.into(),
                AMQPValue::LongUInt(delivery.retry_count + 1),
            );
            let properties = BasicProperties::default()
                .with_delivery_mode(2)
                .with_headers(headers);

            self.channel
                .basic_publish(
                    EXCHANGE,
                    self.queue.routing_key(),
                    BasicPublishOptions::default(),
                    &delivery.raw.data,
                    properties,
                )
                .await?
                .await?;

            self.channel
                .basic_ack(delivery.raw.delivery_tag, BasicAckOptions::default())
                .await?;
        } else {
            self.channel
                .basic_nack(
                    delivery.raw.delivery_tag,
                    BasicNackOptions {
                        requeue: false,
                        ..Default::default()
                    },
                )
                .await?;
        }
        Ok(())
    }

    /// Render-deterministic failure: not retryable, but not the queue's fault either — ack it
    /// so it never redelivers (§4.G point 4's "ack; do not redeliver render-deterministic errors").
    pub async fn ack_non_retryable_failure<T>(&self, delivery: &Delivery<T>) -> Result<(), BrokerError> {
        self.ack(delivery).await
    }

    /// Unconditional dead-letter, no retry. Used for handler-deadline timeouts (§5), since a
    /// handler that hung once will just hang again on redelivery.
    pub async fn dead_letter<T>(&self, delivery: &Delivery<T>) -> Result<(), BrokerError> {
        self.channel
            .basic_nack(
                delivery.raw.delivery_tag,
                BasicNackOptions {
                    requeue: false,
                    ..Default::default()
                },
            )
            .await?;
        Ok(())
    }
}

fn read_retry_count(delivery: &LapinDelivery) -> u32 {
    delivery
        .properties
        .headers()
        .as_ref()
        .and_then(|headers| headers.inner().get(RETRY_COUNT_HEADER))
        .and_then(|value| match value {
            AMQPValue::LongUInt(n) => Some(*n),
            AMQPValue::LongInt(n) => Some(*n as u32),
            _ => None,
        })
        .unwrap_or(0)
}
