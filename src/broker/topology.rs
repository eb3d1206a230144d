//! Declares the topic exchange, DLX, and the five queues (§4.F).

use super::error::BrokerError;
use super::messages::QueueName;
use crate::config::BrokerConfig;
use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, ExchangeKind};

pub const EXCHANGE: &str = "imageviewer.exchange";
pub const DLX_EXCHANGE: &str = "imageviewer.dlx";

/// Declares the exchange/DLX/queue topology, tolerating a pre-existing queue with different
/// arguments by logging and continuing rather than failing startup on `PreconditionFailed`.
pub async fn declare(channel: &Channel, config: &BrokerConfig) -> Result<(), BrokerError> {
    channel
        .exchange_declare(
            EXCHANGE,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    channel
        .exchange_declare(
            DLX_EXCHANGE,
            ExchangeKind::Topic,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    for queue in QueueName::all() {
        declare_one(channel, config, *queue).await?;
    }

    Ok(())
}

async fn declare_one(channel: &Channel, config: &BrokerConfig, queue: QueueName) -> Result<(), BrokerError> {
    let mut args = FieldTable::default();
    args.insert("x-dead-letter-exchange".into(), AMQPValue::LongString(DLX_EXCHANGE.into()));
    args.insert(
        "x-dead-letter-routing-key".into(),
        AMQPValue::LongString(queue.routing_key().into()),
    );
    args.insert(
        "x-max-length".into(),
        AMQPValue::LongLongInt(config.max_queue_length as i64),
    );
    args.insert(
        "x-message-ttl".into(),
        AMQPValue::LongLongInt((config.message_timeout_hours * 3_600_000) as i64),
    );

    let declared = channel
        .queue_declare(
            queue.as_str(),
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            args,
        )
        .await;

    match declared {
        Ok(_) => {}
        Err(err) if err.to_string().contains("PRECONDITION_FAILED") => {
            tracing::warn!(
                queue = queue.as_str(),
                "queue exists with different arguments, using existing declaration"
            );
            channel
                .queue_declare(
                    queue.as_str(),
                    QueueDeclareOptions {
                        durable: true,
                        passive: true,
                        ..Default::default()
                    },
                    FieldTable::default(),
                )
                .await?;
        }
        Err(other) => return Err(other.into()),
    }

    channel
        .queue_bind(
            queue.as_str(),
            EXCHANGE,
            queue.routing_key(),
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    channel
        .queue_bind(
            queue.as_str(),
            DLX_EXCHANGE,
            queue.routing_key(),
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await?;

    Ok(())
}
