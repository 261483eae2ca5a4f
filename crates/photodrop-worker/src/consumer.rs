//! SQS consumer: long-polls the trigger queue and dispatches each message.
//!
//! A message is deleted once every object it names was ingested or failed for good, or
//! when it carries nothing to ingest. When any object fails with a recoverable error the
//! message is left alone and the queue redelivers it after its visibility timeout.
//!
//! Shutdown: signal the receiver passed to [`QueueConsumer::run`]. A receive in
//! progress is abandoned; messages already received are processed before the loop
//! exits.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use aws_sdk_sqs::types::Message;
use aws_sdk_sqs::Client;
use photodrop_core::Config;
use tokio::sync::mpsc;

use crate::context::IngestHandler;
use crate::event::{parse_notification, Notification};

/// Delay before polling again after a failed receive.
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ConsumerConfig {
    pub queue_url: String,
    pub wait_time_seconds: i32,
    pub max_messages: i32,
    pub error_backoff: Duration,
}

impl ConsumerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            queue_url: config.sqs_queue_url.clone(),
            wait_time_seconds: config.sqs_wait_time_seconds,
            max_messages: config.sqs_max_messages,
            error_backoff: RECEIVE_ERROR_BACKOFF,
        }
    }
}

/// What to do with a message after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Delete the message from the queue.
    Acknowledge,
    /// Leave the message for redelivery.
    Retry,
}

pub struct QueueConsumer {
    client: Client,
    config: ConsumerConfig,
    handler: Arc<dyn IngestHandler>,
}

impl QueueConsumer {
    pub fn new(client: Client, config: ConsumerConfig, handler: Arc<dyn IngestHandler>) -> Self {
        Self {
            client,
            config,
            handler,
        }
    }

    /// Poll until `shutdown_rx` fires or its sender is dropped.
    pub async fn run(&self, mut shutdown_rx: mpsc::Receiver<()>) {
        tracing::info!(
            queue_url = %self.config.queue_url,
            wait_time_seconds = self.config.wait_time_seconds,
            max_messages = self.config.max_messages,
            source_bucket = %self.handler.source_bucket(),
            "Queue consumer started"
        );

        loop {
            let received = tokio::select! {
                _ = shutdown_rx.recv() => break,
                received = self.receive() => received,
            };

            match received {
                Ok(messages) => {
                    for message in messages {
                        self.process(message).await;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to receive messages");
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        _ = tokio::time::sleep(self.config.error_backoff) => {}
                    }
                }
            }
        }

        tracing::info!("Queue consumer stopped");
    }

    async fn receive(&self) -> Result<Vec<Message>> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.config.queue_url)
            .max_number_of_messages(self.config.max_messages)
            .wait_time_seconds(self.config.wait_time_seconds)
            .send()
            .await
            .context("ReceiveMessage failed")?;

        let messages = output.messages.unwrap_or_default();
        if !messages.is_empty() {
            tracing::debug!(count = messages.len(), "Received messages");
        }
        Ok(messages)
    }

    #[tracing::instrument(skip(self, message), fields(message_id = message.message_id().unwrap_or("-")))]
    async fn process(&self, message: Message) {
        let disposition = match message.body() {
            Some(body) => dispatch_message(self.handler.as_ref(), body).await,
            None => {
                tracing::warn!("Discarding message without a body");
                Disposition::Acknowledge
            }
        };

        match disposition {
            Disposition::Acknowledge => {
                if let Some(receipt_handle) = message.receipt_handle() {
                    if let Err(e) = self.delete(receipt_handle).await {
                        tracing::error!(error = %e, "Failed to delete message");
                    }
                }
            }
            Disposition::Retry => {
                tracing::info!("Message left on queue for redelivery");
            }
        }
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        self.client
            .delete_message()
            .queue_url(&self.config.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .context("DeleteMessage failed")?;
        Ok(())
    }
}

/// Ingest every object a message body names and decide the message's fate.
///
/// Records that are not object creations, that come from a bucket other than the
/// handler's source bucket, or whose key cannot be decoded are skipped. Bodies that
/// are not notifications at all are acknowledged. A failed object keeps the message on
/// the queue only when [`IngestError::is_recoverable`] holds.
///
/// [`IngestError::is_recoverable`]: photodrop_core::IngestError::is_recoverable
pub async fn dispatch_message(handler: &dyn IngestHandler, body: &str) -> Disposition {
    let records = match parse_notification(body) {
        Ok(Notification::Records(records)) => records,
        Ok(Notification::Test { bucket }) => {
            tracing::info!(bucket = ?bucket, "Acknowledging S3 test event");
            return Disposition::Acknowledge;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Discarding unrecognized message");
            return Disposition::Acknowledge;
        }
    };

    let mut disposition = Disposition::Acknowledge;
    for record in &records {
        if !record.is_object_created() {
            tracing::debug!(event_name = %record.event_name, "Skipping non-create event");
            continue;
        }
        if record.bucket() != handler.source_bucket() {
            tracing::warn!(
                bucket = %record.bucket(),
                expected = %handler.source_bucket(),
                key = %record.s3.object.key,
                "Skipping record from unexpected bucket"
            );
            continue;
        }

        let object = match record.source_object() {
            Ok(object) => object,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping record with undecodable key");
                continue;
            }
        };

        tracing::debug!(
            key = %object.name,
            size_bytes = ?record.s3.object.size,
            "Dispatching object"
        );

        match handler.handle_object(&object).await {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                tracing::warn!(
                    key = %object.name,
                    error_code = e.error_code(),
                    "Object not ingested, will retry"
                );
                disposition = Disposition::Retry;
            }
            Err(e) => {
                tracing::error!(
                    key = %object.name,
                    error_code = e.error_code(),
                    "Object cannot be ingested, dropping"
                );
            }
        }
    }

    disposition
}
