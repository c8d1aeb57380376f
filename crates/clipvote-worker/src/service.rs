//! The worker loop: poll, process with retry, acknowledge.
//!
//! Messages within a batch are handled sequentially so the external
//! transcoder budget stays predictable; scale-out happens by running more
//! worker processes against the same consumer group.

use std::sync::Arc;
use std::time::Duration;

use clipvote_queue::{MessageQueue, ReceivedMessage};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::RetryPolicy;
use crate::error::WorkerResult;
use crate::processor::Processor;
use crate::retry::retry_with_backoff;

/// Long-running queue consumer.
pub struct Worker {
    queue: Arc<dyn MessageQueue>,
    processor: Processor,
    retry: RetryPolicy,
    shutdown: watch::Sender<bool>,
}

impl Worker {
    pub fn new(queue: Arc<dyn MessageQueue>, processor: Processor, retry: RetryPolicy) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            queue,
            processor,
            retry,
            shutdown,
        }
    }

    /// Signal the loop (and any in-flight backoff sleep) to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Consume messages until shutdown. A batch-level failure never crashes
    /// the loop; it backs off for a second and polls again.
    pub async fn run(&self) -> WorkerResult<()> {
        info!("Worker started, listening for messages");

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Shutdown signal received, stopping worker");
                        break;
                    }
                }
                result = self.process_batch() => {
                    if let Err(e) = result {
                        error!("Error processing message batch: {}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        self.queue.close().await.ok();
        info!("Worker stopped");
        Ok(())
    }

    /// Long-poll one batch and handle each message to a terminal outcome.
    async fn process_batch(&self) -> WorkerResult<()> {
        let messages = self.queue.receive(10, 20).await?;
        if messages.is_empty() {
            return Ok(());
        }

        info!("Received {} messages for processing", messages.len());

        for msg in messages {
            match self.process_with_retry(&msg).await {
                Ok(()) => {
                    if let Err(e) = self.queue.delete(&msg.receipt_handle).await {
                        // Redelivery will hit the idempotent path and re-ack.
                        error!("Failed to delete message {}: {}", msg.message_id, e);
                    }
                }
                Err(e) if e.is_permanent() => {
                    warn!(
                        "Message {} failed permanently, dropping: {}",
                        msg.message_id, e
                    );
                    if let Err(del_err) = self.queue.delete(&msg.receipt_handle).await {
                        error!("Failed to drop message {}: {}", msg.message_id, del_err);
                    }
                }
                Err(e) => {
                    error!(
                        "Message {} failed after retries, leaving for redelivery: {}",
                        msg.message_id, e
                    );
                }
            }
        }

        Ok(())
    }

    /// Process a message under the exponential-backoff policy. Permanent
    /// errors short-circuit; transient errors retry up to `max_retries`.
    async fn process_with_retry(&self, msg: &ReceivedMessage) -> WorkerResult<()> {
        let result = retry_with_backoff(&self.retry, self.shutdown.subscribe(), || {
            self.processor.process(msg)
        })
        .await;

        if let Err(e) = &result {
            if !e.is_permanent() {
                warn!(
                    "Message {} failed after {} attempts, giving up: {}",
                    msg.message_id,
                    self.retry.max_retries + 1,
                    e
                );
            }
        }
        result
    }
}
