//! Message queue contract and the Redis-streams implementation.
//!
//! Delivery is at-least-once: consumers MUST be idempotent on the message's
//! `s3_key`. A message that is received but never deleted becomes visible
//! again after the backend's visibility window.

pub mod error;
pub mod message;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use message::{ProcessVideoMessage, ReceivedMessage};
pub use queue::{QueueConfig, RedisQueue};

use async_trait::async_trait;

/// Capability set of a job queue backend.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Publish a processing job.
    async fn send(&self, message: &ProcessVideoMessage) -> QueueResult<()>;

    /// Long-poll for up to `max_messages` (capped at 10), waiting at most
    /// `wait_seconds` (capped at 20) for the first one.
    async fn receive(
        &self,
        max_messages: u32,
        wait_seconds: u32,
    ) -> QueueResult<Vec<ReceivedMessage>>;

    /// Acknowledge a message so it is never redelivered.
    async fn delete(&self, receipt_handle: &str) -> QueueResult<()>;

    /// Release backend resources.
    async fn close(&self) -> QueueResult<()>;
}
