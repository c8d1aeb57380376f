//! Redis-streams message queue.
//!
//! Jobs are entries on a stream consumed through a consumer group, which
//! gives at-least-once delivery: a received entry stays pending until it is
//! acknowledged, and entries pending longer than the visibility window are
//! reclaimed and handed to the next `receive` call.

use std::time::Duration;

use redis::streams::{StreamAutoClaimReply, StreamId, StreamReadReply};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{QueueError, QueueResult};
use crate::message::{ProcessVideoMessage, ReceivedMessage};
use crate::MessageQueue;

/// Hard cap on messages per receive call.
const MAX_MESSAGES_PER_RECEIVE: u32 = 10;
/// Hard cap on long-poll wait.
const MAX_WAIT_SECONDS: u32 = 20;

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Stream name for jobs
    pub stream_name: String,
    /// Consumer group name
    pub consumer_group: String,
    /// How long a received message stays invisible before redelivery
    pub visibility_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            stream_name: "clipvote:jobs".to_string(),
            consumer_group: "clipvote:workers".to_string(),
            visibility_timeout: Duration::from_secs(600),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            stream_name: std::env::var("QUEUE_STREAM")
                .unwrap_or_else(|_| "clipvote:jobs".to_string()),
            consumer_group: std::env::var("QUEUE_CONSUMER_GROUP")
                .unwrap_or_else(|_| "clipvote:workers".to_string()),
            visibility_timeout: Duration::from_secs(
                std::env::var("QUEUE_VISIBILITY_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
        }
    }
}

/// Message queue backed by a Redis stream.
pub struct RedisQueue {
    client: redis::Client,
    config: QueueConfig,
    consumer_name: String,
}

impl RedisQueue {
    /// Create a new queue client.
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let consumer_name = format!("consumer-{}", Uuid::new_v4());
        Ok(Self {
            client,
            config,
            consumer_name,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    /// Create the consumer group if it does not exist yet.
    pub async fn init(&self) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: Result<(), redis::RedisError> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg("$")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(_) => info!("Created consumer group: {}", self.config.consumer_group),
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!("Consumer group already exists: {}", self.config.consumer_group);
            }
            Err(e) => return Err(QueueError::Redis(e)),
        }

        Ok(())
    }

    /// Number of entries currently on the stream.
    pub async fn len(&self) -> QueueResult<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let len: u64 = redis::cmd("XLEN")
            .arg(&self.config.stream_name)
            .query_async(&mut conn)
            .await?;
        Ok(len)
    }

    fn to_received(entry: &StreamId) -> Option<ReceivedMessage> {
        let body = match entry.map.get("body") {
            Some(redis::Value::BulkString(payload)) => {
                String::from_utf8_lossy(payload).into_owned()
            }
            _ => return None,
        };
        Some(ReceivedMessage {
            message_id: entry.id.clone(),
            receipt_handle: entry.id.clone(),
            body,
        })
    }

    /// Reclaim entries another (or a crashed) consumer left pending past the
    /// visibility window.
    async fn claim_stale(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        count: u32,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        let reply: StreamAutoClaimReply = redis::cmd("XAUTOCLAIM")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(&self.consumer_name)
            .arg(self.config.visibility_timeout.as_millis() as u64)
            .arg("0-0")
            .arg("COUNT")
            .arg(count)
            .query_async(conn)
            .await?;

        let mut messages = Vec::new();
        for entry in &reply.claimed {
            match Self::to_received(entry) {
                Some(msg) => {
                    info!("Reclaimed pending message {}", msg.message_id);
                    messages.push(msg);
                }
                None => {
                    // Malformed entry: ack it so it cannot wedge the group.
                    warn!("Dropping malformed stream entry {}", entry.id);
                    self.ack(conn, &entry.id).await.ok();
                }
            }
        }
        Ok(messages)
    }

    async fn ack(
        &self,
        conn: &mut redis::aio::MultiplexedConnection,
        id: &str,
    ) -> QueueResult<()> {
        redis::cmd("XACK")
            .arg(&self.config.stream_name)
            .arg(&self.config.consumer_group)
            .arg(id)
            .query_async::<()>(conn)
            .await?;

        redis::cmd("XDEL")
            .arg(&self.config.stream_name)
            .arg(id)
            .query_async::<()>(conn)
            .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl MessageQueue for RedisQueue {
    async fn send(&self, message: &ProcessVideoMessage) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(message)?;

        let message_id: String = redis::cmd("XADD")
            .arg(&self.config.stream_name)
            .arg("*")
            .arg("body")
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        info!(s3_key = %message.s3_key, message_id = %message_id, "Enqueued processing job");
        Ok(())
    }

    async fn receive(
        &self,
        max_messages: u32,
        wait_seconds: u32,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        let max_messages = max_messages.min(MAX_MESSAGES_PER_RECEIVE).max(1);
        let wait_seconds = wait_seconds.min(MAX_WAIT_SECONDS);

        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Redelivery path first: stale pending entries count against the batch.
        let mut messages = self.claim_stale(&mut conn, max_messages).await?;
        if messages.len() >= max_messages as usize {
            return Ok(messages);
        }
        let remaining = max_messages as usize - messages.len();

        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.config.consumer_group)
            .arg(&self.consumer_name)
            .arg("COUNT")
            .arg(remaining);
        // Don't hold reclaimed messages hostage to the long poll; only an
        // empty batch waits for new entries. BLOCK 0 would wait forever.
        if messages.is_empty() && wait_seconds > 0 {
            cmd.arg("BLOCK").arg(wait_seconds as u64 * 1000);
        }
        cmd.arg("STREAMS").arg(&self.config.stream_name).arg(">");

        let reply: StreamReadReply = cmd.query_async(&mut conn).await?;

        for stream_key in reply.keys {
            for entry in stream_key.ids {
                match Self::to_received(&entry) {
                    Some(msg) => messages.push(msg),
                    None => {
                        warn!("Dropping malformed stream entry {}", entry.id);
                        self.ack(&mut conn, &entry.id).await.ok();
                    }
                }
            }
        }

        Ok(messages)
    }

    async fn delete(&self, receipt_handle: &str) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        self.ack(&mut conn, receipt_handle).await?;
        debug!("Acknowledged message {}", receipt_handle);
        Ok(())
    }

    async fn close(&self) -> QueueResult<()> {
        // Connections are multiplexed and dropped with the client.
        Ok(())
    }
}
