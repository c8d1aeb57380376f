//! Single-message processing.
//!
//! All effects are a function of the message's `s3_key`: the processed key
//! is derived from it and `put` overwrites in place, so processing the same
//! message any number of times converges on the same final state.

use clipvote_db::{DbPool, VideoRepo};
use clipvote_media::Transformer;
use clipvote_models::VideoStatus;
use clipvote_queue::{ProcessVideoMessage, ReceivedMessage};
use clipvote_storage::StorageManager;
use tracing::{info, warn};

use crate::error::{WorkerError, WorkerResult};

/// Processes one queue message end to end.
pub struct Processor {
    pool: DbPool,
    storage: StorageManager,
    transformer: Transformer,
}

impl Processor {
    pub fn new(pool: DbPool, storage: StorageManager, transformer: Transformer) -> Self {
        Self {
            pool,
            storage,
            transformer,
        }
    }

    /// Download, transform, upload and mark the referenced video processed.
    ///
    /// Returns `Ok` both on completion and on the ack-and-skip outcomes
    /// (already processed). Permanent errors tell the caller to drop the
    /// message; transient errors tell it to retry.
    pub async fn process(&self, msg: &ReceivedMessage) -> WorkerResult<()> {
        let job: ProcessVideoMessage = serde_json::from_str(&msg.body)
            .map_err(|e| WorkerError::BadMessage(format!("failed to parse message body: {}", e)))?;

        let video_id = extract_video_id(&job.s3_key);
        if video_id <= 0 {
            return Err(WorkerError::BadMessage(format!(
                "could not extract video id from key: {}",
                job.s3_key
            )));
        }

        let video = VideoRepo::find_by_id(&self.pool, video_id)
            .await?
            .ok_or(WorkerError::NotFound(video_id))?;

        if video.status == VideoStatus::Processed {
            info!("Video {} is already processed, skipping", video_id);
            return Ok(());
        }
        if video.status != VideoStatus::Uploaded {
            return Err(WorkerError::WrongState {
                id: video_id,
                status: video.status,
            });
        }

        info!(video_id, s3_key = %job.s3_key, "Downloading video for processing");
        let data = self.storage.get(&job.s3_key).await?;

        let processed_key = processed_key(&job.s3_key);
        info!(
            "Processing video ({} bytes): {} -> {}",
            data.len(),
            job.s3_key,
            processed_key
        );

        let processed = self
            .transformer
            .process(&data, &job.s3_key)
            .await
            .map_err(WorkerError::from_media)?;

        self.storage.put(&processed_key, processed).await?;

        // The artifact is durable at this point; a status-update failure must
        // not fail the job. A redelivery reconciles either way.
        match VideoRepo::mark_processed(&self.pool, video_id).await {
            Ok(0) => warn!("Video {} disappeared before status update", video_id),
            Ok(_) => info!("Video {} marked processed", video_id),
            Err(e) => warn!("Failed to update status for video {}: {}", video_id, e),
        }

        Ok(())
    }
}

/// Derive the video id from a storage key: basename, strip the last
/// extension, parse as integer. Returns 0 when any step fails.
pub fn extract_video_id(s3_key: &str) -> i64 {
    let filename = match s3_key.rsplit_once('/') {
        Some((_, name)) => name,
        None => s3_key,
    };

    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Derive the processed artifact key: swap an `original/` prefix for
/// `processed/`, or prepend `processed/` when the prefix is absent.
pub fn processed_key(s3_key: &str) -> String {
    match s3_key.strip_prefix("original/") {
        Some(rest) => format!("processed/{}", rest),
        None => format!("processed/{}", s3_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(extract_video_id("original/123.mp4"), 123);
        assert_eq!(extract_video_id("123.mp4"), 123);
        assert_eq!(extract_video_id("nested/path/7.mp4"), 7);
    }

    #[test]
    fn test_extract_video_id_failures_return_zero() {
        assert_eq!(extract_video_id("original/abc.mp4"), 0);
        assert_eq!(extract_video_id("original/123"), 0);
        assert_eq!(extract_video_id(".mp4"), 0);
        assert_eq!(extract_video_id(""), 0);
        assert_eq!(extract_video_id("original/"), 0);
    }

    #[test]
    fn test_processed_key_swaps_prefix() {
        assert_eq!(processed_key("original/1.mp4"), "processed/1.mp4");
        assert_eq!(processed_key("original/99.mp4"), "processed/99.mp4");
    }

    #[test]
    fn test_processed_key_prepends_without_prefix() {
        assert_eq!(processed_key("1.mp4"), "processed/1.mp4");
        assert_eq!(processed_key("other/1.mp4"), "processed/other/1.mp4");
    }

    #[test]
    fn test_processed_key_is_deterministic_per_id() {
        let key = "original/42.mp4";
        assert_eq!(processed_key(key), processed_key(key));
        assert_eq!(processed_key(key), "processed/42.mp4");
    }
}
