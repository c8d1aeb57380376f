//! Worker error types.
//!
//! Every error carries a permanence verdict: permanent errors cannot succeed
//! on retry without an external change to the data model, so the worker
//! acknowledges (drops) the triggering message instead of retrying it.
//! Errors coming out of the media layer are classified at construction by
//! mapping their descriptions onto the tagged kinds.

use clipvote_models::VideoStatus;
use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// Message body or key cannot be interpreted. Permanent.
    #[error("bad message: {0}")]
    BadMessage(String),

    /// The referenced row is gone. Permanent.
    #[error("video {0} not found in database")]
    NotFound(i64),

    /// The row exists but is not in a processable state. Permanent.
    #[error("video {id} has status '{status}', expected 'uploaded'")]
    WrongState { id: i64, status: VideoStatus },

    /// The stored bytes cannot be transcoded. Permanent.
    #[error("{0}")]
    BadFormat(String),

    /// Shutdown interrupted a retry sleep. Transient.
    #[error("worker shutting down")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(#[from] clipvote_storage::StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] clipvote_queue::QueueError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Media error: {0}")]
    Media(clipvote_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error descriptions that identify a permanently failing message.
const PERMANENT_MARKERS: [&str; 6] = [
    "not found in database",
    "already processed",
    "invalid video format",
    "unsupported format",
    "no such file",
    "file not found",
];

impl WorkerError {
    /// Wrap a media error, promoting permanently failing descriptions to the
    /// `BadFormat` kind so they short-circuit retry.
    pub fn from_media(err: clipvote_media::MediaError) -> Self {
        let description = err.to_string();
        if message_is_permanent(&description) {
            Self::BadFormat(description)
        } else {
            Self::Media(err)
        }
    }

    /// Whether retrying this error can ever succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            WorkerError::BadMessage(_)
                | WorkerError::NotFound(_)
                | WorkerError::WrongState { .. }
                | WorkerError::BadFormat(_)
        )
    }
}

/// Substring classification of error descriptions.
pub fn message_is_permanent(description: &str) -> bool {
    let lower = description.to_lowercase();
    PERMANENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipvote_media::MediaError;

    #[test]
    fn test_tagged_kinds_are_permanent() {
        assert!(WorkerError::BadMessage("garbage".into()).is_permanent());
        assert!(WorkerError::NotFound(7).is_permanent());
        assert!(WorkerError::WrongState {
            id: 7,
            status: VideoStatus::Processed
        }
        .is_permanent());
        assert!(WorkerError::BadFormat("unsupported format: av1".into()).is_permanent());
    }

    #[test]
    fn test_dependency_failures_are_transient() {
        let storage = WorkerError::Storage(clipvote_storage::StorageError::DownloadFailed(
            "connection reset".into(),
        ));
        assert!(!storage.is_permanent());
        assert!(!WorkerError::Cancelled.is_permanent());
    }

    #[test]
    fn test_media_classification_at_construction() {
        let invalid = WorkerError::from_media(MediaError::invalid_video("truncated moov atom"));
        assert!(invalid.is_permanent());

        let unsupported =
            WorkerError::from_media(MediaError::UnsupportedFormat("codec av1".into()));
        assert!(unsupported.is_permanent());

        let missing = WorkerError::from_media(MediaError::FileNotFound("/tmp/x.mp4".into()));
        assert!(missing.is_permanent());

        let timeout = WorkerError::from_media(MediaError::Timeout(300));
        assert!(!timeout.is_permanent());
    }

    #[test]
    fn test_marker_matching() {
        assert!(message_is_permanent("video 9 not found in database"));
        assert!(message_is_permanent("video is already processed"));
        assert!(message_is_permanent("Invalid video format: bad header"));
        assert!(!message_is_permanent("connection refused"));
        assert!(!message_is_permanent("timed out after 300 seconds"));
    }
}
