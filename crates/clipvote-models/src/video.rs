//! Video record and status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a video.
///
/// A video is created as `Uploaded` and transitions to `Processed` exactly
/// once, when the worker has stored the transformed artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "video_status", rename_all = "lowercase")]
pub enum VideoStatus {
    #[default]
    Uploaded,
    Processed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A contest video row.
///
/// `processed_at` is set iff `status` is `processed`; `deleted_at` marks a
/// soft delete and hides the row from every read path.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub status: VideoStatus,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub user_id: i64,
}

impl Video {
    /// Storage key of the raw upload.
    pub fn original_key(&self) -> String {
        format!("original/{}.mp4", self.id)
    }

    /// Storage key of the transformed artifact.
    pub fn processed_key(&self) -> String {
        format!("processed/{}.mp4", self.id)
    }

    /// A video is live while it has not been soft-deleted.
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(VideoStatus::Uploaded.as_str(), "uploaded");
        assert_eq!(VideoStatus::Processed.as_str(), "processed");
        assert_eq!(VideoStatus::Processed.to_string(), "processed");
    }

    #[test]
    fn test_storage_keys_derived_from_id() {
        let video = Video {
            id: 42,
            title: "Demo".to_string(),
            status: VideoStatus::Uploaded,
            is_public: true,
            uploaded_at: Utc::now(),
            processed_at: None,
            deleted_at: None,
            user_id: 7,
        };
        assert_eq!(video.original_key(), "original/42.mp4");
        assert_eq!(video.processed_key(), "processed/42.mp4");
        assert!(video.is_live());
    }
}
