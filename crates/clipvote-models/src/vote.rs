//! Vote model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single user's vote on a video. Unique per `(user_id, video_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vote {
    pub user_id: i64,
    pub video_id: i64,
    pub voted_at: DateTime<Utc>,
}
