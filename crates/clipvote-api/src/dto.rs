//! Request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clipvote_models::{PlayerRanking, User, Video, VideoStatus};

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub country: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            city: user.city,
            country: user.country,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ── Videos ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VideoUploadResponse {
    pub id: i64,
    pub title: String,
    pub status: VideoStatus,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
    pub user_id: i64,
    pub s3_key: String,
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub video_id: i64,
    pub title: String,
    pub status: VideoStatus,
    pub is_public: bool,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    pub original_url: String,
    pub processed_url: String,
    pub user_id: i64,
}

impl VideoResponse {
    pub fn from_video(video: Video, original_url: String, processed_url: String) -> Self {
        Self {
            video_id: video.id,
            title: video.title,
            status: video.status,
            is_public: video.is_public,
            uploaded_at: video.uploaded_at,
            processed_at: video.processed_at,
            original_url,
            processed_url,
            user_id: video.user_id,
        }
    }
}

// ── Votes ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
    pub video_id: i64,
    pub user_id: i64,
    pub voted_at: DateTime<Utc>,
    pub vote_count: i64,
}

#[derive(Debug, Serialize)]
pub struct UnvoteResponse {
    pub success: bool,
    pub message: String,
    pub video_id: i64,
    pub user_id: i64,
    pub vote_count: i64,
}

// ── Rankings ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct RankingsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub min_votes: Option<i64>,
    pub max_votes: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RankingEntry {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub total_votes: i64,
    pub ranking: i64,
    pub last_updated: DateTime<Utc>,
}

impl From<PlayerRanking> for RankingEntry {
    fn from(row: PlayerRanking) -> Self {
        Self {
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            city: row.city,
            country: row.country,
            total_votes: row.total_votes,
            ranking: row.ranking,
            last_updated: row.last_updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    pub rankings: Vec<RankingEntry>,
    pub pagination: PaginationMeta,
}
