//! Repository for the `videos` table.

use clipvote_models::{Video, VideoStatus};
use sqlx::PgPool;

/// Column list for video queries.
const VIDEO_COLUMNS: &str =
    "id, title, status, is_public, uploaded_at, processed_at, deleted_at, user_id";

/// Persistence and status transitions for video records.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video record with status `uploaded`.
    pub async fn create(
        pool: &PgPool,
        title: &str,
        is_public: bool,
        user_id: i64,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (title, status, is_public, user_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(title)
            .bind(VideoStatus::Uploaded)
            .bind(is_public)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Fetch a live video by id, regardless of owner (worker path).
    pub async fn find_by_id(pool: &PgPool, video_id: i64) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {VIDEO_COLUMNS} FROM videos
             WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(video_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a live video by id, enforcing ownership.
    pub async fn find_owned(
        pool: &PgPool,
        video_id: i64,
        user_id: i64,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {VIDEO_COLUMNS} FROM videos
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(video_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's live videos, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: i64) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {VIDEO_COLUMNS} FROM videos
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY uploaded_at DESC"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List live public videos, newest first.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<Video>, sqlx::Error> {
        let query = format!(
            "SELECT {VIDEO_COLUMNS} FROM videos
             WHERE is_public = true AND deleted_at IS NULL
             ORDER BY uploaded_at DESC"
        );
        sqlx::query_as::<_, Video>(&query).fetch_all(pool).await
    }

    /// Mark a video processed. `processed_at` is stamped in the same
    /// statement so the status/timestamp invariant cannot be split.
    ///
    /// Returns the number of rows updated (0 when the row is gone).
    pub async fn mark_processed(pool: &PgPool, video_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE videos
             SET status = $1, processed_at = NOW()
             WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(VideoStatus::Processed)
        .bind(video_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Outcome of a soft-delete attempt.
    pub async fn soft_delete(
        pool: &PgPool,
        video_id: i64,
        user_id: i64,
    ) -> Result<SoftDeleteOutcome, sqlx::Error> {
        // Look before deleting so a public video can be refused explicitly.
        let is_public: Option<bool> = sqlx::query_scalar(
            "SELECT is_public FROM videos
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(video_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        match is_public {
            None => return Ok(SoftDeleteOutcome::NotFound),
            Some(true) => return Ok(SoftDeleteOutcome::PublicForbidden),
            Some(false) => {}
        }

        let result = sqlx::query(
            "UPDATE videos
             SET deleted_at = NOW()
             WHERE id = $1 AND user_id = $2 AND is_public = false AND deleted_at IS NULL",
        )
        .bind(video_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            // Lost a race with another delete or a visibility flip.
            return Ok(SoftDeleteOutcome::NotFound);
        }

        Ok(SoftDeleteOutcome::Deleted)
    }
}

/// Result of a soft-delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDeleteOutcome {
    Deleted,
    NotFound,
    PublicForbidden,
}
