//! Repository for the `votes` table.

use sqlx::PgPool;

/// Vote persistence. Uniqueness of `(user_id, video_id)` is enforced by the
/// table's primary key; callers translate the 23505 violation.
pub struct VoteRepo;

impl VoteRepo {
    /// Insert a vote. Fails with a unique violation when the pair exists.
    pub async fn insert(pool: &PgPool, user_id: i64, video_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO votes (user_id, video_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(video_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete a vote. Returns the number of rows removed (0 = no such vote).
    pub async fn remove(pool: &PgPool, user_id: i64, video_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM votes WHERE user_id = $1 AND video_id = $2")
            .bind(user_id)
            .bind(video_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Total votes on a video.
    pub async fn count(pool: &PgPool, video_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(pool)
            .await
    }

    /// Whether the user has already voted on the video.
    pub async fn has_voted(
        pool: &PgPool,
        user_id: i64,
        video_id: i64,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM votes WHERE user_id = $1 AND video_id = $2)",
        )
        .bind(user_id)
        .bind(video_id)
        .fetch_one(pool)
        .await
    }

    /// Whether the video exists and has not been soft-deleted.
    pub async fn video_exists_live(pool: &PgPool, video_id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(video_id)
        .fetch_one(pool)
        .await
    }
}
