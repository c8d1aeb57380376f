//! Vote casting and removal.

use clipvote_db::{is_unique_violation, DbPool, VoteRepo};

use crate::error::{ApiError, ApiResult};

/// Vote operations over live videos.
#[derive(Clone)]
pub struct VoteService {
    pool: DbPool,
}

impl VoteService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Cast a vote. The unique index backstops the `has_voted` pre-check,
    /// so two concurrent votes cannot both land.
    pub async fn vote(&self, user_id: i64, video_id: i64) -> ApiResult<()> {
        if !VoteRepo::video_exists_live(&self.pool, video_id).await? {
            return Err(ApiError::not_found("Video not found or has been deleted"));
        }

        if VoteRepo::has_voted(&self.pool, user_id, video_id).await? {
            return Err(ApiError::conflict("You have already voted for this video"));
        }

        match VoteRepo::insert(&self.pool, user_id, video_id).await {
            Ok(()) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(ApiError::conflict("You have already voted for this video"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a vote. Removal is idempotent per row: zero rows affected
    /// means there was no vote to remove.
    pub async fn unvote(&self, user_id: i64, video_id: i64) -> ApiResult<()> {
        if !VoteRepo::video_exists_live(&self.pool, video_id).await? {
            return Err(ApiError::not_found("Video not found or has been deleted"));
        }

        let removed = VoteRepo::remove(&self.pool, user_id, video_id).await?;
        if removed == 0 {
            return Err(ApiError::not_found("You have not voted for this video"));
        }

        Ok(())
    }

    /// Current vote count for a video.
    pub async fn count(&self, video_id: i64) -> ApiResult<i64> {
        Ok(VoteRepo::count(&self.pool, video_id).await?)
    }
}
