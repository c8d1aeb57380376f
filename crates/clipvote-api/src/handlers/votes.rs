//! Vote handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::warn;

use crate::auth::AuthUser;
use crate::dto::{UnvoteResponse, VoteResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/public/videos/{video_id}/vote
pub async fn vote_for_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<VoteResponse>)> {
    state.services.votes.vote(user.user_id, video_id).await?;

    // The vote landed; count and ranking refresh failures only degrade the
    // response, they never roll the vote back.
    let vote_count = state
        .services
        .votes
        .count(video_id)
        .await
        .unwrap_or_default();

    if let Err(e) = state.services.rankings.refresh().await {
        warn!("Failed to refresh rankings after vote: {}", e);
    }

    let response = VoteResponse {
        success: true,
        message: "Your vote has been counted! Thanks for supporting great content and shaping the rankings.".to_string(),
        video_id,
        user_id: user.user_id,
        voted_at: Utc::now(),
        vote_count,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// DELETE /api/public/videos/{video_id}/vote
pub async fn unvote_for_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<i64>,
) -> ApiResult<Json<UnvoteResponse>> {
    state.services.votes.unvote(user.user_id, video_id).await?;

    let vote_count = state
        .services
        .votes
        .count(video_id)
        .await
        .unwrap_or_default();

    if let Err(e) = state.services.rankings.refresh().await {
        warn!("Failed to refresh rankings after unvote: {}", e);
    }

    let response = UnvoteResponse {
        success: true,
        message: "Your vote has been removed and the rankings have been updated.".to_string(),
        video_id,
        user_id: user.user_id,
        vote_count,
    };

    Ok(Json(response))
}
