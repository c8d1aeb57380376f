//! Ranking handlers.

use axum::extract::{Query, State};
use axum::Json;

use crate::dto::{RankingsQuery, RankingsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/public/rankings
///
/// Query parameters: `page`, `page_size`, `country`, `city`, `min_votes`,
/// `max_votes`. Out-of-range pagination values are coerced, not rejected.
pub async fn get_rankings(
    State(state): State<AppState>,
    Query(query): Query<RankingsQuery>,
) -> ApiResult<Json<RankingsResponse>> {
    let response = state.services.rankings.get_rankings(query).await?;
    Ok(Json(response))
}
