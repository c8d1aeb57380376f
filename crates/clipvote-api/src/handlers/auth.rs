//! Authentication handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};

use crate::auth::AuthUser;
use crate::dto::{LoginRequest, LoginResponse, MessageResponse, SignupRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// How long a logged-out token stays on the denylist. Matches the token
/// lifetime so entries expire together with the tokens they block.
const REVOCATION_TTL_HOURS: i64 = 24;

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.services.users.signup(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state.services.users.login(req).await?;
    Ok(Json(response))
}

/// POST /api/auth/logout
///
/// Revokes the presented token. The denylist entry outlives any legitimate
/// use of the token and is lazily evicted afterwards.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let expiry = Utc::now() + Duration::hours(REVOCATION_TTL_HOURS);
    state.sessions.revoke(user.token, expiry);

    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let profile = state.services.users.profile(user.user_id).await?;
    Ok(Json(profile.into()))
}
