//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::auth::{login, logout, profile, signup};
use crate::handlers::health::health;
use crate::handlers::rankings::get_rankings;
use crate::handlers::videos::{
    delete_video, get_video, list_public_videos, list_user_videos, upload_video,
};
use crate::handlers::votes::{unvote_for_video, vote_for_video};
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/profile", get(profile));

    let video_routes = Router::new()
        .route("/upload", post(upload_video))
        .route("/", get(list_user_videos))
        .route("/:video_id", get(get_video))
        .route("/:video_id", delete(delete_video));

    let public_routes = Router::new()
        .route("/videos", get(list_public_videos))
        .route("/videos/:video_id/vote", post(vote_for_video))
        .route("/videos/:video_id/vote", delete(unvote_for_video))
        .route("/rankings", get(get_rankings));

    let api_routes = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes)
        .nest("/videos", video_routes)
        .nest("/public", public_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
