//! Video handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AuthUser;
use crate::dto::{VideoResponse, VideoUploadResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /api/videos/upload
///
/// Multipart fields: `video_file` (the file), `title` (required),
/// `is_public` (required).
pub async fn upload_video(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<VideoUploadResponse>)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut title: Option<String> = None;
    let mut is_public: Option<bool> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video_file" => {
                let file_name = field.file_name().unwrap_or("upload.mp4").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                file = Some((file_name, data.to_vec()));
            }
            "title" => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?,
                );
            }
            "is_public" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.to_string()))?;
                is_public = Some(parse_is_public(&raw).ok_or_else(|| {
                    ApiError::bad_request(format!("invalid is_public value: {}", raw))
                })?);
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| ApiError::bad_request("video_file is required"))?;
    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("title is required"))?;
    let is_public = is_public.ok_or_else(|| ApiError::bad_request("is_public is required"))?;

    let response = state
        .services
        .videos
        .upload(&file_name, &data, title.trim(), is_public, user.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/videos/
pub async fn list_user_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<VideoResponse>>> {
    let videos = state.services.videos.list_user_videos(user.user_id).await?;
    Ok(Json(videos))
}

/// GET /api/videos/{video_id}
pub async fn get_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<i64>,
) -> ApiResult<Json<VideoResponse>> {
    let video = state
        .services
        .videos
        .get_video(video_id, user.user_id)
        .await?;
    Ok(Json(video))
}

/// DELETE /api/videos/{video_id}
pub async fn delete_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(video_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .services
        .videos
        .delete_video(video_id, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/public/videos
pub async fn list_public_videos(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VideoResponse>>> {
    let videos = state.services.videos.list_public_videos().await?;
    Ok(Json(videos))
}

/// Parse the multipart `is_public` flag: `true/false`, `1/0`, `t/f`,
/// case-insensitive. Anything else is rejected.
fn parse_is_public(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "t" => Some(true),
        "false" | "0" | "f" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_public_truthy() {
        for raw in ["true", "TRUE", "True", "1", "t", "T"] {
            assert_eq!(parse_is_public(raw), Some(true), "input: {}", raw);
        }
    }

    #[test]
    fn test_parse_is_public_falsy() {
        for raw in ["false", "FALSE", "False", "0", "f", "F"] {
            assert_eq!(parse_is_public(raw), Some(false), "input: {}", raw);
        }
    }

    #[test]
    fn test_parse_is_public_rejects_garbage() {
        for raw in ["", "yes", "no", "2", "tru", "public"] {
            assert_eq!(parse_is_public(raw), None, "input: {}", raw);
        }
    }
}
