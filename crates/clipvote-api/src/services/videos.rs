//! Video ingest and read-side orchestration.

use std::sync::Arc;
use std::time::Duration;

use clipvote_db::{DbPool, SoftDeleteOutcome, VideoRepo};
use clipvote_media::Validator;
use clipvote_models::Video;
use clipvote_queue::{MessageQueue, ProcessVideoMessage};
use clipvote_storage::StorageManager;
use tracing::warn;

use crate::dto::{VideoResponse, VideoUploadResponse};
use crate::error::{ApiError, ApiResult};

/// Deadline for publishing the processing job.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Upload workflow and video reads.
#[derive(Clone)]
pub struct VideoService {
    pool: DbPool,
    storage: StorageManager,
    queue: Arc<dyn MessageQueue>,
    validator: Arc<Validator>,
}

impl VideoService {
    pub fn new(
        pool: DbPool,
        storage: StorageManager,
        queue: Arc<dyn MessageQueue>,
        validator: Arc<Validator>,
    ) -> Self {
        Self {
            pool,
            storage,
            queue,
            validator,
        }
    }

    /// Validate, persist, upload and enqueue a new video.
    ///
    /// The job publish runs under a 30 s deadline and its failure is logged
    /// rather than propagated: the artifact already exists, so failing the
    /// request would falsely report a successful upload as broken. A
    /// backfill can re-enqueue from the stored object.
    pub async fn upload(
        &self,
        file_name: &str,
        data: &[u8],
        title: &str,
        is_public: bool,
        user_id: i64,
    ) -> ApiResult<VideoUploadResponse> {
        self.validator
            .validate_upload(file_name, data)
            .await
            .map_err(|e| ApiError::bad_request(format!("video validation failed: {}", e)))?;

        let video = VideoRepo::create(&self.pool, title, is_public, user_id).await?;
        let s3_key = video.original_key();

        self.storage.put(&s3_key, data.to_vec()).await?;

        let message = ProcessVideoMessage::new(&s3_key);
        match tokio::time::timeout(SEND_TIMEOUT, self.queue.send(&message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(
                    "Failed to enqueue processing job for video {} ({}): {}",
                    video.id, s3_key, e
                );
            }
            Err(_) => {
                warn!(
                    "Timed out enqueueing processing job for video {} ({})",
                    video.id, s3_key
                );
            }
        }

        Ok(VideoUploadResponse {
            id: video.id,
            title: video.title,
            status: video.status,
            is_public: video.is_public,
            uploaded_at: video.uploaded_at,
            user_id: video.user_id,
            s3_key,
        })
    }

    /// Fetch an owned video together with presigned playback URLs.
    pub async fn get_video(&self, video_id: i64, user_id: i64) -> ApiResult<VideoResponse> {
        let video = VideoRepo::find_owned(&self.pool, video_id, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))?;

        let original_url = self.storage.presign_get(&video.original_key()).await?;
        let processed_url = self.storage.presign_get(&video.processed_key()).await?;

        Ok(VideoResponse::from_video(video, original_url, processed_url))
    }

    /// List the caller's videos. Presign failures degrade to empty URLs so
    /// one bad object cannot hide the whole library.
    pub async fn list_user_videos(&self, user_id: i64) -> ApiResult<Vec<VideoResponse>> {
        let videos = VideoRepo::list_by_user(&self.pool, user_id).await?;
        Ok(self.with_urls(videos).await)
    }

    /// List live public videos.
    pub async fn list_public_videos(&self) -> ApiResult<Vec<VideoResponse>> {
        let videos = VideoRepo::list_public(&self.pool).await?;
        Ok(self.with_urls(videos).await)
    }

    async fn with_urls(&self, videos: Vec<Video>) -> Vec<VideoResponse> {
        let mut responses = Vec::with_capacity(videos.len());
        for video in videos {
            let original_url = match self.storage.presign_get(&video.original_key()).await {
                Ok(url) => url,
                Err(e) => {
                    warn!("Failed to presign original URL for video {}: {}", video.id, e);
                    String::new()
                }
            };
            let processed_url = match self.storage.presign_get(&video.processed_key()).await {
                Ok(url) => url,
                Err(e) => {
                    warn!("Failed to presign processed URL for video {}: {}", video.id, e);
                    String::new()
                }
            };
            responses.push(VideoResponse::from_video(video, original_url, processed_url));
        }
        responses
    }

    /// Soft-delete a private video. Public videos are refused; storage
    /// objects are intentionally left in place.
    pub async fn delete_video(&self, video_id: i64, user_id: i64) -> ApiResult<()> {
        match VideoRepo::soft_delete(&self.pool, video_id, user_id).await? {
            SoftDeleteOutcome::Deleted => Ok(()),
            SoftDeleteOutcome::NotFound => {
                Err(ApiError::not_found("video not found or not owned by user"))
            }
            SoftDeleteOutcome::PublicForbidden => {
                Err(ApiError::forbidden("public videos cannot be deleted"))
            }
        }
    }

    /// Health probe for the validation tooling.
    pub async fn check_probe_tool(&self) -> bool {
        self.validator.check_installation().await.is_ok()
    }
}
