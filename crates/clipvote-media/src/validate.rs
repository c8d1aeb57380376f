//! Pre-upload video validation.
//!
//! Validation runs in two phases: cheap checks against the declared
//! metadata, then an ffprobe pass against a saved temporary copy. Every
//! rejection names the rule that failed.

use std::path::PathBuf;

use crate::error::{MediaError, MediaResult};
use crate::probe::{self, ProbeOutput};

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Container tags ffprobe reports for MP4-family files.
const VALID_CONTAINERS: [&str; 3] = ["mov,mp4,m4a,3gp,3g2,mj2", "mp4", "mov"];

/// Accepted video codecs.
const VALID_CODECS: [&str; 6] = ["h264", "h265", "hevc", "avc1", "hvc1", "mp4v"];

/// Contest validation constraints.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub max_size_bytes: u64,
    pub min_duration: f64,
    pub max_duration: f64,
    pub min_width: u32,
    /// Height must be strictly greater than this.
    pub min_height_exclusive: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_size_bytes: MAX_UPLOAD_BYTES,
            min_duration: 20.0,
            max_duration: 60.0,
            min_width: 1920,
            min_height_exclusive: 1080,
        }
    }
}

/// Metadata extracted from an accepted upload.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub size: u64,
    pub format: String,
}

/// FFprobe-backed upload validator.
#[derive(Debug, Clone)]
pub struct Validator {
    temp_dir: PathBuf,
}

impl Validator {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }

    /// Validate an uploaded file with the default contest rules.
    pub async fn validate_upload(
        &self,
        file_name: &str,
        data: &[u8],
    ) -> MediaResult<UploadMetadata> {
        self.validate_with_rules(file_name, data, &ValidationRules::default())
            .await
    }

    /// Validate an uploaded file against explicit rules.
    pub async fn validate_with_rules(
        &self,
        file_name: &str,
        data: &[u8],
        rules: &ValidationRules,
    ) -> MediaResult<UploadMetadata> {
        quick_validation(file_name, data.len() as u64, rules)?;

        // The temp file is removed on drop, on every exit path.
        let temp = tempfile::Builder::new()
            .prefix("upload_")
            .suffix(".mp4")
            .tempfile_in(&self.temp_dir)?;
        tokio::fs::write(temp.path(), data).await?;

        let probe = probe::probe_file(temp.path()).await?;
        let metadata = extract_metadata(&probe, data.len() as u64)?;
        validate_metadata(&metadata, rules)?;

        Ok(metadata)
    }

    /// Verify the probe tool is available (health endpoint dependency).
    pub async fn check_installation(&self) -> MediaResult<()> {
        probe::check_ffprobe_installation().await
    }
}

/// Phase A: fast checks requiring no I/O.
fn quick_validation(file_name: &str, size: u64, rules: &ValidationRules) -> MediaResult<()> {
    if size > rules.max_size_bytes {
        return Err(MediaError::invalid_video(format!(
            "file too large: {} bytes (max: {} bytes / {:.1}MB)",
            size,
            rules.max_size_bytes,
            rules.max_size_bytes as f64 / (1024.0 * 1024.0)
        )));
    }

    if size == 0 {
        return Err(MediaError::invalid_video("file is empty"));
    }

    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    if ext != "mp4" {
        return Err(MediaError::invalid_video(format!(
            "invalid file extension: .{} (only .mp4 allowed)",
            ext
        )));
    }

    Ok(())
}

/// Phase B: pull the fields the rules need out of the probe result.
fn extract_metadata(probe: &ProbeOutput, size: u64) -> MediaResult<UploadMetadata> {
    if !is_valid_container(&probe.format.format_name) {
        return Err(MediaError::invalid_video(format!(
            "invalid container format: {} (expected MP4)",
            probe.format.format_name
        )));
    }

    let stream = probe
        .video_stream()
        .ok_or_else(|| MediaError::invalid_video("no video stream found in file"))?;

    let duration = probe
        .duration_seconds()
        .ok_or_else(|| MediaError::invalid_video("could not determine video duration"))?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    if width == 0 || height == 0 {
        return Err(MediaError::invalid_video(format!(
            "invalid video dimensions: {}x{}",
            width, height
        )));
    }

    let codec = stream.codec_name.clone().unwrap_or_default();
    if !is_valid_codec(&codec) {
        return Err(MediaError::UnsupportedFormat(format!(
            "unsupported video codec: {} (expected H.264, H.265)",
            codec
        )));
    }

    Ok(UploadMetadata {
        duration,
        width,
        height,
        size,
        format: "mp4".to_string(),
    })
}

/// Validate extracted metadata against the contest rules.
fn validate_metadata(metadata: &UploadMetadata, rules: &ValidationRules) -> MediaResult<()> {
    if metadata.duration < rules.min_duration || metadata.duration > rules.max_duration {
        return Err(MediaError::invalid_video(format!(
            "video duration {:.1} seconds is not in range {:.1}-{:.1} seconds",
            metadata.duration, rules.min_duration, rules.max_duration
        )));
    }

    if metadata.height <= rules.min_height_exclusive {
        return Err(MediaError::invalid_video(format!(
            "video resolution {}x{} is below minimum (must exceed 1080p)",
            metadata.width, metadata.height
        )));
    }

    if metadata.width < rules.min_width {
        return Err(MediaError::invalid_video(format!(
            "video width {}px is too low (minimum: {}px)",
            metadata.width, rules.min_width
        )));
    }

    Ok(())
}

fn is_valid_container(format_name: &str) -> bool {
    let lower = format_name.to_lowercase();
    lower.contains("mp4") || VALID_CONTAINERS.contains(&lower.as_str())
}

fn is_valid_codec(codec: &str) -> bool {
    VALID_CODECS.contains(&codec.to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(duration: f64, width: u32, height: u32) -> UploadMetadata {
        UploadMetadata {
            duration,
            width,
            height,
            size: 1024,
            format: "mp4".to_string(),
        }
    }

    #[test]
    fn test_size_boundary() {
        let rules = ValidationRules::default();
        assert!(quick_validation("demo.mp4", MAX_UPLOAD_BYTES, &rules).is_ok());
        assert!(quick_validation("demo.mp4", MAX_UPLOAD_BYTES + 1, &rules).is_err());
        assert!(quick_validation("demo.mp4", 0, &rules).is_err());
    }

    #[test]
    fn test_extension_check() {
        let rules = ValidationRules::default();
        assert!(quick_validation("demo.mp4", 1, &rules).is_ok());
        assert!(quick_validation("demo.MP4", 1, &rules).is_ok());
        assert!(quick_validation("demo.avi", 1, &rules).is_err());
        assert!(quick_validation("no-extension", 1, &rules).is_err());
    }

    #[test]
    fn test_duration_boundaries() {
        let rules = ValidationRules::default();
        assert!(validate_metadata(&metadata(20.0, 1920, 1200), &rules).is_ok());
        assert!(validate_metadata(&metadata(60.0, 1920, 1200), &rules).is_ok());
        assert!(validate_metadata(&metadata(19.999, 1920, 1200), &rules).is_err());
        assert!(validate_metadata(&metadata(60.001, 1920, 1200), &rules).is_err());
    }

    #[test]
    fn test_resolution_boundaries() {
        let rules = ValidationRules::default();
        assert!(validate_metadata(&metadata(30.0, 1920, 1081), &rules).is_ok());
        assert!(validate_metadata(&metadata(30.0, 1920, 1080), &rules).is_err());
        assert!(validate_metadata(&metadata(30.0, 1919, 1200), &rules).is_err());
    }

    #[test]
    fn test_container_matching() {
        assert!(is_valid_container("mov,mp4,m4a,3gp,3g2,mj2"));
        assert!(is_valid_container("mp4"));
        assert!(is_valid_container("MP4"));
        assert!(is_valid_container("mov"));
        assert!(!is_valid_container("matroska,webm"));
    }

    #[test]
    fn test_codec_matching() {
        for codec in ["h264", "h265", "hevc", "avc1", "hvc1", "mp4v", "H264"] {
            assert!(is_valid_codec(codec), "codec {} should be accepted", codec);
        }
        assert!(!is_valid_codec("vp9"));
        assert!(!is_valid_codec("av1"));
    }

    #[test]
    fn test_extract_rejects_missing_video_stream() {
        let probe: ProbeOutput = serde_json::from_str(
            r#"{"format": {"format_name": "mp4", "duration": "30"},
                "streams": [{"codec_type": "audio", "codec_name": "aac"}]}"#,
        )
        .unwrap();
        let err = extract_metadata(&probe, 100).unwrap_err();
        assert!(err.to_string().contains("no video stream"));
    }
}
