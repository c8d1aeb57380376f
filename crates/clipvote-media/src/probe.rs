//! FFprobe wrapper.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Parsed ffprobe output for a media file.
#[derive(Debug, Deserialize)]
pub struct ProbeOutput {
    pub format: ProbeFormat,
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
pub struct ProbeFormat {
    #[serde(default)]
    pub format_name: String,
    pub duration: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProbeStream {
    pub codec_type: String,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<String>,
}

impl ProbeOutput {
    /// First video stream, if any.
    pub fn video_stream(&self) -> Option<&ProbeStream> {
        self.streams.iter().find(|s| s.codec_type == "video")
    }

    /// Duration in seconds, preferring the video stream's own duration and
    /// falling back to the container duration.
    pub fn duration_seconds(&self) -> Option<f64> {
        let stream_duration = self
            .video_stream()
            .and_then(|s| s.duration.as_deref())
            .and_then(parse_duration);
        stream_duration.or_else(|| self.format.duration.as_deref().and_then(parse_duration))
    }
}

fn parse_duration(raw: &str) -> Option<f64> {
    if raw.is_empty() || raw == "N/A" {
        return None;
    }
    raw.parse().ok()
}

/// Probe a media file with ffprobe.
pub async fn probe_file(path: impl AsRef<Path>) -> MediaResult<ProbeOutput> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::InvalidVideo(
            "file is not a valid video or is corrupted".to_string(),
        ));
    }

    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Verify that ffprobe is installed and responds to `-version`.
pub async fn check_ffprobe_installation() -> MediaResult<()> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success()
        || !String::from_utf8_lossy(&output.stdout).contains("ffprobe")
    {
        return Err(MediaError::FfprobeFailed {
            message: "ffprobe did not return expected version info".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_output() -> ProbeOutput {
        serde_json::from_str(
            r#"{
                "format": {"format_name": "mov,mp4,m4a,3gp,3g2,mj2", "duration": "31.5", "size": "1024"},
                "streams": [
                    {"codec_type": "audio", "codec_name": "aac"},
                    {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1200, "duration": "30.0"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_video_stream_selection() {
        let probe = sample_output();
        let stream = probe.video_stream().unwrap();
        assert_eq!(stream.codec_name.as_deref(), Some("h264"));
        assert_eq!(stream.width, Some(1920));
    }

    #[test]
    fn test_stream_duration_preferred() {
        let probe = sample_output();
        assert_eq!(probe.duration_seconds(), Some(30.0));
    }

    #[test]
    fn test_container_duration_fallback() {
        let probe: ProbeOutput = serde_json::from_str(
            r#"{
                "format": {"format_name": "mp4", "duration": "25.0"},
                "streams": [{"codec_type": "video", "codec_name": "h264", "duration": "N/A"}]
            }"#,
        )
        .unwrap();
        assert_eq!(probe.duration_seconds(), Some(25.0));
    }

    #[test]
    fn test_no_duration_anywhere() {
        let probe: ProbeOutput = serde_json::from_str(
            r#"{
                "format": {"format_name": "mp4"},
                "streams": [{"codec_type": "video", "codec_name": "h264"}]
            }"#,
        )
        .unwrap();
        assert_eq!(probe.duration_seconds(), None);
    }
}
