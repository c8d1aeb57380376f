//! Broadcast normalization pipeline.
//!
//! Output contract, in order: trim to 30 s, scale-then-pad into 1280x720
//! without cropping, strip audio, overlay the contest watermark top-right
//! (when the asset is present), encode H.264 CRF 23, then concatenate
//! branded intro/outro bumpers with stream copy (when both assets are
//! present). Reprocessing the same storage key overwrites in place, so the
//! whole pipeline is idempotent per key.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Configuration for the transform pipeline.
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Output duration cap in seconds
    pub max_duration: u32,
    /// Target frame width
    pub target_width: u32,
    /// Target frame height
    pub target_height: u32,
    /// Watermark image (optional asset)
    pub watermark_path: PathBuf,
    /// Intro bumper (optional asset)
    pub intro_path: PathBuf,
    /// Outro bumper (optional asset)
    pub outro_path: PathBuf,
    /// Directory for temporary files
    pub temp_dir: PathBuf,
    /// Video codec
    pub video_codec: String,
    /// CRF quality value
    pub crf: u8,
    /// Encoder preset
    pub preset: String,
    /// Wall-clock timeout for the main transform pass
    pub transform_timeout_secs: u64,
    /// Wall-clock timeout for the bumper concat pass
    pub concat_timeout_secs: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_duration: 30,
            target_width: 1280,
            target_height: 720,
            watermark_path: "/app/assets/watermark.png".into(),
            intro_path: "/app/assets/intro.mp4".into(),
            outro_path: "/app/assets/outro.mp4".into(),
            temp_dir: "/tmp".into(),
            video_codec: "libx264".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            transform_timeout_secs: 5 * 60,
            concat_timeout_secs: 2 * 60,
        }
    }
}

impl TransformConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let asset_dir: PathBuf = std::env::var("ASSET_DIR")
            .unwrap_or_else(|_| "/app/assets".to_string())
            .into();
        Self {
            watermark_path: asset_dir.join("watermark.png"),
            intro_path: asset_dir.join("intro.mp4"),
            outro_path: asset_dir.join("outro.mp4"),
            temp_dir: std::env::var("TEMP_DIR")
                .unwrap_or_else(|_| "/tmp".to_string())
                .into(),
            ..Default::default()
        }
    }
}

/// Removes its files when dropped, covering every exit path.
struct TempFiles(Vec<PathBuf>);

impl TempFiles {
    fn track(&mut self, path: PathBuf) -> PathBuf {
        self.0.push(path.clone());
        path
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        for path in &self.0 {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to clean up temp file {}: {}", path.display(), e);
                }
            }
        }
    }
}

/// Deterministic video transformer driving an external FFmpeg.
#[derive(Debug, Clone)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(TransformConfig::from_env())
    }

    /// Transform raw upload bytes into the normalized broadcast artifact.
    ///
    /// Temp file names derive from the storage key so that concurrent jobs
    /// for different keys never collide, while re-deliveries of the same key
    /// overwrite their own leftovers.
    pub async fn process(&self, data: &[u8], s3_key: &str) -> MediaResult<Vec<u8>> {
        let safe = safe_stem(s3_key);
        let mut temps = TempFiles(Vec::new());

        let input =
            temps.track(self.config.temp_dir.join(format!("input_{}.mp4", safe)));
        let transformed =
            temps.track(self.config.temp_dir.join(format!("processed_{}.mp4", safe)));

        fs::write(&input, data).await?;

        self.run_transform(&input, &transformed).await?;

        let mut final_output = transformed.clone();
        if self.bumpers_exist() {
            info!("Bumpers found, concatenating intro and outro");
            let with_bumpers =
                temps.track(self.config.temp_dir.join(format!("final_{}.mp4", safe)));
            let concat_list =
                temps.track(self.config.temp_dir.join(format!("concat_{}.txt", safe)));

            match self
                .run_concat(&transformed, &with_bumpers, &concat_list)
                .await
            {
                Ok(()) => final_output = with_bumpers,
                // A hung concat means the box is in trouble; fail the
                // invocation so it retries elsewhere.
                Err(e @ MediaError::Timeout(_)) => return Err(e),
                Err(e) => {
                    warn!("Failed to add bumpers: {} - using video without bumpers", e);
                }
            }
        }

        let processed = fs::read(&final_output).await?;
        info!(
            s3_key = %s3_key,
            input_bytes = data.len(),
            output_bytes = processed.len(),
            "Transform complete"
        );
        Ok(processed)
    }

    /// Trim, scale+pad, strip audio, watermark, encode.
    async fn run_transform(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let has_watermark = self.config.watermark_path.exists();
        if !has_watermark {
            warn!(
                "Watermark not found at {} - continuing without overlay",
                self.config.watermark_path.display()
            );
        }

        let mut cmd = FfmpegCommand::new(input, output);
        if has_watermark {
            cmd = cmd
                .input(&self.config.watermark_path)
                .filter_complex(self.filter_with_watermark());
        } else {
            cmd = cmd.video_filter(self.filter_without_watermark());
        }
        let cmd = cmd
            .duration(self.config.max_duration)
            .no_audio()
            .video_codec(&self.config.video_codec)
            .crf(self.config.crf)
            .preset(&self.config.preset)
            .pixel_format("yuv420p")
            .faststart();

        FfmpegRunner::new()
            .with_timeout(self.config.transform_timeout_secs)
            .run(&cmd)
            .await
    }

    /// Concatenate intro + transformed + outro with stream copy.
    async fn run_concat(
        &self,
        transformed: &Path,
        output: &Path,
        concat_list: &Path,
    ) -> MediaResult<()> {
        let listing = format!(
            "file '{}'\nfile '{}'\nfile '{}'\n",
            self.config.intro_path.display(),
            transformed.display(),
            self.config.outro_path.display(),
        );
        fs::write(concat_list, listing).await?;

        let cmd = FfmpegCommand::to_output(output)
            .input_with_args(["-f", "concat", "-safe", "0"], concat_list)
            .stream_copy();

        FfmpegRunner::new()
            .with_timeout(self.config.concat_timeout_secs)
            .run(&cmd)
            .await
    }

    /// Scale into the target box, pad with centered black bars, then overlay
    /// the watermark (scaled into 150x60) at the top-right with a 10px inset.
    fn filter_with_watermark(&self) -> String {
        format!(
            "[0:v]scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black[scaled];[1:v]scale=150:60:force_original_aspect_ratio=decrease[watermark];[scaled][watermark]overlay=main_w-overlay_w-10:10",
            w = self.config.target_width,
            h = self.config.target_height,
        )
    }

    /// Same geometry without the overlay.
    fn filter_without_watermark(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black",
            w = self.config.target_width,
            h = self.config.target_height,
        )
    }

    fn bumpers_exist(&self) -> bool {
        self.config.intro_path.exists() && self.config.outro_path.exists()
    }
}

/// Make a storage key safe for use in a filename: `/` and `.` become `_`.
fn safe_stem(s3_key: &str) -> String {
    s3_key.replace(['/', '.'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_stem() {
        assert_eq!(safe_stem("original/123.mp4"), "original_123_mp4");
        assert_eq!(safe_stem("plain"), "plain");
    }

    #[test]
    fn test_filter_geometry_never_crops() {
        let transformer = Transformer::new(TransformConfig::default());

        let filter = transformer.filter_without_watermark();
        assert_eq!(
            filter,
            "scale=1280:720:force_original_aspect_ratio=decrease,pad=1280:720:(ow-iw)/2:(oh-ih)/2:black"
        );
        assert!(!filter.contains("crop"));
    }

    #[test]
    fn test_watermark_filter_placement() {
        let transformer = Transformer::new(TransformConfig::default());

        let filter = transformer.filter_with_watermark();
        assert!(filter.contains("scale=150:60:force_original_aspect_ratio=decrease"));
        assert!(filter.contains("overlay=main_w-overlay_w-10:10"));
        assert!(filter.starts_with("[0:v]scale=1280:720"));
    }

    #[tokio::test]
    async fn test_temp_files_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leftover.mp4");
        tokio::fs::write(&path, b"x").await.unwrap();

        {
            let mut temps = TempFiles(Vec::new());
            temps.track(path.clone());
        }

        assert!(!path.exists());
    }
}
