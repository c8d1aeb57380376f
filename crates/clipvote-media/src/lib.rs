//! Media tooling: ffprobe-backed upload validation and the deterministic
//! FFmpeg transform pipeline.

pub mod command;
pub mod error;
pub mod probe;
pub mod transform;
pub mod validate;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_file, ProbeOutput};
pub use transform::{TransformConfig, Transformer};
pub use validate::{UploadMetadata, ValidationRules, Validator, MAX_UPLOAD_BYTES};
