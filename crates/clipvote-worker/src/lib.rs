//! Video processing worker: consumes upload jobs from the queue, runs the
//! transform pipeline and stores the processed artifact.

pub mod config;
pub mod error;
pub mod processor;
pub mod retry;
pub mod service;

pub use config::RetryPolicy;
pub use error::{WorkerError, WorkerResult};
pub use processor::{extract_video_id, processed_key, Processor};
pub use retry::retry_with_backoff;
pub use service::Worker;
