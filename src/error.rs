// src/error.rs
//
// Error types shared across the analysis engine and the job orchestrator.

use thiserror::Error;

/// Failures raised while probing or analyzing a media source
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The container or stream could not be probed; fatal for a job
    #[error("failed to extract metadata: {0}")]
    Decode(String),

    /// A single frame could not be retrieved or converted
    #[error("frame at {timestamp:.3}s unavailable: {message}")]
    Frame { timestamp: f64, message: String },

    /// Audio samples could not be materialized
    #[error("audio decoding failed: {0}")]
    AudioDecode(String),

    /// A single audio check could not run on the given signal
    #[error("{check} check failed: {message}")]
    AudioCheck { check: &'static str, message: String },

    /// The video pipeline cannot run at all
    #[error("video analysis failed: {0}")]
    Video(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Symphonia(#[from] symphonia::core::errors::Error),
}

/// Failures of the key-value job store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Failures surfaced by the job orchestrator
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed job record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("job {0} has already been executed")]
    AlreadyExecuted(String),

    #[error("job {job_id}: invalid transition from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("analysis task aborted: {0}")]
    TaskAborted(String),

    #[error("analysis exceeded time limit of {0}s")]
    TimeLimit(u64),
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
