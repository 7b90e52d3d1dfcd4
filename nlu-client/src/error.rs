use std::path::PathBuf;

use thiserror::Error;

use nlu_capture_core::CaptureError;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("invalid recording state: {0}")]
    InvalidState(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("service returned status {0}")]
    Api(u16),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
