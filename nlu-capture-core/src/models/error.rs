use thiserror::Error;

/// Errors that can occur during audio capture.
///
/// Three kinds with distinct propagation rules:
/// - `Initialization` — the hardware failed to come up; fatal, no retry.
/// - `InvalidState` — start while recording or stop while idle; a usage
///   error, surfaced synchronously.
/// - `Io` — file create/write/seek failure; fatal to the current session
///   and triggers forced teardown of the hardware source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture initialization failed: {0}")]
    Initialization(String),

    #[error("invalid recording state: {0}")]
    InvalidState(&'static str),

    #[error("i/o error: {0}")]
    Io(String),
}
