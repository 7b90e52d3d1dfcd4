use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::CaptureState;

/// Event delegate for capture session notifications.
///
/// Methods are called from whichever thread drove the transition — the drain
/// thread for asynchronous failures, the caller's thread for start/stop.
/// Implementations should marshal to their own context if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: CaptureState);

    /// Called when a drain-cycle error terminates the session. Errors here
    /// cannot propagate to a caller synchronously; this is the reporting
    /// channel (alongside the log).
    fn on_error(&self, error: &CaptureError);

    /// Called when the recording file has been finalized.
    fn on_capture_finished(&self, result: &RecordingResult);
}
