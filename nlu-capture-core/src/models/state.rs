/// Capture session state machine.
///
/// ```text
/// idle → (start) → recording → (stop | i/o failure) → stopped
/// ```
///
/// There is no transition back to `Idle`; construct a new session for each
/// recording. `Stopped` (hardware released) is terminal for the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    Stopped,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}
