use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;

/// Location of the sidecar describing a recording: same stem as the WAV,
/// with a `.metadata.json` extension.
pub fn sidecar_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

impl RecordingMetadata {
    /// Persist this metadata as a JSON sidecar next to the recording.
    ///
    /// Written once, after the WAV file has been finalized, so the sidecar
    /// only ever describes a complete recording.
    pub fn write_sidecar(&self, recording_path: &Path) -> Result<(), CaptureError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CaptureError::Io(format!("could not encode metadata: {}", e)))?;
        fs::write(sidecar_path(recording_path), json)
            .map_err(|e| CaptureError::Io(format!("could not write sidecar: {}", e)))
    }

    /// Load the sidecar previously written for `recording_path`.
    pub fn load_sidecar(recording_path: &Path) -> Result<Self, CaptureError> {
        let json = fs::read_to_string(sidecar_path(recording_path))
            .map_err(|e| CaptureError::Io(format!("could not read sidecar: {}", e)))?;
        serde_json::from_str(&json)
            .map_err(|e| CaptureError::Io(format!("could not decode metadata: {}", e)))
    }
}
