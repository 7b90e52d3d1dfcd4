use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::CaptureConfig;

/// Result returned when a capture session stops successfully.
///
/// The file path plus its payload byte length is everything the upload
/// boundary needs to wrap the recording in a multipart request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    /// PCM payload bytes, excluding the 44-byte header.
    pub data_bytes: u64,
    pub duration_secs: f64,
    pub checksum: String,
    pub metadata: RecordingMetadata,
}

/// Metadata stored alongside a recording.
///
/// Serializable for the JSON sidecar and for export to a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub data_bytes: u64,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn new(config: &CaptureConfig, file_path: &str, data_bytes: u64, checksum: &str) -> Self {
        let duration_secs = data_bytes as f64 / config.byte_rate() as f64;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            data_bytes,
            duration_secs,
            sample_rate: config.sample_rate,
            channels: config.channels,
            bits_per_sample: config.bits_per_sample,
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
