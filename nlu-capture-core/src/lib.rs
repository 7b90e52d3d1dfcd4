//! # nlu-capture-core
//!
//! Microphone capture and WAV-container encoding core.
//!
//! Records raw PCM from a hardware audio source into a valid, correctly-sized
//! WAV file suitable for upload to a natural-language-understanding service.
//! Platform backends implement the `AudioSource` trait and plug into the
//! generic `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! nlu-capture-core (this crate)
//! ├── traits/       ← AudioSource, CaptureDelegate
//! ├── models/       ← CaptureError, CaptureState, CaptureConfig, RecordingResult
//! ├── processing/   ← WAV header generation and patching
//! ├── session/      ← CaptureSession (drain loop, teardown)
//! └── storage/      ← WavFileWriter, metadata sidecar
//! ```
//!
//! Data flows one direction: `AudioSource` → `CaptureSession` →
//! `WavFileWriter` → finished file.

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::CaptureConfig;
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::CaptureState;
pub use session::capture::CaptureSession;
pub use storage::wav_writer::WavFileWriter;
pub use traits::audio_source::AudioSource;
pub use traits::capture_delegate::CaptureDelegate;
