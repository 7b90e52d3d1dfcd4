//! # nlu-client
//!
//! Client for a natural-language-understanding service. Sends text or short
//! voice recordings and decodes the structured annotations that come back:
//! intents, entities, sentiment, dialogue acts, and conversation state.
//!
//! Voice recording is delegated to [`nlu_capture_core`]: the client owns at
//! most one active `CaptureSession` and uploads the finished WAV file as a
//! multipart request.
//!
//! ```text
//! nlu-client (this crate)
//! ├── client   ← Client facade: recording lifecycle + request entry points
//! ├── request  ← HTTP plumbing: form-encoded text, multipart WAV upload
//! ├── models/  ← Response, Intent, Entity, Conversation, Memory
//! └── error    ← ClientError
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod request;

pub use client::{Client, RequestOptions};
pub use error::ClientError;
pub use models::conversation::{Action, Conversation, Memory, MemoryEntity};
pub use models::response::{DialogueAct, Entity, Intent, Response, Sentiment};
