use std::path::{Path, PathBuf};

use nlu_capture_core::{AudioSource, CaptureConfig, CaptureSession, RecordingResult};

use crate::error::ClientError;
use crate::models::conversation::Conversation;
use crate::models::response::Response;
use crate::request::{Api, DEFAULT_BASE_URL};

/// Per-request overrides. Anything left as `None` falls back to the
/// client's own token and language.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub token: Option<String>,
    pub language: Option<String>,
}

/// Entry point of the SDK.
///
/// Holds the authentication token, an optional processing language, and at
/// most one active voice recording. Request methods and `stop_recording`
/// perform blocking file, device, and network i/o — do not call them on a
/// latency-sensitive or UI-facing thread.
pub struct Client {
    token: String,
    language: Option<String>,
    output_directory: PathBuf,
    api: Api,
    recorder: Option<CaptureSession>,
}

impl Client {
    /// Create a client authenticating with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default service URL (e.g. a staging
    /// deployment).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            language: None,
            output_directory: std::env::temp_dir().join("nlu-voice"),
            api: Api::new(base_url),
            recorder: None,
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Language for processing, e.g. `"en"`. When unset, the service falls
    /// back to the bot's default language.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = Some(language.into());
    }

    /// Directory recordings are written to.
    pub fn set_output_directory(&mut self, directory: impl Into<PathBuf>) {
        self.output_directory = directory.into();
    }

    /// Whether a recording is currently in progress.
    pub fn is_recording(&self) -> bool {
        self.recorder.as_ref().is_some_and(CaptureSession::is_recording)
    }

    /// Start recording from `source` into a fresh WAV file.
    ///
    /// If a recording is already active it is stopped best-effort (its
    /// result discarded) and the call still fails with `InvalidState` —
    /// cleanup first, then fail loud. Note the service only accepts audio
    /// shorter than about 10 seconds; no cutoff is enforced here.
    pub fn start_recording(&mut self, source: Box<dyn AudioSource>) -> Result<(), ClientError> {
        if let Some(mut session) = self.recorder.take() {
            if let Err(e) = session.stop() {
                log::warn!("discarding stale recording session: {}", e);
            }
            return Err(ClientError::InvalidState("recording already in progress"));
        }

        let file_path = self
            .output_directory
            .join(format!("voice_{}.wav", uuid::Uuid::new_v4()));
        let mut session = CaptureSession::new(source, CaptureConfig::default(), file_path)?;
        session.start()?;
        self.recorder = Some(session);
        Ok(())
    }

    /// Stop the active recording and return the finalized file.
    ///
    /// The result carries the completed file path and payload byte length —
    /// everything the upload boundary needs. The session is discarded
    /// whether or not the stop succeeds.
    pub fn finish_recording(&mut self) -> Result<RecordingResult, ClientError> {
        let mut session = self
            .recorder
            .take()
            .ok_or(ClientError::InvalidState("no recording in progress"))?;
        Ok(session.stop()?)
    }

    /// Stop the active recording and submit it for analysis.
    pub fn stop_recording(&mut self) -> Result<Response, ClientError> {
        let result = self.finish_recording()?;
        self.file_request(&result.file_path)
    }

    /// Analyze a piece of text with the client's token and language.
    pub fn text_request(&self, text: &str) -> Result<Response, ClientError> {
        self.text_request_with(text, &RequestOptions::default())
    }

    /// Analyze a piece of text with per-request overrides.
    pub fn text_request_with(&self, text: &str, options: &RequestOptions) -> Result<Response, ClientError> {
        let (token, language) = self.resolve(options);
        self.api.text_request(text, token, language)
    }

    /// Send a dialogue turn to the converse endpoint.
    pub fn text_converse(&self, text: &str) -> Result<Conversation, ClientError> {
        self.text_converse_with(text, &RequestOptions::default())
    }

    pub fn text_converse_with(&self, text: &str, options: &RequestOptions) -> Result<Conversation, ClientError> {
        let (token, language) = self.resolve(options);
        self.api.text_converse(text, token, language)
    }

    /// Upload a WAV file for analysis. The audio must be 44100 Hz mono
    /// 16-bit PCM and shorter than about 10 seconds.
    pub fn file_request(&self, path: &Path) -> Result<Response, ClientError> {
        self.file_request_with(path, &RequestOptions::default())
    }

    pub fn file_request_with(&self, path: &Path, options: &RequestOptions) -> Result<Response, ClientError> {
        let (token, language) = self.resolve(options);
        self.api.file_request(path, token, language)
    }

    fn resolve<'a>(&'a self, options: &'a RequestOptions) -> (&'a str, Option<&'a str>) {
        let token = options.token.as_deref().unwrap_or(&self.token);
        let language = options.language.as_deref().or(self.language.as_deref());
        (token, language)
    }
}
