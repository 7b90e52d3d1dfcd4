use std::fs;
use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::AUTHORIZATION;

use crate::error::ClientError;
use crate::models::conversation::Conversation;
use crate::models::response::Response;

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.cai.tool.sap/v2";

/// One-shot analysis endpoint (text or voice file → annotations).
const REQUEST_ENDPOINT: &str = "request";

/// Dialogue endpoint (text → replies + conversation state).
const CONVERSE_ENDPOINT: &str = "converse";

/// HTTP plumbing for the NLU service.
///
/// Text goes out form-encoded; voice recordings go out as a multipart
/// request with the WAV file under the `voice` part. Authentication is a
/// `Token` authorization header per request, so one `Api` can serve
/// multiple tokens.
///
/// All methods perform blocking network i/o.
pub struct Api {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl Api {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Analyze a piece of text.
    pub fn text_request(&self, text: &str, token: &str, language: Option<&str>) -> Result<Response, ClientError> {
        let body = self.post_text(REQUEST_ENDPOINT, text, token, language)?;
        Ok(Response::from_json(&body)?)
    }

    /// Send a text turn to the dialogue endpoint.
    pub fn text_converse(&self, text: &str, token: &str, language: Option<&str>) -> Result<Conversation, ClientError> {
        let body = self.post_text(CONVERSE_ENDPOINT, text, token, language)?;
        Ok(Conversation::from_json(&body)?)
    }

    /// Upload a finished WAV recording for analysis.
    ///
    /// The service expects the audio as 44100 Hz mono 16-bit WAV no longer
    /// than about 10 seconds; neither constraint is validated here.
    pub fn file_request(&self, path: &Path, token: &str, language: Option<&str>) -> Result<Response, ClientError> {
        if !path.exists() {
            return Err(ClientError::FileNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "voice.wav".into());

        let part = Part::bytes(bytes).file_name(file_name).mime_str("audio/wav")?;
        let mut form = Form::new().part("voice", part);
        if let Some(language) = language {
            form = form.text("language", language.to_string());
        }

        let response = self
            .http
            .post(self.url(REQUEST_ENDPOINT))
            .header(AUTHORIZATION, format!("Token {}", token))
            .multipart(form)
            .send()?;
        let body = Self::read_body(response)?;
        Ok(Response::from_json(&body)?)
    }

    fn post_text(&self, endpoint: &str, text: &str, token: &str, language: Option<&str>) -> Result<String, ClientError> {
        let mut params = vec![("text", text)];
        if let Some(language) = language {
            params.push(("language", language));
        }

        let response = self
            .http
            .post(self.url(endpoint))
            .header(AUTHORIZATION, format!("Token {}", token))
            .form(&params)
            .send()?;
        Self::read_body(response)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint)
    }

    fn read_body(response: reqwest::blocking::Response) -> Result<String, ClientError> {
        let status = response.status();
        if !status.is_success() {
            log::warn!("request to {} rejected with status {}", response.url(), status);
            return Err(ClientError::Api(status.as_u16()));
        }
        Ok(response.text()?)
    }
}
