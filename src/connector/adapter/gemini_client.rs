use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::ChatClient;
use crate::domain::{DomainError, HistoryEntry, SessionHandle};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_VERSION_PATH: &str = "/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: &'a [Content],
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// HTTP client for the Gemini `generateContent` endpoint.
///
/// The endpoint is stateless, so each session keeps its own transcript here
/// and replays it on every request. A user/model pair joins the transcript
/// only after the model has answered, which keeps failed turns out of the
/// history.
///
/// Configured from the environment by [`crate::connector::api::ContainerConfig`]:
///
/// | Variable          | Default                                      |
/// |-------------------|----------------------------------------------|
/// | `GENAI_API_KEY`   | required                                     |
/// | `GENAI_MODEL`     | `gemini-2.5-flash`                           |
/// | `GENAI_BASE_URL`  | `https://generativelanguage.googleapis.com`  |
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    /// Base URL without trailing slash.
    base_url: String,
    sessions: Arc<Mutex<HashMap<String, Vec<Content>>>>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, DomainError> {
        let api_key: String = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DomainError::configuration(
                "API key is required. Set the GENAI_API_KEY environment variable.",
            ));
        }

        let base: String = base_url.into();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::internal(format!("GeminiClient: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base.trim_end_matches('/').to_string(),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}{API_VERSION_PATH}/{model}:generateContent", self.base_url)
    }

    fn extract_reply(response: GenerateResponse) -> Result<String, DomainError> {
        response
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .map(|content| content.joined_text())
            .ok_or_else(|| DomainError::dispatch("response contained no candidates"))
    }

    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => format!("API returned {status}: {}", envelope.error.message),
            Err(_) => format!("API returned {status}"),
        }
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn create_session(&self, model: &str) -> Result<SessionHandle, DomainError> {
        let session = SessionHandle::new(model);
        self.sessions
            .lock()
            .await
            .insert(session.id().to_string(), Vec::new());
        debug!("Created Gemini session {} for {}", session.id(), model);
        Ok(session)
    }

    async fn send(&self, session: &SessionHandle, text: &str) -> Result<String, DomainError> {
        let mut contents = self
            .sessions
            .lock()
            .await
            .get(session.id())
            .cloned()
            .ok_or_else(|| DomainError::session_not_found(session.id()))?;
        let user_content = Content::text("user", text);
        contents.push(user_content.clone());

        let response = self
            .client
            .post(self.endpoint(session.model()))
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: &contents,
            })
            .send()
            .await
            .map_err(|e| DomainError::dispatch(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("GeminiClient: API returned {status}: {body}");
            return Err(DomainError::dispatch(Self::error_message(status, &body)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DomainError::dispatch(format!("failed to parse response: {e}")))?;
        let reply = Self::extract_reply(parsed)?;

        if let Some(history) = self.sessions.lock().await.get_mut(session.id()) {
            history.push(user_content);
            history.push(Content::text("model", &reply));
        }

        Ok(reply)
    }

    async fn get_history(&self, session: &SessionHandle) -> Result<Vec<HistoryEntry>, DomainError> {
        let sessions = self.sessions.lock().await;
        let contents = sessions
            .get(session.id())
            .ok_or_else(|| DomainError::history(format!("unknown session {}", session.id())))?;

        Ok(contents
            .iter()
            .map(|c| HistoryEntry::new(c.role.clone(), c.joined_text()))
            .collect())
    }

    async fn close_session(&self, session: &SessionHandle) {
        if self.sessions.lock().await.remove(session.id()).is_some() {
            debug!("Closed Gemini session {}", session.id());
        }
    }
}
