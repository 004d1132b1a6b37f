use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::application::SinglePromptUseCase;
use crate::domain::LogEntry;

use super::markdown;
use super::session_store::SessionStore;

/// Header carrying the browser's chat session id in both directions.
pub const SESSION_HEADER: &str = "x-session-id";

pub struct WebState {
    use_case: SinglePromptUseCase,
    sessions: SessionStore,
}

impl WebState {
    pub fn new(use_case: SinglePromptUseCase) -> Self {
        Self {
            use_case,
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub ok: bool,
    pub reply: String,
    pub html: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatFailure {
    pub ok: bool,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<LogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuitResponse {
    pub quit: bool,
    pub history: Vec<LogEntry>,
}

/// Existing session id from the request, or a freshly minted one.
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// `POST /api/chat` with `{"message": "..."}`.
///
/// Each request runs on a fresh model session; the exchange is recorded in
/// this server's per-session log only when the model answered.
pub async fn chat_api(
    State(state): State<Arc<WebState>>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let session_id = session_id(&headers);

    let Ok(Json(request)) = payload else {
        return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
    };

    let message = request.message.trim();
    if message.is_empty() {
        return (StatusCode::BAD_REQUEST, "No message provided").into_response();
    }

    match state.use_case.execute(message).await {
        Ok(reply) => {
            let html = markdown::to_html(&reply);
            state
                .sessions
                .record_exchange(&session_id, message, &reply)
                .await;
            let body = ChatReply {
                ok: true,
                reply,
                html,
                session_id: session_id.clone(),
            };
            ([(SESSION_HEADER, session_id)], Json(body)).into_response()
        }
        Err(error) => {
            let reason = error.reason();
            warn!(%error, "chat request failed");
            let body = ChatFailure {
                ok: false,
                error: reason,
            };
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(SESSION_HEADER, session_id)],
                Json(body),
            )
                .into_response()
        }
    }
}

/// `GET /api/history`
pub async fn history_api(State(state): State<Arc<WebState>>, headers: HeaderMap) -> Response {
    let session_id = session_id(&headers);
    let history = state.sessions.entries(&session_id).await;
    ([(SESSION_HEADER, session_id)], Json(HistoryResponse { history })).into_response()
}

/// `POST /api/quit`: clears the session log and hands back what it held.
pub async fn quit_api(State(state): State<Arc<WebState>>, headers: HeaderMap) -> Response {
    let session_id = session_id(&headers);
    let history = state.sessions.clear(&session_id).await;
    (
        [(SESSION_HEADER, session_id)],
        Json(QuitResponse {
            quit: true,
            history,
        }),
    )
        .into_response()
}
