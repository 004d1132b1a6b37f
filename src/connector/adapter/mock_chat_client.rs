use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ChatClient;
use crate::domain::{DomainError, HistoryEntry, SessionHandle};

#[derive(Debug, Clone)]
struct Scripted {
    result: Result<String, String>,
    delay: Option<Duration>,
}

/// Offline [`ChatClient`] that echoes prompts back, with optional scripted
/// replies, failures and latency. Used by `--mock` and by tests.
pub struct MockChatClient {
    scripted: HashMap<String, Scripted>,
    latency: Duration,
    sessions: Arc<Mutex<HashMap<String, Vec<HistoryEntry>>>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            scripted: HashMap::new(),
            latency: Duration::ZERO,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Delay applied to every unscripted reply.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_reply(mut self, prompt: &str, reply: &str) -> Self {
        self.scripted.insert(
            prompt.to_string(),
            Scripted {
                result: Ok(reply.to_string()),
                delay: None,
            },
        );
        self
    }

    pub fn with_reply_after(mut self, prompt: &str, reply: &str, delay: Duration) -> Self {
        self.scripted.insert(
            prompt.to_string(),
            Scripted {
                result: Ok(reply.to_string()),
                delay: Some(delay),
            },
        );
        self
    }

    pub fn with_failure(mut self, prompt: &str, reason: &str) -> Self {
        self.scripted.insert(
            prompt.to_string(),
            Scripted {
                result: Err(reason.to_string()),
                delay: None,
            },
        );
        self
    }

    fn echo(text: &str) -> String {
        format!("Echo: {text}")
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn create_session(&self, model: &str) -> Result<SessionHandle, DomainError> {
        let session = SessionHandle::new(model);
        self.sessions
            .lock()
            .await
            .insert(session.id().to_string(), Vec::new());
        debug!("Created mock session {}", session.id());
        Ok(session)
    }

    async fn send(&self, session: &SessionHandle, text: &str) -> Result<String, DomainError> {
        if !self.sessions.lock().await.contains_key(session.id()) {
            return Err(DomainError::session_not_found(session.id()));
        }

        let (result, delay) = match self.scripted.get(text) {
            Some(scripted) => (scripted.result.clone(), scripted.delay.unwrap_or(self.latency)),
            None => (Ok(Self::echo(text)), self.latency),
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let reply = result.map_err(DomainError::dispatch)?;

        let mut sessions = self.sessions.lock().await;
        if let Some(history) = sessions.get_mut(session.id()) {
            history.push(HistoryEntry::new("user", text));
            history.push(HistoryEntry::new("model", reply.clone()));
        }

        Ok(reply)
    }

    async fn get_history(&self, session: &SessionHandle) -> Result<Vec<HistoryEntry>, DomainError> {
        self.sessions
            .lock()
            .await
            .get(session.id())
            .cloned()
            .ok_or_else(|| DomainError::history(format!("unknown session {}", session.id())))
    }

    async fn close_session(&self, session: &SessionHandle) {
        if self.sessions.lock().await.remove(session.id()).is_some() {
            debug!("Closed mock session {}", session.id());
        }
    }
}
