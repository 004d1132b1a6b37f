use async_trait::async_trait;

use crate::domain::{DomainError, HistoryEntry, SessionHandle};

/// An interface to a hosted chat model that keeps multi-turn sessions.
///
/// Implementors encapsulate transport, authentication, and vendor-specific API
/// details. The relay and the presentation surfaces only ever see session
/// handles, reply text, and history entries.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Open a new chat session against `model`.
    async fn create_session(&self, model: &str) -> Result<SessionHandle, DomainError>;

    /// Send one user message within `session` and return the model's text reply.
    ///
    /// Failures are reported as [`DomainError::DispatchError`].
    async fn send(&self, session: &SessionHandle, text: &str) -> Result<String, DomainError>;

    /// The provider's own record of `session`, oldest first.
    ///
    /// Failures are reported as [`DomainError::HistoryRetrievalError`].
    async fn get_history(&self, session: &SessionHandle) -> Result<Vec<HistoryEntry>, DomainError>;

    /// Drop everything held for `session`. Closing an unknown or already
    /// closed session is a no-op.
    async fn close_session(&self, session: &SessionHandle);
}
