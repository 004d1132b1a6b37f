use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Dispatch error: {0}")]
    DispatchError(String),

    #[error("History retrieval error: {0}")]
    HistoryRetrievalError(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::DispatchError(msg.into())
    }

    pub fn history(msg: impl Into<String>) -> Self {
        Self::HistoryRetrievalError(msg.into())
    }

    pub fn session_not_found(msg: impl Into<String>) -> Self {
        Self::SessionNotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The bare message without the variant prefix, as shown to users.
    pub fn reason(&self) -> String {
        match self {
            Self::ConfigurationError(msg)
            | Self::DispatchError(msg)
            | Self::HistoryRetrievalError(msg)
            | Self::SessionNotFound(msg)
            | Self::InvalidInput(msg)
            | Self::Internal(msg) => msg.clone(),
            Self::IoError(e) => e.to_string(),
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::ConfigurationError(_))
    }

    pub fn is_dispatch_error(&self) -> bool {
        matches!(self, Self::DispatchError(_))
    }

    pub fn is_history_error(&self) -> bool {
        matches!(self, Self::HistoryRetrievalError(_))
    }
}
