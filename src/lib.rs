pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    Applied, ChatClient, Conversation, DispatchMode, Notification, SinglePromptUseCase, TurnRelay,
    DEFAULT_POLL_INTERVAL,
};

pub use cli::Commands;

pub use connector::{Container, ContainerConfig, GeminiClient, MockChatClient, Router};

pub use domain::{
    format_history, ConversationLog, Delivery, DomainError, HistoryEntry, LogEntry, Outcome,
    Role, SessionHandle, Turn,
};
