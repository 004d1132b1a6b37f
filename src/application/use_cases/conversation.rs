use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{ChatClient, DispatchMode, TurnRelay};
use crate::domain::{ConversationLog, Delivery, DomainError, HistoryEntry, Outcome, Turn};

/// A user-visible error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    title: String,
    message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn dispatch_failed(reason: &str) -> Self {
        Self::error(format!("Failed to get response:\n{reason}"))
    }

    pub fn history_failed(reason: &str) -> Self {
        Self::error(format!("Could not fetch history:\n{reason}"))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What a drained delivery did to the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Reply { seq: u64, text: String },
    Notified { seq: u64, notification: Notification },
}

/// Consumer side of a [`TurnRelay`]: owns the conversation log and applies
/// outcomes to it from a single thread of control.
pub struct Conversation {
    relay: TurnRelay,
    log: ConversationLog,
    notifications: Vec<Notification>,
}

impl Conversation {
    /// Opens a session on `client` and wires a relay to it.
    pub async fn start(
        client: Arc<dyn ChatClient>,
        model: &str,
        mode: DispatchMode,
    ) -> Result<Self, DomainError> {
        let session = client.create_session(model).await?;
        info!("Started chat session {} on {}", session.id(), session.model());
        Ok(Self::new(TurnRelay::new(client, session, mode)))
    }

    pub fn new(relay: TurnRelay) -> Self {
        Self {
            relay,
            log: ConversationLog::new(),
            notifications: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        self.relay.session().model()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn pending(&self) -> usize {
        self.relay.in_flight()
    }

    /// Records the user entry immediately, then dispatches without waiting.
    pub fn submit(&mut self, text: &str) -> Option<Turn> {
        let turn = self.relay.submit(text)?;
        self.log.push_user(turn.text());
        Some(turn)
    }

    /// One polling step: apply every delivery available now, in FIFO order.
    pub fn tick(&mut self) -> Vec<Applied> {
        self.relay
            .try_drain()
            .into_iter()
            .map(|delivery| self.apply(delivery))
            .collect()
    }

    /// Wait for one outstanding turn and apply its outcome.
    pub async fn wait_next(&mut self) -> Option<Applied> {
        let delivery = self.relay.recv().await?;
        Some(self.apply(delivery))
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Clears the log and unread notifications. Turns still in flight will
    /// deliver into the fresh log.
    pub fn reset(&mut self) {
        let cleared = self.log.clear();
        self.notifications.clear();
        debug!("Conversation reset, {} entries cleared", cleared.len());
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, DomainError> {
        self.relay.history().await
    }

    fn apply(&mut self, delivery: Delivery) -> Applied {
        let seq = delivery.seq();
        match delivery.into_outcome() {
            Outcome::Success { text } => {
                self.log.push_model(text.clone());
                Applied::Reply { seq, text }
            }
            Outcome::Failure { reason } => {
                let notification = Notification::dispatch_failed(&reason);
                self.notifications.push(notification.clone());
                Applied::Notified { seq, notification }
            }
        }
    }
}
