use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::application::ChatClient;
use crate::domain::{DomainError, Turn};

/// Sends one prompt on a fresh session and waits for the whole reply.
///
/// Used where there is no long-lived consumer loop: the one-shot `ask`
/// command and each web request. The session is closed again whether or not
/// the model answered, so a long-running server holds no per-request state.
pub struct SinglePromptUseCase {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl SinglePromptUseCase {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub async fn execute(&self, prompt: &str) -> Result<String, DomainError> {
        let turn = Turn::new(0, prompt)
            .ok_or_else(|| DomainError::invalid_input("No message provided"))?;

        let start_time = Instant::now();
        let session = self.client.create_session(&self.model).await?;
        let result = self.client.send(&session, turn.text()).await;
        self.client.close_session(&session).await;
        let reply = result?;

        info!(
            "Reply from {} in {:.2}s",
            self.model,
            start_time.elapsed().as_secs_f64()
        );

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::MockChatClient;

    #[tokio::test]
    async fn blank_prompt_is_invalid_input() {
        let use_case = SinglePromptUseCase::new(Arc::new(MockChatClient::new()), "m");
        let err = use_case.execute("  ").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn returns_reply() {
        let client = MockChatClient::new().with_reply("2+2?", "4");
        let use_case = SinglePromptUseCase::new(Arc::new(client), "m");
        assert_eq!(use_case.execute("2+2?").await.unwrap(), "4");
    }
}
