use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::application::{
    ChatClient, Conversation, DispatchMode, SinglePromptUseCase, DEFAULT_POLL_INTERVAL,
};
use crate::connector::adapter::{GeminiClient, MockChatClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::domain::DomainError;

pub const API_KEY_ENV: &str = "GENAI_API_KEY";
pub const MODEL_ENV: &str = "GENAI_MODEL";
pub const BASE_URL_ENV: &str = "GENAI_BASE_URL";

#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    /// Use the offline echo client instead of the hosted API.
    pub mock: bool,
    pub dispatch_mode: DispatchMode,
    pub poll_interval: Duration,
}

impl ContainerConfig {
    /// Reads `GENAI_API_KEY`, `GENAI_MODEL` and `GENAI_BASE_URL`.
    /// An explicit `model` wins over the environment.
    pub fn from_env(model: Option<String>) -> Self {
        let model = model
            .or_else(|| std::env::var(MODEL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty());
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self {
            model,
            api_key,
            base_url,
            ..Self::default()
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            mock: false,
            dispatch_mode: DispatchMode::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Explicitly constructed wiring of the chat client and its settings.
/// Nothing here is process-global; callers own the container.
pub struct Container {
    client: Arc<dyn ChatClient>,
    config: ContainerConfig,
}

impl Container {
    /// Fails with [`DomainError::ConfigurationError`] when no API key is
    /// available and the mock client was not requested.
    pub fn new(config: ContainerConfig) -> Result<Self, DomainError> {
        let client: Arc<dyn ChatClient> = if config.mock {
            debug!("Using mock chat client");
            Arc::new(MockChatClient::new().with_latency(Duration::from_millis(300)))
        } else {
            let api_key = config.api_key.as_deref().unwrap_or_default();
            debug!("Using Gemini client at {}", config.base_url);
            Arc::new(GeminiClient::new(api_key, config.base_url.as_str())?)
        };

        Ok(Self { client, config })
    }

    /// Wire a container around an already-built client.
    pub fn with_client(client: Arc<dyn ChatClient>, config: ContainerConfig) -> Self {
        Self { client, config }
    }

    pub async fn conversation(&self) -> Result<Conversation, DomainError> {
        Conversation::start(self.client.clone(), &self.config.model, self.config.dispatch_mode).await
    }

    pub fn single_prompt_use_case(&self) -> SinglePromptUseCase {
        SinglePromptUseCase::new(self.client.clone(), self.config.model.clone())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_configuration_error() {
        let config = ContainerConfig::default();
        let err = Container::new(config).err().unwrap();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn mock_needs_no_key() {
        let config = ContainerConfig {
            mock: true,
            ..ContainerConfig::default()
        };
        let container = Container::new(config).unwrap();
        assert_eq!(container.model(), DEFAULT_MODEL);
        assert_eq!(container.poll_interval(), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn with_client_wires_the_given_client() {
        let client = MockChatClient::new().with_reply("ping", "pong");
        let config = ContainerConfig {
            model: "injected".to_string(),
            dispatch_mode: DispatchMode::Serialized,
            ..ContainerConfig::default()
        };
        let container = Container::with_client(Arc::new(client), config);

        let mut conversation = container.conversation().await.unwrap();
        assert_eq!(conversation.model(), "injected");
        conversation.submit("ping");
        let applied = conversation.wait_next().await.unwrap();

        assert!(matches!(applied, crate::application::Applied::Reply { ref text, .. } if text == "pong"));
        assert_eq!(
            container.single_prompt_use_case().execute("ping").await.unwrap(),
            "pong"
        );
    }
}
