//! Mock chat model for local runs and tests.

use super::{ChatModel, ChatModelError};
use async_trait::async_trait;

pub struct MockChatModel {
    enabled: bool,
}

impl MockChatModel {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn call(&self, prompt: &str) -> Result<String, ChatModelError> {
        if !self.enabled {
            return Err(ChatModelError::NotConfigured(
                "Mock chat model not enabled".to_string(),
            ));
        }

        Ok(format!("Mock response for: {}", prompt))
    }

    async fn health_check(&self) -> Result<(), ChatModelError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ChatModelError::NotConfigured(
                "Mock chat model not enabled".to_string(),
            ))
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_prompt() {
        let model = MockChatModel::new(true);
        let reply = model.call("hello").await.unwrap();
        assert_eq!(reply, "Mock response for: hello");
        assert!(model.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn disabled_mock_reports_not_configured() {
        let model = MockChatModel::new(false);
        assert!(matches!(
            model.call("hello").await,
            Err(ChatModelError::NotConfigured(_))
        ));
        assert!(model.health_check().await.is_err());
    }
}
