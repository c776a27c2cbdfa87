//! Chat-model abstraction and implementations.
//!
//! Handlers only see [`ChatModel`]; the concrete backend (Ollama, mock) is
//! chosen at startup from configuration.

pub mod mock;
pub mod ollama;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for chat-model calls.
#[derive(Error, Debug)]
pub enum ChatModelError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ChatModelError {
    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatModelError::NotConfigured(_) => "not_configured",
            ChatModelError::Network(_) => "network",
            ChatModelError::Timeout(_) => "timeout",
            ChatModelError::Api { .. } => "api",
            ChatModelError::InvalidResponse(_) => "invalid_response",
        }
    }
}

impl From<ChatModelError> for AppError {
    fn from(err: ChatModelError) -> Self {
        match err {
            ChatModelError::NotConfigured(_) => AppError::ServiceUnavailable,
            ChatModelError::Timeout(msg) => AppError::GatewayTimeout(msg),
            other => AppError::BadGateway(other.to_string()),
        }
    }
}

/// A language-model client that turns one prompt into one reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send `prompt` as a single user message and return the generated text.
    async fn call(&self, prompt: &str) -> Result<String, ChatModelError>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> Result<(), ChatModelError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
