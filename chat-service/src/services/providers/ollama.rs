//! Ollama chat-model implementation.
//!
//! Sends the prompt as a single user message to `POST {base_url}/api/chat`
//! with streaming disabled and returns `message.content` from the reply.

use super::{ChatModel, ChatModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama endpoint for a local install.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "mistral";

/// Ollama provider configuration.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ChatOptions>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct OllamaChatModel {
    config: OllamaConfig,
    client: Client,
}

impl OllamaChatModel {
    pub fn new(config: OllamaConfig) -> Result<Self, ChatModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ChatModelError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ChatModelError {
        if e.is_timeout() {
            ChatModelError::Timeout(format!(
                "Ollama did not answer within {:?}",
                self.config.timeout
            ))
        } else {
            ChatModelError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn call(&self, prompt: &str) -> Result<String, ChatModelError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: self
                .config
                .temperature
                .map(|temperature| ChatOptions { temperature }),
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Ollama"
        );

        let response = self
            .client
            .post(self.api_url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);

            return Err(ChatModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(e)
            } else {
                ChatModelError::InvalidResponse(format!("Failed to parse response: {}", e))
            }
        })?;

        Ok(body.message.content)
    }

    async fn health_check(&self) -> Result<(), ChatModelError> {
        let response = self
            .client
            .get(self.api_url("/api/tags"))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ChatModelError::Api {
                status: response.status().as_u16(),
                message: "Ollama health check failed".to_string(),
            })
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
