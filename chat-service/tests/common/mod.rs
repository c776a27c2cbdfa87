#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chat_service::config::ChatConfig;
use chat_service::services::{ChatModel, ChatModelError};
use chat_service::startup::build_router;
use chat_service::AppState;
use http_body_util::BodyExt;
use service_core::config::Config as CoreConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// What the stub model answers with.
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Fail(fn() -> ChatModelError),
}

/// Chat model double that records every prompt it receives.
pub struct RecordingChatModel {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl RecordingChatModel {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Text(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: fn() -> ChatModelError) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail(error),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for RecordingChatModel {
    async fn call(&self, prompt: &str) -> Result<String, ChatModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail(error) => Err(error()),
        }
    }

    async fn health_check(&self) -> Result<(), ChatModelError> {
        match &self.reply {
            Reply::Text(_) => Ok(()),
            Reply::Fail(error) => Err(error()),
        }
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

/// Configuration built from `vars` only, listening on a random port.
pub fn test_config(vars: &[(&str, &str)]) -> ChatConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let common = CoreConfig {
        port: 0,
        ..CoreConfig::default()
    };
    ChatConfig::from_lookup(common, |key| vars.get(key).cloned())
        .expect("Failed to build test config")
}

pub fn test_router(model: Arc<dyn ChatModel>) -> Router {
    build_router(AppState::new(test_config(&[]), model))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
