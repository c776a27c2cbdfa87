pub mod config;
pub mod docs;
pub mod handlers;
pub mod services;
pub mod startup;

use crate::config::ChatConfig;
use crate::services::ChatModel;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ChatConfig,
    pub chat_model: Arc<dyn ChatModel>,
}

impl AppState {
    pub fn new(config: ChatConfig, chat_model: Arc<dyn ChatModel>) -> Self {
        Self { config, chat_model }
    }
}
