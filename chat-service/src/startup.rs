//! Application startup and lifecycle management.

use crate::config::{ChatConfig, CorsConfig, ProviderKind};
use crate::services::providers::mock::MockChatModel;
use crate::services::providers::ollama::OllamaChatModel;
use crate::services::ChatModel;
use crate::{docs, handlers, AppState};
use axum::http::{HeaderValue, Method};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, RequestSpan},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// How long browsers may cache a preflight answer.
const CORS_MAX_AGE: Duration = Duration::from_secs(1800);

/// Construct the chat-model backend selected in configuration.
pub fn build_chat_model(config: &ChatConfig) -> Result<Arc<dyn ChatModel>, AppError> {
    let chat_model: Arc<dyn ChatModel> = match config.provider {
        ProviderKind::Ollama => {
            let model = OllamaChatModel::new(config.ollama.clone())
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            Arc::new(model)
        }
        ProviderKind::Mock => Arc::new(MockChatModel::new(true)),
    };

    tracing::info!(
        provider = ?config.provider,
        model = %chat_model.model_name(),
        base_url = %config.ollama.base_url,
        "Initialized chat model"
    );

    Ok(chat_model)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        // Origins are validated when the configuration is loaded.
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(CORS_MAX_AGE)
}

pub fn build_router(state: AppState) -> Router {
    let chat_routes = Router::new()
        .route("/chat", get(handlers::chat::chat))
        .layer(cors_layer(&state.config.cors));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(chat_routes);

    if state.config.docs.enabled {
        app = app.merge(docs::router());
    }

    app.with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the chat model named in `config`.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let chat_model = build_chat_model(&config)?;
        Self::build_with_model(config, chat_model).await
    }

    /// Build the application around an already constructed chat model.
    pub async fn build_with_model(
        config: ChatConfig,
        chat_model: Arc<dyn ChatModel>,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Chat service: HTTP on port {}", port);

        let router = build_router(AppState::new(config, chat_model));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
