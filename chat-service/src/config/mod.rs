use crate::services::providers::ollama::{self, OllamaConfig};
use axum::http::HeaderValue;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default timeout for one chat-model call.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub common: core_config::Config,
    pub provider: ProviderKind,
    pub ollama: OllamaConfig,
    pub cors: CorsConfig,
    pub docs: DocsConfig,
    pub observability: ObservabilityConfig,
}

/// Which chat-model backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown CHAT_PROVIDER '{}', expected 'ollama' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// `*` allows every origin.
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Clone)]
pub struct DocsConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// With `ENVIRONMENT=prod` the backend location and model must be set
    /// explicitly; other environments fall back to local defaults.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";

        let provider = match lookup("CHAT_PROVIDER") {
            Some(value) => value.parse::<ProviderKind>()?,
            None => ProviderKind::Ollama,
        };

        let temperature = lookup("OLLAMA_TEMPERATURE")
            .map(|value| {
                value.parse::<f32>().map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "OLLAMA_TEMPERATURE must be a number: {}",
                        e
                    ))
                })
            })
            .transpose()?;

        let timeout_secs = match lookup("OLLAMA_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "OLLAMA_TIMEOUT_SECS must be a whole number of seconds: {}",
                    e
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let require_backend = is_prod && provider == ProviderKind::Ollama;

        Ok(ChatConfig {
            common,
            provider,
            ollama: OllamaConfig {
                base_url: get_env(
                    &lookup,
                    "OLLAMA_BASE_URL",
                    Some(ollama::DEFAULT_BASE_URL),
                    require_backend,
                )?,
                model: get_env(
                    &lookup,
                    "OLLAMA_CHAT_MODEL",
                    Some(ollama::DEFAULT_MODEL),
                    require_backend,
                )?,
                temperature,
                timeout: Duration::from_secs(timeout_secs),
            },
            cors: CorsConfig {
                allowed_origins: match lookup("CORS_ALLOWED_ORIGINS") {
                    Some(value) => parse_origins(&value)?,
                    None => vec!["*".to_string()],
                },
            },
            docs: DocsConfig {
                enabled: lookup("DOCS_ENABLED")
                    .map(|value| parse_bool("DOCS_ENABLED", &value))
                    .transpose()?
                    .unwrap_or(true),
            },
            observability: ObservabilityConfig {
                log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|e| !e.is_empty()),
            },
        })
    }
}

/// Comma-separated origins; at least one, each a valid header value.
fn parse_origins(value: &str) -> Result<Vec<String>, AppError> {
    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "CORS_ALLOWED_ORIGINS lists no origins, use '*' to allow any"
        )));
    }

    for origin in &origins {
        HeaderValue::from_str(origin).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid origin '{}' in CORS_ALLOWED_ORIGINS: {}",
                origin,
                e
            ))
        })?;
    }

    Ok(origins)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be true or false, got '{}'",
            key,
            value
        ))),
    }
}

fn get_env<F>(
    lookup: &F,
    key: &str,
    default: Option<&str>,
    required: bool,
) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if required {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ChatConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ChatConfig::from_lookup(core_config::Config::default(), |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_target_local_ollama() {
        let config = load(&[]).unwrap();
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.ollama.model, "mistral");
        assert_eq!(config.ollama.temperature, None);
        assert_eq!(config.ollama.timeout, Duration::from_secs(120));
        assert!(config.cors.allows_any_origin());
        assert!(config.docs.enabled);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.observability.otlp_endpoint.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("CHAT_PROVIDER", "Mock"),
            ("OLLAMA_BASE_URL", "http://ollama:11434"),
            ("OLLAMA_CHAT_MODEL", "llama3.2"),
            ("OLLAMA_TEMPERATURE", "0.2"),
            ("OLLAMA_TIMEOUT_SECS", "30"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example"),
            ("DOCS_ENABLED", "false"),
        ])
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Mock);
        assert_eq!(config.ollama.base_url, "http://ollama:11434");
        assert_eq!(config.ollama.model, "llama3.2");
        assert_eq!(config.ollama.temperature, Some(0.2));
        assert_eq!(config.ollama.timeout, Duration::from_secs(30));
        assert_eq!(
            config.cors.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.cors.allows_any_origin());
        assert!(!config.docs.enabled);
    }

    #[test]
    fn prod_requires_backend_settings() {
        let err = load(&[("ENVIRONMENT", "prod")]).unwrap_err();
        assert!(err.to_string().contains("OLLAMA_BASE_URL"));

        let config = load(&[
            ("ENVIRONMENT", "prod"),
            ("OLLAMA_BASE_URL", "http://ollama:11434"),
            ("OLLAMA_CHAT_MODEL", "mistral"),
        ]);
        assert!(config.is_ok());
    }

    #[test]
    fn prod_mock_provider_needs_no_backend() {
        let config = load(&[("ENVIRONMENT", "prod"), ("CHAT_PROVIDER", "mock")]).unwrap();
        assert_eq!(config.provider, ProviderKind::Mock);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(load(&[("CHAT_PROVIDER", "openai")]).is_err());
        assert!(load(&[("OLLAMA_TEMPERATURE", "warm")]).is_err());
        assert!(load(&[("OLLAMA_TIMEOUT_SECS", "-1")]).is_err());
        assert!(load(&[("DOCS_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn empty_origin_list_is_rejected() {
        for value in ["", ",", " , ,", "   "] {
            let err = load(&[("CORS_ALLOWED_ORIGINS", value)]).unwrap_err();
            assert!(
                err.to_string().contains("CORS_ALLOWED_ORIGINS"),
                "{:?} accepted",
                value
            );
        }
    }

    #[test]
    fn unparseable_origin_is_rejected() {
        let err = load(&[("CORS_ALLOWED_ORIGINS", "https://ok.example,bad\norigin")]).unwrap_err();
        assert!(err.to_string().contains("Invalid origin"));
    }
}
