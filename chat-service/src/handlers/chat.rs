use crate::services::metrics::record_chat_call;
use crate::AppState;
use axum::extract::{Query, State};
use service_core::error::AppError;
use std::time::Instant;
use utoipa::IntoParams;

#[derive(Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChatQuery {
    /// Prompt forwarded to the model unchanged.
    pub m: String,
}

impl ChatQuery {
    /// Collect `m` from decoded query pairs. A repeated `m` is joined with `,`.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, AppError> {
        let values: Vec<String> = pairs
            .into_iter()
            .filter(|(key, _)| key == "m")
            .map(|(_, value)| value)
            .collect();

        if values.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Missing required query parameter 'm'"
            )));
        }

        Ok(ChatQuery {
            m: values.join(","),
        })
    }
}

/// Send a prompt to the chat model and return its reply as plain text.
#[utoipa::path(
    get,
    path = "/chat",
    params(ChatQuery),
    responses(
        (status = 200, description = "Model reply", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing `m` parameter"),
        (status = 502, description = "Chat-model backend failed"),
        (status = 504, description = "Chat-model backend timed out")
    ),
    tag = "Chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<String, AppError> {
    let prompt = ChatQuery::from_pairs(pairs)?.m;
    let prompt_len = prompt.len();
    let model = state.chat_model.clone();
    let start = Instant::now();

    // Detached so a client disconnect does not abort the backend call.
    let reply = tokio::spawn(async move { model.call(&prompt).await })
        .await
        .map_err(|e| {
            tracing::error!("Chat-model task failed: {}", e);
            AppError::InternalError(anyhow::anyhow!("Chat-model task failed: {}", e))
        })?;

    let elapsed = start.elapsed();
    let model_name = state.chat_model.model_name();

    match reply {
        Ok(text) => {
            record_chat_call(model_name, "success", elapsed);
            tracing::info!(
                model = %model_name,
                prompt_len,
                response_len = text.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Chat completed"
            );
            Ok(text)
        }
        Err(e) => {
            record_chat_call(model_name, e.kind(), elapsed);
            tracing::error!(
                model = %model_name,
                prompt_len,
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "Chat-model call failed"
            );
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn single_prompt_is_taken_as_is() {
        let query = ChatQuery::from_pairs(pairs(&[("m", "hello")])).unwrap();
        assert_eq!(query.m, "hello");
    }

    #[test]
    fn repeated_prompt_is_joined_in_order() {
        let query =
            ChatQuery::from_pairs(pairs(&[("m", "a"), ("other", "x"), ("m", "b")])).unwrap();
        assert_eq!(query.m, "a,b");
    }

    #[test]
    fn missing_prompt_is_bad_request() {
        let err = ChatQuery::from_pairs(pairs(&[("message", "hello")])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
