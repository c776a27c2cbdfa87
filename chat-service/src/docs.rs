//! OpenAPI document and its published groups.
//!
//! The full document is served at `/v3/api-docs`. Each [`ApiGroup`] gets a
//! filtered copy at `/v3/api-docs/{group}`, which is also what the Swagger UI
//! at `/swagger-ui` loads.

use crate::handlers;
use axum::{routing::get, Json, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(title = "chat-service", description = "Forwards prompts to a language model"),
    paths(
        handlers::chat::chat,
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::metrics::metrics,
    ),
    tags(
        (name = "Chat", description = "Prompt the language model"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

/// A named set of routes published together in the documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiGroup {
    pub name: &'static str,
    /// Ant-style patterns (`/**`, `/api/*`); a path is in the group if any
    /// pattern matches it.
    pub paths_to_match: &'static [&'static str],
}

/// Groups registered at startup.
pub const GROUPS: &[ApiGroup] = &[ApiGroup::public()];

impl ApiGroup {
    /// Every route, under the name `public`.
    pub const fn public() -> Self {
        Self {
            name: "public",
            paths_to_match: &["/**"],
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.paths_to_match
            .iter()
            .any(|pattern| ant_match(pattern, path))
    }

    /// Copy of `openapi` keeping only the paths in this group.
    pub fn filter(&self, openapi: &utoipa::openapi::OpenApi) -> utoipa::openapi::OpenApi {
        let mut filtered = openapi.clone();
        filtered.paths.paths.retain(|path, _| self.matches(path));
        filtered
    }

    pub fn docs_url(&self) -> String {
        format!("/v3/api-docs/{}", self.name)
    }
}

/// Ant-style path matching: `**` spans any number of segments, `*` any run of
/// characters within a segment, `?` exactly one character.
pub fn ant_match(pattern: &str, path: &str) -> bool {
    let pattern: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match_segments(&pattern, &path)
}

fn match_segments(pattern: &[&str], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => {
            match_segments(rest, path) || (!path.is_empty() && match_segments(pattern, &path[1..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => match_segment(segment, head) && match_segments(rest, tail),
            None => false,
        },
    }
}

fn match_segment(pattern: &str, segment: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let segment: Vec<char> = segment.chars().collect();
    match_chars(&pattern, &segment)
}

fn match_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| match_chars(rest, &text[skip..])),
        Some(('?', rest)) => !text.is_empty() && match_chars(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && match_chars(rest, &text[1..]),
    }
}

/// Documentation routes: the full document, one document per group, and the
/// Swagger UI listing the groups.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let openapi = ApiDoc::openapi();

    let swagger = GROUPS.iter().fold(SwaggerUi::new("/swagger-ui"), |ui, group| {
        ui.url(group.docs_url(), group.filter(&openapi))
    });

    Router::new()
        .route("/v3/api-docs", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(swagger)
}
