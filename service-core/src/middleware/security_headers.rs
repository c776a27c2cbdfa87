use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Path prefixes served by the Swagger UI and the OpenAPI documents.
pub const DOCS_PATH_PREFIXES: [&str; 2] = ["/swagger-ui", "/v3/api-docs"];

fn is_docs_route(path: &str) -> bool {
    DOCS_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_docs_route = is_docs_route(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    // Swagger UI needs inline scripts/styles and same-origin framing
    if is_docs_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self' 'unsafe-inline'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data:; \
                 font-src 'self'; \
                 connect-src 'self'",
            ),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("SAMEORIGIN"),
        );
    } else {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_routes_are_recognised() {
        assert!(is_docs_route("/swagger-ui/index.html"));
        assert!(is_docs_route("/v3/api-docs/public"));
        assert!(!is_docs_route("/chat"));
    }
}
