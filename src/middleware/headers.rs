// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response headers middleware.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Shared caches may keep API responses for an hour and serve them stale
/// for a day while revalidating.
pub const API_CACHE_CONTROL: &str = "public, s-maxage=3600, stale-while-revalidate=86400";

/// Add `nosniff` to every response and a public `Cache-Control` to
/// successful API responses that do not set their own.
pub async fn add_response_headers(req: Request, next: Next) -> Response {
    let is_api = req.uri().path().starts_with("/api/");
    let mut response = next.run(req).await;
    let success = response.status().is_success();
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    if is_api && success && !headers.contains_key(header::CACHE_CONTROL) {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(API_CACHE_CONTROL),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::{routing::get, Router};
    use tower::ServiceExt; // for oneshot

    fn app() -> Router {
        Router::new()
            .route("/api/ok", get(|| async { "data" }))
            .route(
                "/api/fail",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .route("/health", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(add_response_headers))
    }

    async fn headers_for(uri: &str) -> axum::http::HeaderMap {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.headers().clone()
    }

    #[tokio::test]
    async fn test_successful_api_response_is_cacheable() {
        let headers = headers_for("/api/ok").await;
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("Cache-Control").unwrap(), API_CACHE_CONTROL);
    }

    #[tokio::test]
    async fn test_errors_and_non_api_routes_are_not_cached() {
        let headers = headers_for("/api/fail").await;
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert!(headers.get("Cache-Control").is_none());

        let headers = headers_for("/health").await;
        assert!(headers.get("Cache-Control").is_none());
    }
}
