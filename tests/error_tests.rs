// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chess_heatmap::error::AppError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[test]
fn test_is_rate_limited_matches() {
    let err = AppError::Upstream(AppError::RATE_LIMITED.to_string());
    assert!(err.is_rate_limited());
}

#[test]
fn test_is_rate_limited_no_match() {
    let err = AppError::Upstream("chesscom HTTP 503 Service Unavailable".to_string());
    assert!(!err.is_rate_limited());

    let err = AppError::BadRequest(AppError::RATE_LIMITED.to_string());
    assert!(!err.is_rate_limited());
}

#[test]
fn test_is_not_found() {
    assert!(AppError::NotFound("lichess account".to_string()).is_not_found());
    assert!(!AppError::Upstream("lichess HTTP 404".to_string()).is_not_found());
}

#[tokio::test]
async fn test_bad_request_response() {
    let (status, body) = render(AppError::BadRequest("Year is required".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["details"], "Year is required");
}

#[tokio::test]
async fn test_upstream_responses_are_bad_gateway() {
    let (status, body) = render(AppError::Upstream("timeout".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_error");

    let (status, body) = render(AppError::InvalidData("not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "invalid_upstream_data");
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let (status, body) = render(AppError::Internal(anyhow::anyhow!("disk on fire"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(body.get("details").is_none());

    let (status, body) = render(AppError::Cache("write failed".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "cache_error");
}
