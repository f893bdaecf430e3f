// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Common interface over the upstream chess platforms.

use crate::error::{AppError, Result};
use crate::models::{Platform, PlatformActivity, ProfileOutcome};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// A source of games and profiles for one platform.
#[async_trait]
pub trait ChessPlatform: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetch one UTC year of games for `username`.
    ///
    /// An unknown account yields an empty result. Errors are returned only
    /// when the platform could not supply the data at all; losing part of it
    /// sets [`PlatformActivity::partial`] instead. Callers degrade a failed
    /// platform to no data.
    async fn try_fetch_games(&self, username: &str, year: i32) -> Result<PlatformActivity>;

    /// Fetch the account's profile and ratings. Never fails; failures are
    /// reported through the outcome.
    async fn fetch_profile(&self, username: &str) -> ProfileOutcome;
}

/// Check response status and map failures onto [`AppError`].
pub(crate) async fn check_response(
    platform: Platform,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    match status.as_u16() {
        404 => Err(AppError::NotFound(format!("{} account", platform))),
        429 => {
            tracing::warn!(%platform, "Rate limit hit (429)");
            Err(AppError::Upstream(AppError::RATE_LIMITED.to_string()))
        }
        _ => Err(AppError::Upstream(format!(
            "{} HTTP {}: {}",
            platform,
            status,
            truncate(&body, 200)
        ))),
    }
}

/// Check response and parse JSON body.
pub(crate) async fn check_response_json<T: DeserializeOwned>(
    platform: Platform,
    response: reqwest::Response,
) -> Result<T> {
    let response = check_response(platform, response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Upstream(format!("{} read error: {}", platform, e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::InvalidData(format!("{} JSON parse error: {}", platform, e)))
}

/// Map a transport-level failure.
pub(crate) fn transport_error(platform: Platform, err: reqwest::Error) -> AppError {
    AppError::Upstream(format!("{} request failed: {}", platform, err))
}

fn truncate(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
