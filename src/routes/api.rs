// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public API routes.

use crate::error::{AppError, Result};
use crate::models::{
    Accounts, CombinedProfile, GameBreakdown, HeatmapData, History, Insights, Platform,
};
use crate::services::YearRange;
use crate::time_utils::{current_year, parse_year};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/combined", get(get_combined))
        .route("/api/chesscom", get(get_chesscom))
        .route("/api/lichess", get(get_lichess))
        .route("/api/profile", get(get_profile))
        .route("/api/years", get(get_years))
        .route("/api/insights", get(get_insights))
        .route("/api/history", get(get_history))
}

/// Query naming one or both accounts.
#[derive(Debug, Deserialize)]
struct AccountsQuery {
    chesscom: Option<String>,
    lichess: Option<String>,
    year: Option<String>,
}

impl AccountsQuery {
    fn accounts(&self) -> Result<Accounts> {
        Accounts::new(self.chesscom.as_deref(), self.lichess.as_deref())
    }
}

/// Year from the query, defaulting to the current year.
fn year_or_current(raw: Option<&str>) -> Result<i32> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_year(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid year: {}", raw))),
        None => Ok(current_year()),
    }
}

// ─── Combined Heatmap ────────────────────────────────────────

/// Merged heatmap for both accounts.
async fn get_combined(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AccountsQuery>,
) -> Result<Json<HeatmapData>> {
    let accounts = params.accounts()?;
    let year = year_or_current(params.year.as_deref())?;

    let data = state.chess_data.heatmap(&accounts, year).await?;
    Ok(Json(data))
}

// ─── Single Platform ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PlatformQuery {
    username: Option<String>,
    year: Option<String>,
}

/// Activity for one platform account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlatformActivityResponse {
    pub source: Platform,
    pub username: String,
    pub year: i32,
    pub total_games: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "Record<string, number>"))]
    pub daily_counts: BTreeMap<NaiveDate, u32>,
    pub breakdown: GameBreakdown,
}

async fn platform_activity(
    state: &AppState,
    platform: Platform,
    username: Option<&str>,
    year: i32,
) -> Result<Json<PlatformActivityResponse>> {
    let accounts = Accounts::single(platform, username)?;
    let username = accounts
        .username(platform)
        .ok_or_else(|| AppError::BadRequest("Username is required".to_string()))?;

    let activity = state
        .chess_data
        .platform_activity(platform, username, year)
        .await?;

    Ok(Json(PlatformActivityResponse {
        source: platform,
        username: username.to_string(),
        year,
        total_games: activity.total,
        daily_counts: activity.counts,
        breakdown: activity.breakdown,
    }))
}

/// Chess.com activity; `year` defaults to the current year.
async fn get_chesscom(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlatformQuery>,
) -> Result<Json<PlatformActivityResponse>> {
    let year = year_or_current(params.year.as_deref())?;
    platform_activity(&state, Platform::Chesscom, params.username.as_deref(), year).await
}

/// Lichess activity; `year` is required.
async fn get_lichess(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlatformQuery>,
) -> Result<Json<PlatformActivityResponse>> {
    let year = match params.year.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => year_or_current(Some(raw))?,
        _ => return Err(AppError::BadRequest("Year is required".to_string())),
    };
    platform_activity(&state, Platform::Lichess, params.username.as_deref(), year).await
}

// ─── Profile ─────────────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AccountsQuery>,
) -> Result<Json<CombinedProfile>> {
    let accounts = params.accounts()?;
    Ok(Json(state.chess_data.profile(&accounts).await))
}

// ─── Years ───────────────────────────────────────────────────

async fn get_years(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AccountsQuery>,
) -> Result<Json<YearRange>> {
    let accounts = params.accounts()?;
    Ok(Json(state.chess_data.years(&accounts).await))
}

// ─── Insights & History ──────────────────────────────────────

/// Insights for one year, or `null` when there were no games.
async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AccountsQuery>,
) -> Result<Json<Option<Insights>>> {
    let accounts = params.accounts()?;
    let year = year_or_current(params.year.as_deref())?;

    let insights = state.chess_data.insights(&accounts, year).await?;
    Ok(Json(insights))
}

/// Every year since the accounts were created.
async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AccountsQuery>,
) -> Result<Json<History>> {
    let accounts = params.accounts()?;

    let history = state.chess_data.history(&accounts).await?;
    tracing::info!(
        accounts = %accounts.cache_key(),
        years = history.years.len(),
        total_games = history.summary.total_games,
        "History built"
    );
    Ok(Json(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_or_current() {
        assert_eq!(year_or_current(Some("2021")).unwrap(), 2021);
        assert_eq!(year_or_current(Some(" ")).unwrap(), current_year());
        assert_eq!(year_or_current(None).unwrap(), current_year());
        assert!(matches!(
            year_or_current(Some("twenty")),
            Err(AppError::BadRequest(_))
        ));
        assert!(year_or_current(Some("all")).is_err());
    }
}
