// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request-level orchestration: cache lookup, concurrent platform fetches,
//! and aggregation.

use crate::error::{AppError, Result};
use crate::models::{
    Accounts, CombinedProfile, HeatmapData, History, Insights, Platform, PlatformActivity,
    ProfileOutcome,
};
use crate::services::aggregator::{merge, summarize_history};
use crate::services::cache::{activity_key, profile_key, Cache, CacheKind};
use crate::services::insights::derive_insights;
use crate::services::platform::ChessPlatform;
use crate::services::profile::combine_profiles;
use crate::services::years::{join_years, YearRange};
use crate::time_utils::current_year;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Fetches, merges and caches chess activity for both platforms.
#[derive(Clone)]
pub struct ChessDataService {
    chesscom: Arc<dyn ChessPlatform>,
    lichess: Arc<dyn ChessPlatform>,
    cache: Cache,
}

impl ChessDataService {
    pub fn new(
        chesscom: Arc<dyn ChessPlatform>,
        lichess: Arc<dyn ChessPlatform>,
        cache: Cache,
    ) -> Self {
        Self {
            chesscom,
            lichess,
            cache,
        }
    }

    fn client(&self, platform: Platform) -> &dyn ChessPlatform {
        match platform {
            Platform::Chesscom => self.chesscom.as_ref(),
            Platform::Lichess => self.lichess.as_ref(),
        }
    }

    /// Merged heatmap for one year.
    ///
    /// A platform that fails contributes nothing; the request fails only when
    /// every requested platform failed. Results with a failed or partial
    /// platform are not cached.
    pub async fn heatmap(&self, accounts: &Accounts, year: i32) -> Result<HeatmapData> {
        let kind = CacheKind::for_year(year, current_year());
        let key = activity_key(&accounts.cache_key(), year);

        if let Some(cached) = self.cache.get::<HeatmapData>(&key, kind).await {
            tracing::debug!(key = %key, "Heatmap cache hit");
            return Ok(cached);
        }

        let (chesscom, lichess) = tokio::join!(
            self.games(Platform::Chesscom, accounts, year),
            self.games(Platform::Lichess, accounts, year),
        );

        let requested = usize::from(chesscom.is_some()) + usize::from(lichess.is_some());
        let mut failures = Vec::new();
        let chesscom = settle(Platform::Chesscom, chesscom, &mut failures);
        let lichess = settle(Platform::Lichess, lichess, &mut failures);

        if requested > 0 && failures.len() == requested {
            return Err(all_failed(failures));
        }

        let complete = failures.is_empty()
            && [&chesscom, &lichess]
                .into_iter()
                .flatten()
                .all(PlatformActivity::is_complete);
        let data = merge(chesscom.as_ref(), lichess.as_ref());

        if complete {
            self.cache.set(&key, &data, kind).await;
        }

        tracing::info!(
            accounts = %accounts.cache_key(),
            year,
            total_games = data.total_games,
            failed = failures.len(),
            complete,
            "Heatmap built"
        );

        Ok(data)
    }

    /// Activity for a single platform account.
    pub async fn platform_activity(
        &self,
        platform: Platform,
        username: &str,
        year: i32,
    ) -> Result<PlatformActivity> {
        let kind = CacheKind::for_year(year, current_year());
        let key = activity_key(&format!("{}/{}", platform, username.to_lowercase()), year);

        if let Some(cached) = self.cache.get::<PlatformActivity>(&key, kind).await {
            tracing::debug!(key = %key, "Activity cache hit");
            return Ok(cached);
        }

        let client = self.client(platform);
        let activity = client.try_fetch_games(username, year).await?;
        if activity.is_complete() {
            self.cache.set(&key, &activity, kind).await;
        }

        tracing::info!(
            platform = %client.platform(),
            username,
            year,
            total_games = activity.total,
            complete = activity.is_complete(),
            "Platform activity built"
        );

        Ok(activity)
    }

    /// Combined profiles and ratings. Never fails; per-platform problems are
    /// reported inside the result.
    pub async fn profile(&self, accounts: &Accounts) -> CombinedProfile {
        let key = profile_key(&accounts.cache_key());

        if let Some(cached) = self
            .cache
            .get::<CombinedProfile>(&key, CacheKind::Profile)
            .await
        {
            tracing::debug!(key = %key, "Profile cache hit");
            return cached;
        }

        let (chesscom, lichess) = tokio::join!(
            self.profile_outcome(Platform::Chesscom, accounts),
            self.profile_outcome(Platform::Lichess, accounts),
        );

        let combined = combine_profiles(chesscom, lichess);

        if !combined.has_unavailable() {
            self.cache.set(&key, &combined, CacheKind::Profile).await;
        }

        combined
    }

    /// Years that can be shown, from the accounts' join dates.
    pub async fn years(&self, accounts: &Accounts) -> YearRange {
        let profile = self.profile(accounts).await;
        join_years(&profile.joined_dates(), current_year())
    }

    pub async fn insights(&self, accounts: &Accounts, year: i32) -> Result<Option<Insights>> {
        let data = self.heatmap(accounts, year).await?;
        Ok(derive_insights(&data.daily_counts))
    }

    /// Heatmaps for every year since the earliest join date, plus totals.
    /// Years are fetched sequentially, most recent first.
    pub async fn history(&self, accounts: &Accounts) -> Result<History> {
        let range = self.years(accounts).await;

        let mut per_year = BTreeMap::new();
        for year in &range.years {
            let Ok(numeric) = year.parse::<i32>() else {
                continue;
            };
            let data = self.heatmap(accounts, numeric).await?;
            per_year.insert(year.clone(), data);
        }

        let summary = summarize_history(&per_year);

        Ok(History {
            years: range.years,
            per_year,
            summary,
        })
    }

    async fn games(
        &self,
        platform: Platform,
        accounts: &Accounts,
        year: i32,
    ) -> Option<Result<PlatformActivity>> {
        let username = accounts.username(platform)?;
        Some(self.client(platform).try_fetch_games(username, year).await)
    }

    async fn profile_outcome(
        &self,
        platform: Platform,
        accounts: &Accounts,
    ) -> Option<ProfileOutcome> {
        let username = accounts.username(platform)?;
        Some(self.client(platform).fetch_profile(username).await)
    }
}

/// Unwrap one platform's fetch. A failure is recorded and the platform
/// degrades to no data, so one unavailable platform never fails the other.
fn settle(
    platform: Platform,
    fetched: Option<Result<PlatformActivity>>,
    failures: &mut Vec<(Platform, AppError)>,
) -> Option<PlatformActivity> {
    match fetched? {
        Ok(activity) => Some(activity),
        Err(e) => {
            tracing::warn!(
                %platform,
                error = %e,
                rate_limited = e.is_rate_limited(),
                "Platform fetch failed, continuing without it"
            );
            failures.push((platform, e));
            None
        }
    }
}

fn all_failed(mut failures: Vec<(Platform, AppError)>) -> AppError {
    if failures.len() == 1 {
        if let Some((_, e)) = failures.pop() {
            return e;
        }
    }

    let details = failures
        .iter()
        .map(|(platform, e)| format!("{}: {}", platform, e))
        .collect::<Vec<_>>()
        .join("; ");
    AppError::Upstream(details)
}
