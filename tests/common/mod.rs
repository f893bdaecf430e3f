// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chess_heatmap::config::Config;
use chess_heatmap::error::{AppError, Result};
use chess_heatmap::models::{
    GameRecord, GameResult, Platform, PlatformActivity, PlatformProfile, PlatformRatings,
    ProfileOutcome, Speed,
};
use chess_heatmap::routes::create_router;
use chess_heatmap::services::{Cache, ChessDataService, ChessPlatform};
use chess_heatmap::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// In-process stand-in for a chess platform.
pub struct MockPlatform {
    platform: Platform,
    games: HashMap<i32, PlatformActivity>,
    failure: Option<String>,
    partial: bool,
    profile: ProfileOutcome,
    game_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

#[allow(dead_code)]
impl MockPlatform {
    /// A platform where every account exists and has no games.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            games: HashMap::new(),
            failure: None,
            partial: false,
            profile: found_profile(platform, "player", None, PlatformRatings::default()),
            game_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// One blitz win on each listed date (duplicates allowed).
    pub fn with_games(mut self, year: i32, dates: &[&str]) -> Self {
        let activity = self.games.entry(year).or_default();
        for date in dates {
            activity.record(&GameRecord {
                date: date.parse().expect("valid test date"),
                speed: Speed::Blitz,
                result: GameResult::Win,
            });
        }
        self
    }

    /// Every game fetch fails with an upstream error.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Games are returned but flagged as incompletely fetched.
    pub fn partial(mut self) -> Self {
        self.partial = true;
        self
    }

    pub fn with_profile(mut self, outcome: ProfileOutcome) -> Self {
        self.profile = outcome;
        self
    }

    pub fn game_calls(&self) -> usize {
        self.game_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChessPlatform for MockPlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn try_fetch_games(&self, _username: &str, year: i32) -> Result<PlatformActivity> {
        self.game_calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(AppError::Upstream(message.clone())),
            None => Ok(PlatformActivity {
                partial: self.partial,
                ..self.games.get(&year).cloned().unwrap_or_default()
            }),
        }
    }

    async fn fetch_profile(&self, _username: &str) -> ProfileOutcome {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.profile.clone()
    }
}

/// A found profile with an optional join date (epoch ms).
#[allow(dead_code)]
pub fn found_profile(
    platform: Platform,
    username: &str,
    joined_date: Option<i64>,
    ratings: PlatformRatings,
) -> ProfileOutcome {
    ProfileOutcome::Found {
        profile: PlatformProfile {
            username: username.to_string(),
            platform,
            url: format!("https://example.invalid/{}/{}", platform, username),
            avatar: None,
            title: None,
            country: None,
            joined_date,
            last_online: None,
            followers: None,
            is_streamer: None,
        },
        ratings,
        warning: None,
    }
}

/// Create a test app over the given platforms with an in-memory cache.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(
    chesscom: Arc<MockPlatform>,
    lichess: Arc<MockPlatform>,
) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let cache = Cache::in_memory(config.cache_policy());
    let chess_data = ChessDataService::new(chesscom, lichess, cache);

    let state = Arc::new(AppState { config, chess_data });

    (create_router(state.clone()), state)
}

/// Create a test app whose platforms know every account but have no games.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(
        Arc::new(MockPlatform::new(Platform::Chesscom)),
        Arc::new(MockPlatform::new(Platform::Lichess)),
    )
}

/// Issue a GET and decode the JSON body.
#[allow(dead_code)]
pub async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);

    (status, json)
}
