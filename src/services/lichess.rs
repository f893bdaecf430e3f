// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lichess API client.
//!
//! Game exports arrive as one newline-delimited JSON stream. The body is
//! consumed chunk by chunk so a long history is never held in memory at once.

use crate::error::{AppError, Result};
use crate::models::{
    GameRecord, GameResult, Platform, PlatformActivity, PlatformProfile, PlatformRatings,
    ProfileOutcome, Rating, Speed,
};
use crate::services::platform::{
    check_response, check_response_json, transport_error, ChessPlatform,
};
use crate::time_utils::{from_epoch_millis, year_bounds_millis};
use async_trait::async_trait;
use chrono::Datelike;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://lichess.org";

/// Lichess API client.
#[derive(Clone)]
pub struct LichessClient {
    http: reqwest::Client,
    base_url: String,
}

impl LichessClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Stream a user's games created in `[since, until]` (epoch ms), calling
    /// `on_line` for every complete NDJSON line in arrival order.
    pub async fn stream_games<F>(
        &self,
        username: &str,
        since: i64,
        until: i64,
        mut on_line: F,
    ) -> Result<()>
    where
        F: FnMut(&str) + Send,
    {
        let url = format!(
            "{}/api/games/user/{}",
            self.base_url,
            urlencoding::encode(username)
        );

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/x-ndjson")
            .query(&[
                ("moves", "false".to_string()),
                ("evals", "false".to_string()),
                ("clocks", "false".to_string()),
                ("opening", "false".to_string()),
                ("since", since.to_string()),
                ("until", until.to_string()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(Platform::Lichess, e))?;

        let response = check_response(Platform::Lichess, response).await?;

        let mut lines = NdjsonLines::default();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::Upstream(format!("lichess stream interrupted: {}", e))
            })?;
            for line in lines.push(&chunk) {
                on_line(&line);
            }
        }
        if let Some(line) = lines.finish() {
            on_line(&line);
        }

        Ok(())
    }

    pub async fn get_user(&self, username: &str) -> Result<LichessUser> {
        let url = format!("{}/api/user/{}", self.base_url, urlencoding::encode(username));

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(Platform::Lichess, e))?;

        check_response_json(Platform::Lichess, response).await
    }
}

#[async_trait]
impl ChessPlatform for LichessClient {
    fn platform(&self) -> Platform {
        Platform::Lichess
    }

    async fn try_fetch_games(&self, username: &str, year: i32) -> Result<PlatformActivity> {
        let (since, until) = year_bounds_millis(year)
            .ok_or_else(|| AppError::BadRequest(format!("Year {} out of range", year)))?;

        let lowered = username.to_lowercase();
        let mut activity = PlatformActivity::default();
        let mut skipped = 0usize;

        let streamed = self
            .stream_games(username, since, until, |line| {
                match tally_line(&mut activity, line, &lowered, year) {
                    Ok(()) => {}
                    Err(_) => skipped += 1,
                }
            })
            .await;

        if skipped > 0 {
            tracing::debug!(username, skipped, "Skipped malformed Lichess games");
        }

        match streamed {
            Ok(()) => {
                tracing::info!(username, year, games = activity.total, "Lichess games fetched");
                Ok(activity)
            }
            Err(e) if e.is_not_found() => {
                tracing::info!(username, "Lichess account not found");
                Ok(PlatformActivity::default())
            }
            Err(e) if !activity.is_empty() => {
                tracing::warn!(
                    username,
                    games = activity.total,
                    error = %e,
                    "Lichess stream ended early, keeping games received so far"
                );
                activity.partial = true;
                Ok(activity)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_profile(&self, username: &str) -> ProfileOutcome {
        match self.get_user(username).await {
            Ok(user) => profile_outcome(user),
            Err(e) if e.is_not_found() => ProfileOutcome::Failed("User not found".to_string()),
            Err(AppError::InvalidData(msg)) => {
                tracing::warn!(username, error = %msg, "Unparseable Lichess profile");
                ProfileOutcome::Failed("Invalid profile data".to_string())
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "Lichess profile unavailable");
                ProfileOutcome::Unavailable
            }
        }
    }
}

/// Splits a byte stream into complete, trimmed, non-blank lines.
///
/// Splitting happens on raw bytes: `\n` never occurs inside a multi-byte
/// UTF-8 sequence, so a character cut across two chunks is reassembled
/// before it is decoded.
#[derive(Debug, Default)]
pub struct NdjsonLines {
    buffer: Vec<u8>,
}

impl NdjsonLines {
    /// Append a chunk and return every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if let Some(line) = decode_line(&self.buffer[start..end]) {
                lines.push(line);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        lines
    }

    /// Flush the trailing partial line at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse and tally one NDJSON line. Games outside `year` are ignored.
pub fn tally_line(
    activity: &mut PlatformActivity,
    line: &str,
    username: &str,
    year: i32,
) -> std::result::Result<(), serde_json::Error> {
    let game: LichessGame = serde_json::from_str(line)?;
    if let Some(record) = classify_game(&game, username, year) {
        activity.record(&record);
    }
    Ok(())
}

/// Classify a game for `username` (lowercase).
pub fn classify_game(game: &LichessGame, username: &str, year: i32) -> Option<GameRecord> {
    let created = from_epoch_millis(game.created_at)?;
    // The since/until window is advisory; the year check is authoritative.
    if created.year() != year {
        return None;
    }

    Some(GameRecord {
        date: created.date_naive(),
        speed: classify_speed(game.speed.as_deref()),
        result: classify_result(game, username),
    })
}

fn classify_speed(speed: Option<&str>) -> Speed {
    match speed {
        Some("bullet") => Speed::Bullet,
        Some("blitz") => Speed::Blitz,
        Some("rapid") => Speed::Rapid,
        Some("classical") => Speed::Classical,
        _ => Speed::Other,
    }
}

fn classify_result(game: &LichessGame, username: &str) -> GameResult {
    if matches!(game.status.as_deref(), Some("draw") | Some("stalemate")) {
        return GameResult::Draw;
    }

    let Some(winner) = game.winner.as_deref() else {
        return GameResult::Other;
    };

    let side = if game.players.white.is(username) {
        "white"
    } else if game.players.black.is(username) {
        "black"
    } else {
        return GameResult::Other;
    };

    if winner == side {
        GameResult::Win
    } else {
        GameResult::Loss
    }
}

fn profile_outcome(user: LichessUser) -> ProfileOutcome {
    let warning = (user.disabled || user.closed || user.tos_violation)
        .then(|| "Account closed or violates terms".to_string());

    let url = user
        .url
        .clone()
        .unwrap_or_else(|| format!("https://lichess.org/@/{}", user.username));

    let (country, perfs) = (
        user.profile.and_then(|p| p.country.or(p.flag)),
        user.perfs.unwrap_or_default(),
    );

    let profile = PlatformProfile {
        username: user.username,
        platform: Platform::Lichess,
        url,
        avatar: None,
        title: user.title,
        country,
        joined_date: user.created_at,
        last_online: user.seen_at,
        followers: user.count.and_then(|c| c.followers),
        is_streamer: user.streamer.map(|_| true),
    };

    let ratings = PlatformRatings {
        bullet: perfs.bullet.map(Perf::into_rating),
        blitz: perfs.blitz.map(Perf::into_rating),
        rapid: perfs.rapid.map(Perf::into_rating),
        classical: perfs.classical.map(Perf::into_rating),
        daily: perfs.correspondence.map(Perf::into_rating),
        puzzle: perfs.puzzle.map(Perf::into_rating),
    };

    ProfileOutcome::Found {
        profile,
        ratings,
        warning,
    }
}

/// One game from the NDJSON export (only the fields used here).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LichessGame {
    /// Epoch milliseconds
    pub created_at: i64,
    pub speed: Option<String>,
    pub status: Option<String>,
    pub winner: Option<String>,
    #[serde(default)]
    pub players: LichessPlayers,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LichessPlayers {
    #[serde(default)]
    pub white: LichessPlayer,
    #[serde(default)]
    pub black: LichessPlayer,
}

/// A player slot; `user` is absent for anonymous players and the AI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LichessPlayer {
    pub user: Option<LichessUserRef>,
}

impl LichessPlayer {
    /// Whether this slot belongs to `username` (lowercase), by name or id.
    fn is(&self, username: &str) -> bool {
        self.user.as_ref().is_some_and(|u| {
            u.name.as_deref().is_some_and(|n| n.to_lowercase() == username)
                || u.id.as_deref().is_some_and(|i| i.to_lowercase() == username)
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LichessUserRef {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// Public user document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LichessUser {
    pub id: String,
    pub username: String,
    pub url: Option<String>,
    pub title: Option<String>,
    /// Epoch milliseconds
    pub created_at: Option<i64>,
    /// Epoch milliseconds
    pub seen_at: Option<i64>,
    pub profile: Option<LichessProfileInfo>,
    pub perfs: Option<LichessPerfs>,
    pub count: Option<LichessCount>,
    pub streamer: Option<serde_json::Value>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub tos_violation: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LichessProfileInfo {
    pub country: Option<String>,
    pub flag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LichessPerfs {
    pub bullet: Option<Perf>,
    pub blitz: Option<Perf>,
    pub rapid: Option<Perf>,
    pub classical: Option<Perf>,
    pub correspondence: Option<Perf>,
    pub puzzle: Option<Perf>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Perf {
    pub rating: i32,
    pub rd: Option<i32>,
    pub prog: Option<i32>,
}

impl Perf {
    fn into_rating(self) -> Rating {
        Rating {
            deviation: self.rd,
            progress: self.prog,
            ..Rating::current(self.rating)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LichessCount {
    pub followers: Option<u32>,
}
