// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chess.com public API client.
//!
//! Games are published as monthly archives. A year of activity is the set of
//! that year's archive pages, fetched concurrently; a failed page only drops
//! its own games.

use crate::error::{AppError, Result};
use crate::models::{
    GameRecord, GameResult, Platform, PlatformActivity, PlatformProfile, PlatformRatings,
    ProfileOutcome, Rating, Speed,
};
use crate::services::platform::{check_response_json, transport_error, ChessPlatform};
use crate::time_utils::from_epoch_secs;
use async_trait::async_trait;
use chrono::Datelike;
use futures_util::future::join_all;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.chess.com/pub";

/// Result tokens Chess.com uses for drawn games.
const DRAW_RESULTS: [&str; 6] = [
    "agreed",
    "repetition",
    "stalemate",
    "insufficient",
    "timevsinsufficient",
    "50move",
];

/// Chess.com API client.
#[derive(Clone)]
pub struct ChessComClient {
    http: reqwest::Client,
    base_url: String,
}

impl ChessComClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// List the user's monthly archive URLs, oldest first.
    pub async fn list_archives(&self, username: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/player/{}/games/archives",
            self.base_url,
            urlencoding::encode(&username.to_lowercase())
        );
        let list: ArchiveList = self.get_json(&url).await?;
        Ok(list.archives)
    }

    /// Fetch one archive page as raw game records.
    pub async fn get_archive(&self, url: &str) -> Result<Vec<serde_json::Value>> {
        let page: ArchivePage = self.get_json(url).await?;
        Ok(page.games)
    }

    pub async fn get_player(&self, username: &str) -> Result<ChessComPlayer> {
        let url = format!(
            "{}/player/{}",
            self.base_url,
            urlencoding::encode(&username.to_lowercase())
        );
        self.get_json(&url).await
    }

    pub async fn get_stats(&self, username: &str) -> Result<ChessComStats> {
        let url = format!(
            "{}/player/{}/stats",
            self.base_url,
            urlencoding::encode(&username.to_lowercase())
        );
        self.get_json(&url).await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(Platform::Chesscom, e))?;

        check_response_json(Platform::Chesscom, response).await
    }
}

#[async_trait]
impl ChessPlatform for ChessComClient {
    fn platform(&self) -> Platform {
        Platform::Chesscom
    }

    async fn try_fetch_games(&self, username: &str, year: i32) -> Result<PlatformActivity> {
        let archives = match self.list_archives(username).await {
            Ok(archives) => archives,
            Err(e) if e.is_not_found() => {
                tracing::info!(username, "Chess.com account not found");
                return Ok(PlatformActivity::default());
            }
            Err(e) => return Err(e),
        };

        let year_archives = archives_for_year(&archives, year);
        tracing::debug!(
            username,
            year,
            pages = year_archives.len(),
            "Fetching Chess.com archives"
        );

        // Each page resolves to its own Result so one failure cannot sink the batch.
        let pages = join_all(
            year_archives
                .iter()
                .map(|url| async move { (*url, self.get_archive(url).await) }),
        )
        .await;

        let mut activity = PlatformActivity::default();
        let mut failed_pages = 0;
        for (url, page) in pages {
            match page {
                Ok(games) => {
                    let skipped = tally_archive(&mut activity, games, username, year);
                    if skipped > 0 {
                        tracing::debug!(url, skipped, "Skipped malformed Chess.com games");
                    }
                }
                Err(e) => {
                    failed_pages += 1;
                    tracing::warn!(url, error = %e, "Skipping Chess.com archive page");
                }
            }
        }

        if failed_pages > 0 && failed_pages == year_archives.len() {
            return Err(AppError::Upstream(format!(
                "all {} Chess.com archive pages failed",
                failed_pages
            )));
        }
        activity.partial = failed_pages > 0;

        tracing::info!(
            username,
            year,
            games = activity.total,
            failed_pages,
            "Chess.com games fetched"
        );
        Ok(activity)
    }

    async fn fetch_profile(&self, username: &str) -> ProfileOutcome {
        let (player, stats) = tokio::join!(self.get_player(username), self.get_stats(username));

        match (player, stats) {
            (Ok(player), Ok(stats)) => profile_outcome(player, stats),
            (Err(e), _) if e.is_not_found() => ProfileOutcome::Failed("User not found".to_string()),
            (Err(AppError::InvalidData(msg)), _) | (_, Err(AppError::InvalidData(msg))) => {
                tracing::warn!(username, error = %msg, "Unparseable Chess.com profile");
                ProfileOutcome::Failed("Invalid profile data".to_string())
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(username, error = %e, "Chess.com profile unavailable");
                ProfileOutcome::Unavailable
            }
        }
    }
}

/// Archive URLs belonging to `year` (e.g. `.../games/2024/03`).
pub fn archives_for_year(archives: &[String], year: i32) -> Vec<&str> {
    let marker = format!("/{}/", year);
    archives
        .iter()
        .filter(|url| url.contains(&marker))
        .map(String::as_str)
        .collect()
}

/// Tally one archive page into `activity`, returning how many records were
/// malformed and skipped.
pub fn tally_archive(
    activity: &mut PlatformActivity,
    games: Vec<serde_json::Value>,
    username: &str,
    year: i32,
) -> usize {
    let username = username.to_lowercase();
    let mut skipped = 0;

    for raw in games {
        match serde_json::from_value::<ChessComGame>(raw) {
            Ok(game) => {
                if let Some(record) = classify_game(&game, &username, year) {
                    activity.record(&record);
                }
            }
            Err(_) => skipped += 1,
        }
    }

    skipped
}

/// Classify a game for `username` (lowercase). Returns `None` for games
/// outside `year` or with an unrepresentable timestamp.
pub fn classify_game(game: &ChessComGame, username: &str, year: i32) -> Option<GameRecord> {
    let ended = from_epoch_secs(game.end_time)?;
    if ended.year() != year {
        return None;
    }

    let side = if game.white.username.to_lowercase() == username {
        &game.white
    } else {
        &game.black
    };

    Some(GameRecord {
        date: ended.date_naive(),
        speed: classify_speed(game.time_class.as_deref()),
        result: classify_result(side.result.as_deref()),
    })
}

fn classify_speed(time_class: Option<&str>) -> Speed {
    match time_class {
        Some("bullet") => Speed::Bullet,
        Some("blitz") => Speed::Blitz,
        Some("rapid") => Speed::Rapid,
        Some("classical") => Speed::Classical,
        Some("daily") => Speed::Daily,
        _ => Speed::Other,
    }
}

fn classify_result(token: Option<&str>) -> GameResult {
    match token {
        None | Some("") => GameResult::Other,
        Some("win") => GameResult::Win,
        Some(t) if DRAW_RESULTS.contains(&t) => GameResult::Draw,
        Some(_) => GameResult::Loss,
    }
}

fn profile_outcome(player: ChessComPlayer, stats: ChessComStats) -> ProfileOutcome {
    let warning = match player.status.as_deref() {
        Some("closed:fair_play_violations") => Some("Account banned for fair play".to_string()),
        Some("closed") => Some("Account closed".to_string()),
        _ => None,
    };

    // "https://api.chess.com/pub/country/US" -> "US"
    let country = player
        .country
        .as_deref()
        .and_then(|c| c.rsplit('/').next())
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let profile = PlatformProfile {
        username: player.username,
        platform: Platform::Chesscom,
        url: player.url,
        avatar: player.avatar,
        title: player.title,
        country,
        joined_date: player.joined.map(|s| s * 1000),
        last_online: player.last_online.map(|s| s * 1000),
        followers: player.followers,
        is_streamer: player.is_streamer,
    };

    let ratings = PlatformRatings {
        bullet: stats.chess_bullet.map(StatEntry::into_rating),
        blitz: stats.chess_blitz.map(StatEntry::into_rating),
        rapid: stats.chess_rapid.map(StatEntry::into_rating),
        classical: None,
        daily: stats.chess_daily.map(StatEntry::into_rating),
        puzzle: stats
            .tactics
            .and_then(|t| t.highest)
            .map(|r| Rating::current(r.rating)),
    };

    ProfileOutcome::Found {
        profile,
        ratings,
        warning,
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveList {
    archives: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArchivePage {
    games: Vec<serde_json::Value>,
}

/// A game record from a monthly archive.
#[derive(Debug, Clone, Deserialize)]
pub struct ChessComGame {
    /// Epoch seconds
    pub end_time: i64,
    pub time_class: Option<String>,
    pub white: ChessComSide,
    pub black: ChessComSide,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChessComSide {
    pub username: String,
    pub result: Option<String>,
}

/// Player profile response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChessComPlayer {
    pub username: String,
    pub url: String,
    pub avatar: Option<String>,
    pub title: Option<String>,
    /// Country resource URL
    pub country: Option<String>,
    /// Epoch seconds
    pub joined: Option<i64>,
    /// Epoch seconds
    pub last_online: Option<i64>,
    pub followers: Option<u32>,
    pub is_streamer: Option<bool>,
    pub status: Option<String>,
}

/// Player stats response (only the fields used here).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChessComStats {
    pub chess_bullet: Option<StatEntry>,
    pub chess_blitz: Option<StatEntry>,
    pub chess_rapid: Option<StatEntry>,
    pub chess_daily: Option<StatEntry>,
    pub tactics: Option<TacticsEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatEntry {
    pub last: RatingValue,
    pub best: Option<RatingValue>,
}

impl StatEntry {
    fn into_rating(self) -> Rating {
        Rating {
            peak: self.best.map(|b| b.rating),
            ..Rating::current(self.last.rating)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TacticsEntry {
    pub highest: Option<RatingValue>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RatingValue {
    pub rating: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn game(
        end_time: i64,
        time_class: &str,
        white: (&str, &str),
        black: (&str, &str),
    ) -> serde_json::Value {
        json!({
            "end_time": end_time,
            "time_class": time_class,
            "white": { "username": white.0, "result": white.1 },
            "black": { "username": black.0, "result": black.1 },
        })
    }

    // 2024-03-10T12:00:00Z
    const MARCH_10: i64 = 1_710_072_000;

    #[test]
    fn test_archives_for_year() {
        let archives = vec![
            "https://api.chess.com/pub/player/a/games/2023/12".to_string(),
            "https://api.chess.com/pub/player/a/games/2024/01".to_string(),
            "https://api.chess.com/pub/player/a/games/2024/02".to_string(),
        ];
        let selected = archives_for_year(&archives, 2024);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|u| u.contains("/2024/")));
    }

    #[test]
    fn test_result_from_users_side_case_insensitive() {
        let mut activity = PlatformActivity::default();
        let games = vec![
            game(MARCH_10, "blitz", ("Hikaru", "win"), ("other", "checkmated")),
            game(MARCH_10, "bullet", ("other", "win"), ("HIKARU", "resigned")),
            game(MARCH_10, "rapid", ("hikaru", "repetition"), ("other", "repetition")),
            game(MARCH_10, "daily", ("other", "timeout"), ("hikaru", "win")),
        ];

        let skipped = tally_archive(&mut activity, games, "Hikaru", 2024);

        assert_eq!(skipped, 0);
        assert_eq!(activity.total, 4);
        assert_eq!(activity.breakdown.result.win, 2);
        assert_eq!(activity.breakdown.result.loss, 1);
        assert_eq!(activity.breakdown.result.draw, 1);
        assert_eq!(activity.breakdown.speed.daily, 1);
        assert_eq!(
            activity.counts.get(&"2024-03-10".parse::<chrono::NaiveDate>().unwrap()),
            Some(&4)
        );
    }

    #[test]
    fn test_unknown_time_class_and_missing_result_are_other() {
        let mut activity = PlatformActivity::default();
        let games = vec![json!({
            "end_time": MARCH_10,
            "white": { "username": "hikaru" },
            "black": { "username": "other", "result": "win" },
        })];

        tally_archive(&mut activity, games, "hikaru", 2024);

        assert_eq!(activity.breakdown.speed.other, 1);
        assert_eq!(activity.breakdown.result.other, 1);
        assert_eq!(activity.breakdown.speed.total(), activity.breakdown.result.total());
    }

    #[test]
    fn test_malformed_game_is_skipped_not_fatal() {
        let mut activity = PlatformActivity::default();
        let games = vec![
            game(MARCH_10, "blitz", ("hikaru", "win"), ("x", "lose")),
            json!({ "end_time": "yesterday" }),
            game(MARCH_10, "blitz", ("hikaru", "agreed"), ("x", "agreed")),
        ];

        let skipped = tally_archive(&mut activity, games, "hikaru", 2024);

        assert_eq!(skipped, 1);
        assert_eq!(activity.total, 2);
    }

    #[test]
    fn test_games_outside_target_year_are_ignored() {
        let mut activity = PlatformActivity::default();
        // 2023-12-31T23:30:00Z, listed in a January archive
        let games = vec![game(1_704_065_400, "blitz", ("hikaru", "win"), ("x", "lose"))];

        tally_archive(&mut activity, games, "hikaru", 2024);

        assert!(activity.is_empty());
    }

    #[test]
    fn test_profile_outcome_normalizes_fields() {
        let player: ChessComPlayer = serde_json::from_value(json!({
            "username": "Hikaru",
            "url": "https://www.chess.com/member/Hikaru",
            "country": "https://api.chess.com/pub/country/US",
            "joined": 1_389_043_258,
            "status": "closed:fair_play_violations",
        }))
        .unwrap();
        let stats: ChessComStats = serde_json::from_value(json!({
            "chess_blitz": { "last": { "rating": 3200 }, "best": { "rating": 3300 } },
            "tactics": { "highest": { "rating": 3500 } },
        }))
        .unwrap();

        let ProfileOutcome::Found {
            profile,
            ratings,
            warning,
        } = profile_outcome(player, stats)
        else {
            panic!("expected a profile");
        };

        assert_eq!(profile.country.as_deref(), Some("US"));
        assert_eq!(profile.joined_date, Some(1_389_043_258_000));
        assert_eq!(warning.as_deref(), Some("Account banned for fair play"));
        assert_eq!(ratings.blitz.map(|r| (r.rating, r.peak)), Some((3200, Some(3300))));
        assert_eq!(ratings.puzzle.map(|r| r.rating), Some(3500));
        assert!(ratings.bullet.is_none());
    }
}
