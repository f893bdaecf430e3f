// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-day activity and game breakdown models.
//!
//! A fetch for one platform produces a [`PlatformActivity`]; the aggregator
//! merges up to two of them into a [`HeatmapData`] response.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Platform;

/// Sentinel reported as the most active day when there are no games.
pub const NO_ACTIVE_DAY: &str = "N/A";

/// Time-control category of a single game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Daily,
    Other,
}

/// Outcome of a single game from the queried player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
    Other,
}

/// One classified game, ready to be tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRecord {
    /// UTC calendar date the game is bucketed under
    pub date: NaiveDate,
    pub speed: Speed,
    pub result: GameResult,
}

/// Game counts per time-control category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SpeedCounts {
    pub bullet: u32,
    pub blitz: u32,
    pub rapid: u32,
    pub classical: u32,
    pub daily: u32,
    pub other: u32,
}

impl SpeedCounts {
    pub fn record(&mut self, speed: Speed) {
        match speed {
            Speed::Bullet => self.bullet += 1,
            Speed::Blitz => self.blitz += 1,
            Speed::Rapid => self.rapid += 1,
            Speed::Classical => self.classical += 1,
            Speed::Daily => self.daily += 1,
            Speed::Other => self.other += 1,
        }
    }

    pub fn add(&mut self, other: &SpeedCounts) {
        self.bullet += other.bullet;
        self.blitz += other.blitz;
        self.rapid += other.rapid;
        self.classical += other.classical;
        self.daily += other.daily;
        self.other += other.other;
    }

    pub fn total(&self) -> u32 {
        self.bullet + self.blitz + self.rapid + self.classical + self.daily + self.other
    }
}

/// Game counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ResultCounts {
    pub win: u32,
    pub loss: u32,
    pub draw: u32,
    pub other: u32,
}

impl ResultCounts {
    pub fn record(&mut self, result: GameResult) {
        match result {
            GameResult::Win => self.win += 1,
            GameResult::Loss => self.loss += 1,
            GameResult::Draw => self.draw += 1,
            GameResult::Other => self.other += 1,
        }
    }

    pub fn add(&mut self, other: &ResultCounts) {
        self.win += other.win;
        self.loss += other.loss;
        self.draw += other.draw;
        self.other += other.other;
    }

    pub fn total(&self) -> u32 {
        self.win + self.loss + self.draw + self.other
    }
}

/// Speed and result histograms over a set of games.
///
/// Every tallied game lands in exactly one speed bucket and one result
/// bucket, so both histograms always sum to the same number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GameBreakdown {
    pub speed: SpeedCounts,
    pub result: ResultCounts,
}

impl GameBreakdown {
    pub fn record(&mut self, speed: Speed, result: GameResult) {
        self.speed.record(speed);
        self.result.record(result);
    }

    /// Field-wise sum of another breakdown into this one.
    pub fn add(&mut self, other: &GameBreakdown) {
        self.speed.add(&other.speed);
        self.result.add(&other.result);
    }

    pub fn games(&self) -> u32 {
        self.speed.total()
    }
}

/// Games for one platform and one year, bucketed by UTC date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformActivity {
    pub counts: BTreeMap<NaiveDate, u32>,
    pub total: u32,
    pub breakdown: GameBreakdown,
    /// Some pages or stream segments failed; never cached
    #[serde(skip)]
    pub partial: bool,
}

impl PlatformActivity {
    /// Tally one classified game.
    pub fn record(&mut self, game: &GameRecord) {
        *self.counts.entry(game.date).or_insert(0) += 1;
        self.total += 1;
        self.breakdown.record(game.speed, game.result);
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Whether this activity may be cached.
    pub fn is_complete(&self) -> bool {
        !self.partial
    }
}

/// Game counts for a single calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyStat {
    pub chesscom: u32,
    pub lichess: u32,
    pub total: u32,
}

impl DailyStat {
    pub fn add(&mut self, platform: Platform, count: u32) {
        match platform {
            Platform::Chesscom => self.chesscom += count,
            Platform::Lichess => self.lichess += count,
        }
        self.total += count;
    }
}

/// Merged activity for one year across both platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HeatmapData {
    pub total_games: u32,
    pub chesscom_total: u32,
    pub lichess_total: u32,
    /// Keyed by ISO date ("YYYY-MM-DD"), ascending
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "Record<string, DailyStat>")
    )]
    pub daily_counts: BTreeMap<NaiveDate, DailyStat>,
    pub best_streak: u32,
    pub active_day: String,
    pub breakdown: GameBreakdown,
}

impl Default for HeatmapData {
    fn default() -> Self {
        Self {
            total_games: 0,
            chesscom_total: 0,
            lichess_total: 0,
            daily_counts: BTreeMap::new(),
            best_streak: 0,
            active_day: NO_ACTIVE_DAY.to_string(),
            breakdown: GameBreakdown::default(),
        }
    }
}

/// Totals across every year of a player's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HistorySummary {
    pub total_games: u32,
    pub chesscom_total: u32,
    pub lichess_total: u32,
    /// Longest single-year streak
    pub best_streak: u32,
    pub active_day: String,
    pub active_days: u32,
    pub breakdown: GameBreakdown,
}

/// Per-year heatmaps plus an all-time summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct History {
    /// Years covered, most recent first
    pub years: Vec<String>,
    pub per_year: BTreeMap<String, HeatmapData>,
    pub summary: HistorySummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(date: &str, speed: Speed, result: GameResult) -> GameRecord {
        GameRecord {
            date: date.parse().unwrap(),
            speed,
            result,
        }
    }

    #[test]
    fn test_record_updates_counts_and_breakdown() {
        let mut activity = PlatformActivity::default();
        activity.record(&game("2024-03-01", Speed::Blitz, GameResult::Win));
        activity.record(&game("2024-03-01", Speed::Bullet, GameResult::Loss));
        activity.record(&game("2024-03-02", Speed::Other, GameResult::Other));

        assert_eq!(activity.total, 3);
        assert_eq!(activity.counts.get(&"2024-03-01".parse::<NaiveDate>().unwrap()), Some(&2));
        assert_eq!(activity.breakdown.speed.blitz, 1);
        assert_eq!(activity.breakdown.speed.other, 1);
        assert_eq!(activity.breakdown.result.loss, 1);
        assert_eq!(activity.breakdown.speed.total(), activity.breakdown.result.total());
    }

    #[test]
    fn test_breakdown_add_is_fieldwise() {
        let mut a = GameBreakdown::default();
        a.record(Speed::Rapid, GameResult::Draw);
        let mut b = GameBreakdown::default();
        b.record(Speed::Rapid, GameResult::Win);
        b.record(Speed::Daily, GameResult::Win);

        a.add(&b);

        assert_eq!(a.speed.rapid, 2);
        assert_eq!(a.speed.daily, 1);
        assert_eq!(a.result.win, 2);
        assert_eq!(a.result.draw, 1);
        assert_eq!(a.games(), 3);
    }

    #[test]
    fn test_daily_stat_total_tracks_platforms() {
        let mut stat = DailyStat::default();
        stat.add(Platform::Chesscom, 3);
        stat.add(Platform::Lichess, 2);
        assert_eq!(stat.total, stat.chesscom + stat.lichess);
        assert_eq!(stat.total, 5);
    }

    #[test]
    fn test_heatmap_serializes_camel_case_with_iso_dates() {
        let mut data = HeatmapData::default();
        data.daily_counts.insert(
            "2024-01-05".parse().unwrap(),
            DailyStat {
                chesscom: 1,
                lichess: 0,
                total: 1,
            },
        );

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["activeDay"], "N/A");
        assert_eq!(json["dailyCounts"]["2024-01-05"]["total"], 1);
        assert!(json.get("chesscomTotal").is_some());
    }
}
