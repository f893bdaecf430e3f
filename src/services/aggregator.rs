// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Merging per-platform activity into heatmap statistics.

use crate::models::{
    DailyStat, HeatmapData, HistorySummary, Platform, PlatformActivity, NO_ACTIVE_DAY,
};
use crate::time_utils::midnight_millis;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Two active dates at most this far apart (as UTC-midnight epoch ms)
/// continue a streak. 26 hours.
pub const STREAK_TOLERANCE_MS: i64 = 93_600_000;

/// Reported when games exist but no single day could be picked.
const FALLBACK_ACTIVE_DAY: &str = "Today";

/// Tracks consecutive-day streaks over ascending timestamps.
#[derive(Debug, Default)]
pub struct StreakTracker {
    previous: Option<i64>,
    current: u32,
    best: u32,
}

impl StreakTracker {
    /// Observe the next active day, given as epoch ms at UTC midnight.
    pub fn observe(&mut self, millis: i64) {
        self.current = match self.previous {
            Some(prev) if millis - prev <= STREAK_TOLERANCE_MS => self.current + 1,
            _ => 1,
        };
        self.best = self.best.max(self.current);
        self.previous = Some(millis);
    }

    pub fn best(&self) -> u32 {
        self.best
    }
}

/// Merge up to two platforms' activity for one year.
pub fn merge(
    chesscom: Option<&PlatformActivity>,
    lichess: Option<&PlatformActivity>,
) -> HeatmapData {
    let mut data = HeatmapData::default();

    for (platform, activity) in [(Platform::Chesscom, chesscom), (Platform::Lichess, lichess)] {
        let Some(activity) = activity else {
            continue;
        };
        for (date, &count) in &activity.counts {
            data.daily_counts.entry(*date).or_default().add(platform, count);
        }
        match platform {
            Platform::Chesscom => data.chesscom_total += activity.total,
            Platform::Lichess => data.lichess_total += activity.total,
        }
        data.breakdown.add(&activity.breakdown);
    }

    let mut streak = StreakTracker::default();
    let mut busiest: Option<(NaiveDate, u32)> = None;

    for (date, stat) in &data.daily_counts {
        if stat.total == 0 {
            continue;
        }
        data.total_games += stat.total;
        if busiest.map_or(true, |(_, max)| stat.total > max) {
            busiest = Some((*date, stat.total));
        }
        streak.observe(midnight_millis(*date));
    }

    let has_games = data.total_games > 0;
    data.best_streak = match streak.best() {
        0 if has_games => 1,
        best => best,
    };
    data.active_day = match busiest {
        Some((date, _)) => format_active_day(date),
        None if has_games => FALLBACK_ACTIVE_DAY.to_string(),
        None => NO_ACTIVE_DAY.to_string(),
    };

    data
}

/// Format a date as it is shown for the most active day, e.g. "Jan 5".
pub fn format_active_day(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Combine per-year heatmaps into all-time totals.
pub fn summarize_history(per_year: &BTreeMap<String, HeatmapData>) -> HistorySummary {
    let mut summary = HistorySummary {
        total_games: 0,
        chesscom_total: 0,
        lichess_total: 0,
        best_streak: 0,
        active_day: NO_ACTIVE_DAY.to_string(),
        active_days: 0,
        breakdown: Default::default(),
    };
    let mut busiest: Option<(NaiveDate, u32)> = None;

    // Year keys are four-digit strings, so map order is chronological and
    // the earliest date wins ties.
    for data in per_year.values() {
        summary.total_games += data.total_games;
        summary.chesscom_total += data.chesscom_total;
        summary.lichess_total += data.lichess_total;
        summary.best_streak = summary.best_streak.max(data.best_streak);
        summary.breakdown.add(&data.breakdown);

        for (date, DailyStat { total, .. }) in &data.daily_counts {
            if *total == 0 {
                continue;
            }
            summary.active_days += 1;
            if busiest.map_or(true, |(_, max)| *total > max) {
                busiest = Some((*date, *total));
            }
        }
    }

    if let Some((date, _)) = busiest {
        summary.active_day = date.format("%b %-d, %Y").to_string();
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameRecord, GameResult, Speed};

    fn activity(games: &[(&str, Speed, GameResult)]) -> PlatformActivity {
        let mut activity = PlatformActivity::default();
        for (date, speed, result) in games {
            activity.record(&GameRecord {
                date: date.parse().unwrap(),
                speed: *speed,
                result: *result,
            });
        }
        activity
    }

    fn on_dates(dates: &[&str]) -> PlatformActivity {
        let games: Vec<_> = dates
            .iter()
            .map(|d| (*d, Speed::Blitz, GameResult::Win))
            .collect();
        activity(&games)
    }

    #[test]
    fn test_merge_sums_platforms_per_date() {
        let chesscom = activity(&[
            ("2024-01-01", Speed::Blitz, GameResult::Win),
            ("2024-01-01", Speed::Bullet, GameResult::Loss),
            ("2024-01-03", Speed::Daily, GameResult::Draw),
        ]);
        let lichess = activity(&[
            ("2024-01-01", Speed::Rapid, GameResult::Win),
            ("2024-01-02", Speed::Other, GameResult::Other),
        ]);

        let data = merge(Some(&chesscom), Some(&lichess));

        assert_eq!(data.total_games, 5);
        assert_eq!(data.chesscom_total, 3);
        assert_eq!(data.lichess_total, 2);
        for stat in data.daily_counts.values() {
            assert_eq!(stat.total, stat.chesscom + stat.lichess);
        }
        let day_sum: u32 = data.daily_counts.values().map(|s| s.total).sum();
        assert_eq!(day_sum, data.total_games);
        assert_eq!(data.total_games, data.chesscom_total + data.lichess_total);
        assert_eq!(data.breakdown.speed.total(), data.total_games);
        assert_eq!(data.breakdown.result.total(), data.total_games);
        assert_eq!(data.best_streak, 3);
        assert_eq!(data.active_day, "Jan 1");
    }

    #[test]
    fn test_streak_resets_on_gap() {
        let data = merge(Some(&on_dates(&["2024-01-01", "2024-01-02", "2024-01-04"])), None);
        assert_eq!(data.best_streak, 2);
    }

    #[test]
    fn test_streak_spans_year_boundary_inside_data() {
        let data = merge(None, Some(&on_dates(&["2023-12-31", "2024-01-01", "2024-01-02"])));
        assert_eq!(data.best_streak, 3);
    }

    #[test]
    fn test_timestamps_within_tolerance_are_consecutive() {
        let mut streak = StreakTracker::default();
        streak.observe(0);
        streak.observe(23 * 3_600_000);
        assert_eq!(streak.best(), 2);

        streak.observe(23 * 3_600_000 + STREAK_TOLERANCE_MS + 1);
        assert_eq!(streak.best(), 2);
    }

    #[test]
    fn test_active_day_tie_goes_to_earliest() {
        let data = merge(
            Some(&on_dates(&["2024-03-09", "2024-03-09", "2024-02-14"])),
            Some(&on_dates(&["2024-02-14"])),
        );
        assert_eq!(data.active_day, "Feb 14");
    }

    #[test]
    fn test_empty_merge() {
        let data = merge(None, None);
        assert_eq!(data.total_games, 0);
        assert_eq!(data.best_streak, 0);
        assert_eq!(data.active_day, NO_ACTIVE_DAY);
        assert!(data.daily_counts.is_empty());
    }

    #[test]
    fn test_history_summary() {
        let mut per_year = BTreeMap::new();
        per_year.insert(
            "2023".to_string(),
            merge(Some(&on_dates(&["2023-05-01", "2023-05-01", "2023-05-02"])), None),
        );
        per_year.insert(
            "2024".to_string(),
            merge(None, Some(&on_dates(&["2024-07-04", "2024-07-04", "2024-07-05"]))),
        );
        per_year.insert("2025".to_string(), merge(None, None));

        let summary = summarize_history(&per_year);

        assert_eq!(summary.total_games, 6);
        assert_eq!(summary.chesscom_total, 3);
        assert_eq!(summary.lichess_total, 3);
        assert_eq!(summary.best_streak, 2);
        assert_eq!(summary.active_days, 4);
        assert_eq!(summary.active_day, "May 1, 2023");
        assert_eq!(summary.breakdown.games(), 6);
    }

    #[test]
    fn test_empty_history_summary() {
        let summary = summarize_history(&BTreeMap::new());
        assert_eq!(summary.total_games, 0);
        assert_eq!(summary.active_day, NO_ACTIVE_DAY);
    }
}
