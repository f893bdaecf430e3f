// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Selectable year range derived from account join dates.

use crate::models::PerPlatform;
use crate::time_utils::from_epoch_millis;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Years that can be displayed for a paired account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct YearRange {
    /// Most recent first
    pub years: Vec<String>,
    pub earliest_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chesscom_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lichess_year: Option<i32>,
}

/// Years from `current` down to `join`, inclusive.
///
/// A join year in the future is clamped to `current`, so the result always
/// holds at least one year.
pub fn year_range(join: i32, current: i32) -> Vec<String> {
    let earliest = join.min(current);
    (earliest..=current).rev().map(|y| y.to_string()).collect()
}

/// Derive the year range from per-platform join dates (epoch ms).
pub fn join_years(joined: &PerPlatform<i64>, current: i32) -> YearRange {
    let year_of = |ms: Option<i64>| ms.and_then(from_epoch_millis).map(|t| t.year());
    let chesscom_year = year_of(joined.chesscom);
    let lichess_year = year_of(joined.lichess);

    let earliest_year = [chesscom_year, lichess_year]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(current)
        .min(current);

    YearRange {
        years: year_range(earliest_year, current),
        earliest_year,
        chesscom_year,
        lichess_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range() {
        assert_eq!(
            year_range(2019, 2024),
            vec!["2024", "2023", "2022", "2021", "2020", "2019"]
        );
        assert_eq!(year_range(2024, 2024), vec!["2024"]);
    }

    #[test]
    fn test_future_join_year_is_clamped() {
        assert_eq!(year_range(2030, 2024), vec!["2024"]);
    }

    #[test]
    fn test_join_years_picks_earliest() {
        let joined = PerPlatform {
            // 2019-06-15 and 2021-03-01
            chesscom: Some(1_560_556_800_000),
            lichess: Some(1_614_556_800_000),
        };

        let range = join_years(&joined, 2024);

        assert_eq!(range.earliest_year, 2019);
        assert_eq!(range.chesscom_year, Some(2019));
        assert_eq!(range.lichess_year, Some(2021));
        assert_eq!(range.years.len(), 6);
        assert_eq!(range.years.last().map(String::as_str), Some("2019"));
    }

    #[test]
    fn test_join_years_defaults_to_current() {
        let range = join_years(&PerPlatform::default(), 2024);
        assert_eq!(range.earliest_year, 2024);
        assert_eq!(range.years, vec!["2024"]);
    }
}
