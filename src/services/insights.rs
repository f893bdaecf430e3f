// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary insights over a merged daily record.

use crate::models::{DailyStat, Insights, Trend};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Derive insights from daily counts. Returns `None` when no day has games.
pub fn derive_insights(daily_counts: &BTreeMap<NaiveDate, DailyStat>) -> Option<Insights> {
    let active: Vec<(NaiveDate, u32)> = daily_counts
        .iter()
        .filter(|(_, stat)| stat.total > 0)
        .map(|(date, stat)| (*date, stat.total))
        .collect();

    if active.is_empty() {
        return None;
    }

    let mut per_weekday = [0u32; 7];
    for (date, total) in &active {
        per_weekday[date.weekday().num_days_from_sunday() as usize] += total;
    }
    // First maximum in Sunday..Saturday order
    let favorite = per_weekday
        .iter()
        .enumerate()
        .fold(0, |best, (idx, &count)| {
            if count > per_weekday[best] {
                idx
            } else {
                best
            }
        });

    let total: u32 = active.iter().map(|(_, t)| t).sum();
    let avg = f64::from(total) / active.len() as f64;

    let longest_gap = active
        .windows(2)
        .map(|w| (w[1].0 - w[0].0).num_days() - 1)
        .max()
        .unwrap_or(0)
        .max(0);

    let (first, second) = active.split_at(active.len() / 2);
    let first: u32 = first.iter().map(|(_, t)| t).sum();
    let second: u32 = second.iter().map(|(_, t)| t).sum();
    let trend = match second.cmp(&first) {
        std::cmp::Ordering::Greater => Trend::Increasing,
        std::cmp::Ordering::Less => Trend::Decreasing,
        std::cmp::Ordering::Equal => Trend::Stable,
    };

    Some(Insights {
        favorite_weekday: WEEKDAYS[favorite].to_string(),
        avg_games_per_active_day: (avg * 10.0).round() / 10.0,
        longest_gap_days: u32::try_from(longest_gap).unwrap_or(u32::MAX),
        trend,
        active_days: active.len() as u32,
    })
}
