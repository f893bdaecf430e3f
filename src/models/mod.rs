// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod heatmap;
pub mod insights;
pub mod platform;
pub mod profile;

pub use account::Accounts;
pub use heatmap::{
    DailyStat, GameBreakdown, GameRecord, GameResult, HeatmapData, History, HistorySummary,
    PlatformActivity, ResultCounts, Speed, SpeedCounts, NO_ACTIVE_DAY,
};
pub use insights::{Insights, Trend};
pub use platform::Platform;
pub use profile::{
    BestRating, CombinedProfile, PerPlatform, PlatformProfile, PlatformRatings, PlatformStatus,
    ProfileOutcome, Rating, RatingCategory,
};
