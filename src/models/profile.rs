// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Player profile and rating models, normalized across platforms.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Platform;

/// Account identity and metadata for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlatformProfile {
    pub username: String,
    pub platform: Platform,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// ISO country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Account creation time (epoch milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub joined_date: Option<i64>,
    /// Last seen time (epoch milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub last_online: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_streamer: Option<bool>,
}

/// A rating in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Rating {
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak: Option<i32>,
}

impl Rating {
    pub fn current(rating: i32) -> Self {
        Self {
            rating,
            deviation: None,
            progress: None,
            peak: None,
        }
    }
}

/// Rating categories that may be reported by a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingCategory {
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Daily,
    Puzzle,
}

impl RatingCategory {
    pub const ALL: [RatingCategory; 6] = [
        RatingCategory::Bullet,
        RatingCategory::Blitz,
        RatingCategory::Rapid,
        RatingCategory::Classical,
        RatingCategory::Daily,
        RatingCategory::Puzzle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingCategory::Bullet => "bullet",
            RatingCategory::Blitz => "blitz",
            RatingCategory::Rapid => "rapid",
            RatingCategory::Classical => "classical",
            RatingCategory::Daily => "daily",
            RatingCategory::Puzzle => "puzzle",
        }
    }
}

/// Ratings reported by one platform. A missing category means the
/// platform has no rating for it; it is never reported as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlatformRatings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blitz: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rapid: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classical: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<Rating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<Rating>,
}

impl PlatformRatings {
    pub fn get(&self, category: RatingCategory) -> Option<&Rating> {
        match category {
            RatingCategory::Bullet => self.bullet.as_ref(),
            RatingCategory::Blitz => self.blitz.as_ref(),
            RatingCategory::Rapid => self.rapid.as_ref(),
            RatingCategory::Classical => self.classical.as_ref(),
            RatingCategory::Daily => self.daily.as_ref(),
            RatingCategory::Puzzle => self.puzzle.as_ref(),
        }
    }
}

/// Result of fetching one platform's profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileOutcome {
    /// Profile retrieved. `warning` carries a soft error such as a closed
    /// account, alongside data that is still valid.
    Found {
        profile: PlatformProfile,
        ratings: PlatformRatings,
        warning: Option<String>,
    },
    /// Hard failure: the account does not exist or its data is unusable.
    Failed(String),
    /// The platform could not be reached or answered with a server error.
    Unavailable,
}

/// Per-platform state reported alongside a combined profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PlatformStatus {
    Ok,
    Warning,
    Error,
    Unavailable,
}

/// One value per platform; a missing slot was not requested or has no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PerPlatform<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chesscom: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lichess: Option<T>,
}

// Manual impl so `T` need not be `Default`.
impl<T> Default for PerPlatform<T> {
    fn default() -> Self {
        Self {
            chesscom: None,
            lichess: None,
        }
    }
}

impl<T> PerPlatform<T> {
    pub fn get(&self, platform: Platform) -> Option<&T> {
        match platform {
            Platform::Chesscom => self.chesscom.as_ref(),
            Platform::Lichess => self.lichess.as_ref(),
        }
    }

    pub fn set(&mut self, platform: Platform, value: T) {
        match platform {
            Platform::Chesscom => self.chesscom = Some(value),
            Platform::Lichess => self.lichess = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chesscom.is_none() && self.lichess.is_none()
    }
}

/// The higher of the two platforms' ratings in one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BestRating {
    pub platform: Platform,
    pub rating: i32,
}

/// Profiles and ratings for a paired account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CombinedProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chesscom: Option<PlatformProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lichess: Option<PlatformProfile>,
    pub ratings: PerPlatform<PlatformRatings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<PerPlatform<String>>,
    pub status: PerPlatform<PlatformStatus>,
    /// Keyed by category name ("bullet", "blitz", ...)
    pub best_ratings: BTreeMap<String, BestRating>,
}

impl CombinedProfile {
    /// Join dates (epoch ms) of each populated platform profile.
    pub fn joined_dates(&self) -> PerPlatform<i64> {
        PerPlatform {
            chesscom: self.chesscom.as_ref().and_then(|p| p.joined_date),
            lichess: self.lichess.as_ref().and_then(|p| p.joined_date),
        }
    }

    /// True if any requested platform could not be reached.
    pub fn has_unavailable(&self) -> bool {
        [self.status.chesscom, self.status.lichess]
            .contains(&Some(PlatformStatus::Unavailable))
    }
}
