// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Combining per-platform profile outcomes.

use crate::models::{
    BestRating, CombinedProfile, PerPlatform, Platform, PlatformRatings, PlatformStatus,
    ProfileOutcome, RatingCategory,
};
use std::collections::BTreeMap;

/// Merge profile outcomes. `None` means the platform was not requested.
pub fn combine_profiles(
    chesscom: Option<ProfileOutcome>,
    lichess: Option<ProfileOutcome>,
) -> CombinedProfile {
    let mut combined = CombinedProfile::default();
    let mut errors = PerPlatform::default();

    for (platform, outcome) in [(Platform::Chesscom, chesscom), (Platform::Lichess, lichess)] {
        let Some(outcome) = outcome else {
            continue;
        };

        let status = match outcome {
            ProfileOutcome::Found {
                profile,
                ratings,
                warning,
            } => {
                match platform {
                    Platform::Chesscom => combined.chesscom = Some(profile),
                    Platform::Lichess => combined.lichess = Some(profile),
                }
                combined.ratings.set(platform, ratings);
                match warning {
                    Some(message) => {
                        errors.set(platform, message);
                        PlatformStatus::Warning
                    }
                    None => PlatformStatus::Ok,
                }
            }
            ProfileOutcome::Failed(message) => {
                errors.set(platform, message);
                PlatformStatus::Error
            }
            ProfileOutcome::Unavailable => PlatformStatus::Unavailable,
        };
        combined.status.set(platform, status);
    }

    combined.best_ratings = best_ratings(&combined.ratings);
    if !errors.is_empty() {
        combined.errors = Some(errors);
    }

    combined
}

/// Highest current rating per category. Equal ratings go to Chess.com.
pub fn best_ratings(ratings: &PerPlatform<PlatformRatings>) -> BTreeMap<String, BestRating> {
    let mut best = BTreeMap::new();

    for category in RatingCategory::ALL {
        let chesscom = ratings.chesscom.as_ref().and_then(|r| r.get(category));
        let lichess = ratings.lichess.as_ref().and_then(|r| r.get(category));

        let pick = match (chesscom, lichess) {
            (Some(c), Some(l)) if l.rating > c.rating => Some((Platform::Lichess, l)),
            (Some(c), _) => Some((Platform::Chesscom, c)),
            (None, Some(l)) => Some((Platform::Lichess, l)),
            (None, None) => None,
        };

        if let Some((platform, rating)) = pick {
            best.insert(
                category.as_str().to_string(),
                BestRating {
                    platform,
                    rating: rating.rating,
                },
            );
        }
    }

    best
}
