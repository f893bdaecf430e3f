// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account pair identifying whose games a request covers.

use crate::error::{AppError, Result};
use crate::models::Platform;

/// Longest username either platform allows (Lichess: 30, Chess.com: 25).
const MAX_USERNAME_LEN: usize = 30;

/// Usernames on one or both platforms. At least one is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accounts {
    pub chesscom: Option<String>,
    pub lichess: Option<String>,
}

impl Accounts {
    /// Build from raw query parameters. Blank values count as absent.
    pub fn new(chesscom: Option<&str>, lichess: Option<&str>) -> Result<Self> {
        let chesscom = normalize_username(chesscom)?;
        let lichess = normalize_username(lichess)?;

        if chesscom.is_none() && lichess.is_none() {
            return Err(AppError::BadRequest(
                "At least one username is required".to_string(),
            ));
        }

        Ok(Self { chesscom, lichess })
    }

    /// Accounts for a single platform.
    pub fn single(platform: Platform, username: Option<&str>) -> Result<Self> {
        let username = normalize_username(username)?
            .ok_or_else(|| AppError::BadRequest("Username is required".to_string()))?;

        Ok(match platform {
            Platform::Chesscom => Self {
                chesscom: Some(username),
                lichess: None,
            },
            Platform::Lichess => Self {
                chesscom: None,
                lichess: Some(username),
            },
        })
    }

    pub fn username(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Chesscom => self.chesscom.as_deref(),
            Platform::Lichess => self.lichess.as_deref(),
        }
    }

    /// Stable cache key fragment, e.g. `"hikaru:drnykterstein"`.
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}",
            self.chesscom.as_deref().unwrap_or("").to_lowercase(),
            self.lichess.as_deref().unwrap_or("").to_lowercase()
        )
    }
}

fn normalize_username(raw: Option<&str>) -> Result<Option<String>> {
    let Some(name) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    if name.len() > MAX_USERNAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::BadRequest(format!(
            "Invalid username '{}'",
            name
        )));
    }

    Ok(Some(name.to_string()))
}
