// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chess-Heatmap: daily chess activity across Chess.com and Lichess
//!
//! This crate provides the backend API that fetches a player's games from
//! both platforms and merges them into a calendar heatmap, profile summary
//! and derived insights.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::ChessDataService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub chess_data: ChessDataService,
}
