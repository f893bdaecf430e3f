// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - fetching, aggregation and caching.

pub mod aggregator;
pub mod cache;
pub mod chess_data;
pub mod chesscom;
pub mod insights;
pub mod lichess;
pub mod platform;
pub mod profile;
pub mod years;

pub use cache::{Cache, CacheKind, CachePolicy, CacheStore, FileStore, MemoryStore};
pub use chess_data::ChessDataService;
pub use chesscom::ChessComClient;
pub use lichess::LichessClient;
pub use platform::ChessPlatform;
pub use years::YearRange;
