// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chess-Heatmap API Server
//!
//! Serves daily game activity, profiles and insights for a Chess.com and/or
//! Lichess account pair.

use chess_heatmap::{
    config::Config,
    services::{
        Cache, CacheStore, ChessComClient, ChessDataService, FileStore, LichessClient,
        MemoryStore,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Chess-Heatmap API");

    // One HTTP client shared by both platforms
    let http = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .build()?;

    let chesscom = Arc::new(ChessComClient::new(http.clone(), &config.chesscom_api_url));
    let lichess = Arc::new(LichessClient::new(http, &config.lichess_api_url));

    // Memory tier first, optional file tier behind it
    let memory: Arc<dyn CacheStore> =
        Arc::new(MemoryStore::with_capacity(config.cache_max_entries));
    let mut stores = vec![memory];
    if let Some(dir) = &config.cache_dir {
        tracing::info!(path = %dir.display(), "File cache enabled");
        stores.push(Arc::new(FileStore::new(dir)));
    }
    let cache = Cache::new(config.cache_policy(), stores);
    tracing::info!(
        version = %config.cache_version,
        max_entries = config.cache_max_entries,
        "Cache initialized"
    );

    let chess_data = ChessDataService::new(chesscom, lichess, cache);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        chess_data,
    });

    // Build router
    let app = chess_heatmap::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chess_heatmap=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
