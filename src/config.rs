//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::services::cache::CachePolicy;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Chess.com public API base URL
    pub chesscom_api_url: String,
    /// Lichess base URL
    pub lichess_api_url: String,
    /// User-Agent sent to both platforms
    pub user_agent: String,

    // --- Cache ---
    /// Entries written under a different version are discarded
    pub cache_version: String,
    /// Directory for the persistent cache tier (memory only when unset)
    pub cache_dir: Option<PathBuf>,
    pub cache_profile_ttl: Duration,
    pub cache_current_year_ttl: Duration,
    /// Bound on the in-memory tier; oldest entries are evicted first
    pub cache_max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            chesscom_api_url: crate::services::chesscom::DEFAULT_BASE_URL.to_string(),
            lichess_api_url: crate::services::lichess::DEFAULT_BASE_URL.to_string(),
            user_agent: "ChessHeatmap/1.0".to_string(),
            cache_version: "chessheat_v1".to_string(),
            cache_dir: None,
            cache_profile_ttl: Duration::from_secs(24 * 60 * 60),
            cache_current_year_ttl: Duration::from_secs(15 * 60),
            cache_max_entries: crate::services::cache::DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every setting has a default, so an empty environment yields a working
    /// configuration that talks to the public Chess.com and Lichess APIs.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            chesscom_api_url: env::var("CHESSCOM_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.chesscom_api_url),
            lichess_api_url: env::var("LICHESS_API_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.lichess_api_url),
            user_agent: env::var("USER_AGENT").unwrap_or(defaults.user_agent),
            cache_version: env::var("CACHE_VERSION").unwrap_or(defaults.cache_version),
            cache_dir: env::var("CACHE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            cache_profile_ttl: parse_var("CACHE_PROFILE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_profile_ttl),
            cache_current_year_ttl: parse_var("CACHE_CURRENT_YEAR_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_current_year_ttl),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES")?
                .unwrap_or(defaults.cache_max_entries),
        })
    }

    /// Configuration for tests: defaults, memory-only cache.
    pub fn test_default() -> Self {
        Self::default()
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            version: self.cache_version.clone(),
            profile_ttl: self.cache_profile_ttl,
            current_year_ttl: self.cache_current_year_ttl,
        }
    }
}

/// Read and parse an optional environment variable.
fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
