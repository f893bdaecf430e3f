// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Versioned response cache with pluggable backing stores.
//!
//! A [`Cache`] consults its stores in order (fastest first). A hit in a later
//! store is promoted into the earlier ones. Entries written under another
//! cache version, or older than the TTL for the requested [`CacheKind`], are
//! removed and treated as misses.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Selects the TTL applied to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    /// Profile and rating data
    Profile,
    /// Activity for the year still in progress
    CurrentYear,
    /// Activity for a closed year; never expires
    StaticYear,
}

impl CacheKind {
    pub fn for_year(year: i32, current_year: i32) -> Self {
        if year >= current_year {
            CacheKind::CurrentYear
        } else {
            CacheKind::StaticYear
        }
    }
}

/// TTLs and version for cache entries.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub version: String,
    pub profile_ttl: Duration,
    pub current_year_ttl: Duration,
}

impl CachePolicy {
    fn ttl(&self, kind: CacheKind) -> Option<Duration> {
        match kind {
            CacheKind::Profile => Some(self.profile_ttl),
            CacheKind::CurrentYear => Some(self.current_year_ttl),
            CacheKind::StaticYear => None,
        }
    }

    fn is_valid(&self, entry: &CacheEntry, kind: CacheKind, now_ms: i64) -> bool {
        if entry.version != self.version {
            return false;
        }
        match self.ttl(kind) {
            Some(ttl) => now_ms.saturating_sub(entry.timestamp) < ttl.as_millis() as i64,
            None => true,
        }
    }
}

/// A stored value with its write time (epoch ms) and cache version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    pub timestamp: i64,
    pub version: String,
}

/// A key-value backing store for cache entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short name for log messages.
    fn name(&self) -> &'static str;
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>>;
    async fn store(&self, key: &str, entry: &CacheEntry) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Entry bound for a [`MemoryStore`] built with [`MemoryStore::new`].
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// In-process store holding at most `max_entries` entries. Once full, the
/// entries with the oldest write time are evicted first.
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    fn evict_oldest(&self) {
        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|e| e.value().timestamp)
                .map(|e| e.key().clone());
            let Some(key) = oldest else {
                break;
            };
            self.entries.remove(&key);
            tracing::debug!(key = %key, "Evicted oldest memory cache entry");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.get(key).map(|e| e.value().clone()))
    }

    async fn store(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.entries.insert(key.to_string(), entry.clone());
        self.evict_oldest();
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Persistent store keeping one JSON file per key in a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

#[async_trait]
impl CacheStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let raw = match tokio::fs::read(self.path_for(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Cache(format!("read {}: {}", key, e))),
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| AppError::Cache(format!("decode {}: {}", key, e)))
    }

    async fn store(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let raw = serde_json::to_vec(entry)
            .map_err(|e| AppError::Cache(format!("encode {}: {}", key, e)))?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Cache(format!("create {}: {}", self.dir.display(), e)))?;
        tokio::fs::write(self.path_for(key), raw)
            .await
            .map_err(|e| AppError::Cache(format!("write {}: {}", key, e)))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Cache(format!("remove {}: {}", key, e))),
        }
    }
}

/// Cache front end shared by all request handlers.
///
/// Store failures are logged and treated as misses; the cache never fails a
/// request.
#[derive(Clone)]
pub struct Cache {
    stores: Vec<Arc<dyn CacheStore>>,
    policy: CachePolicy,
}

impl Cache {
    pub fn new(policy: CachePolicy, stores: Vec<Arc<dyn CacheStore>>) -> Self {
        Self { stores, policy }
    }

    /// Cache backed by a single in-memory store.
    pub fn in_memory(policy: CachePolicy) -> Self {
        let memory: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        Self::new(policy, vec![memory])
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str, kind: CacheKind) -> Option<T> {
        self.get_at(key, kind, chrono::Utc::now().timestamp_millis())
            .await
    }

    async fn get_at<T: DeserializeOwned>(
        &self,
        key: &str,
        kind: CacheKind,
        now_ms: i64,
    ) -> Option<T> {
        for (tier, store) in self.stores.iter().enumerate() {
            let entry = match store.load(key).await {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(store = store.name(), key, error = %e, "Cache read failed");
                    continue;
                }
            };

            if !self.policy.is_valid(&entry, kind, now_ms) {
                tracing::debug!(store = store.name(), key, "Discarding stale cache entry");
                self.remove_from(store.as_ref(), key).await;
                continue;
            }

            let value = match serde_json::from_value(entry.data.clone()) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        store = store.name(),
                        key,
                        error = %e,
                        "Discarding undecodable cache entry"
                    );
                    self.remove_from(store.as_ref(), key).await;
                    continue;
                }
            };

            for faster in &self.stores[..tier] {
                if let Err(e) = faster.store(key, &entry).await {
                    tracing::warn!(
                        store = faster.name(),
                        key,
                        error = %e,
                        "Cache promotion failed"
                    );
                }
            }

            tracing::debug!(store = store.name(), key, ?kind, "Cache hit");
            return Some(value);
        }

        None
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, kind: CacheKind) {
        self.set_at(key, value, kind, chrono::Utc::now().timestamp_millis())
            .await
    }

    async fn set_at<T: Serialize>(&self, key: &str, value: &T, kind: CacheKind, now_ms: i64) {
        let data = match serde_json::to_value(value) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        let entry = CacheEntry {
            data,
            timestamp: now_ms,
            version: self.policy.version.clone(),
        };

        for store in &self.stores {
            if let Err(e) = store.store(key, &entry).await {
                tracing::warn!(store = store.name(), key, error = %e, "Cache write failed");
            }
        }
        tracing::debug!(key, ?kind, "Cache set");
    }

    async fn remove_from(&self, store: &dyn CacheStore, key: &str) {
        if let Err(e) = store.remove(key).await {
            tracing::warn!(store = store.name(), key, error = %e, "Cache remove failed");
        }
    }
}

/// Key for one year of merged activity.
pub fn activity_key(accounts_key: &str, year: i32) -> String {
    format!("data:{}:{}", accounts_key, year)
}

/// Key for a combined profile.
pub fn profile_key(accounts_key: &str) -> String {
    format!("profile:{}", accounts_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(version: &str) -> CachePolicy {
        CachePolicy {
            version: version.to_string(),
            profile_ttl: Duration::from_secs(60),
            current_year_ttl: Duration::from_secs(10),
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("chess-heatmap-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let cache = Cache::in_memory(policy("v1"));
        cache.set("k", &vec![1, 2, 3], CacheKind::Profile).await;

        let hit: Option<Vec<u32>> = cache.get("k", CacheKind::Profile).await;
        assert_eq!(hit, Some(vec![1, 2, 3]));

        let miss: Option<Vec<u32>> = cache.get("other", CacheKind::Profile).await;
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_ttl_depends_on_kind() {
        let cache = Cache::in_memory(policy("v1"));
        cache.set_at("k", &"x", CacheKind::CurrentYear, 0).await;

        // 30s later: expired for current-year data...
        let hit: Option<String> = cache.get_at("k", CacheKind::StaticYear, 30_000).await;
        assert_eq!(hit.as_deref(), Some("x"));

        // ...and removed once it is looked up with the short TTL.
        let expired: Option<String> = cache.get_at("k", CacheKind::CurrentYear, 30_000).await;
        assert_eq!(expired, None);
        let gone: Option<String> = cache.get_at("k", CacheKind::StaticYear, 30_000).await;
        assert_eq!(gone, None);
    }

    #[tokio::test]
    async fn test_version_mismatch_discards_entry() {
        let store = Arc::new(MemoryStore::new());
        let old = Cache::new(policy("v1"), vec![store.clone() as Arc<dyn CacheStore>]);
        old.set("k", &1u32, CacheKind::StaticYear).await;

        let new = Cache::new(policy("v2"), vec![store.clone() as Arc<dyn CacheStore>]);
        let hit: Option<u32> = new.get("k", CacheKind::StaticYear).await;
        assert_eq!(hit, None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_persistent_hit_is_promoted_to_memory() {
        let dir = temp_dir("promote");
        let file: Arc<dyn CacheStore> = Arc::new(FileStore::new(&dir));
        Cache::new(policy("v1"), vec![file.clone()])
            .set("data:a:b:2023", &42u32, CacheKind::StaticYear)
            .await;

        let memory = Arc::new(MemoryStore::new());
        let cache = Cache::new(
            policy("v1"),
            vec![memory.clone() as Arc<dyn CacheStore>, file.clone()],
        );
        let hit: Option<u32> = cache.get("data:a:b:2023", CacheKind::StaticYear).await;

        assert_eq!(hit, Some(42));
        assert_eq!(memory.len(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_memory_store_evicts_oldest_when_full() {
        let memory = Arc::new(MemoryStore::with_capacity(2));
        let cache = Cache::new(policy("v1"), vec![memory.clone() as Arc<dyn CacheStore>]);

        cache.set_at("a", &1u32, CacheKind::StaticYear, 1_000).await;
        cache.set_at("b", &2u32, CacheKind::StaticYear, 2_000).await;
        cache.set_at("c", &3u32, CacheKind::StaticYear, 3_000).await;

        assert_eq!(memory.len(), 2);
        assert_eq!(cache.get::<u32>("a", CacheKind::StaticYear).await, None);
        assert_eq!(cache.get::<u32>("b", CacheKind::StaticYear).await, Some(2));
        assert_eq!(cache.get::<u32>("c", CacheKind::StaticYear).await, Some(3));

        // Rewriting a key refreshes its age
        cache.set_at("b", &4u32, CacheKind::StaticYear, 4_000).await;
        cache.set_at("d", &5u32, CacheKind::StaticYear, 5_000).await;
        assert_eq!(cache.get::<u32>("c", CacheKind::StaticYear).await, None);
        assert_eq!(cache.get::<u32>("b", CacheKind::StaticYear).await, Some(4));
    }

    #[test]
    fn test_kind_for_year() {
        assert_eq!(CacheKind::for_year(2024, 2024), CacheKind::CurrentYear);
        assert_eq!(CacheKind::for_year(2023, 2024), CacheKind::StaticYear);
    }
}
