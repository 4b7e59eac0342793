//! Disk-backed TTL cache of parsed result sets.
//!
//! One JSON file per key in a directory that may be shared by several
//! processes. Writes go to a temp file in the same directory and are
//! renamed into place, so readers see either the old entry or the new one.
//! A missing or unreadable file is a miss; expired and corrupt entries are
//! deleted when encountered.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::SearchError;
use crate::query::OpportunitySearchQuery;
use crate::record::OpportunityRecord;

/// One persisted result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub stored_at: DateTime<Utc>,
    pub ttl_secs: u64,
    pub results: Vec<OpportunityRecord>,
    /// The limit the set was cut at, when more upstream records remained.
    /// `None` means the stored set is everything the upstream returned.
    #[serde(default)]
    pub truncated_at: Option<u32>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::seconds(self.ttl_secs.min(i64::MAX as u64) as i64);
        self.stored_at + ttl < now
    }

    /// Whether this entry can answer a request for up to `limit` records.
    pub fn covers(&self, limit: u32) -> bool {
        self.truncated_at.map_or(true, |cut| limit <= cut)
    }
}

/// TTL-bounded result cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    /// A zero `ttl` disables the cache.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Returns the cached results for `key`, or `None` if missing or expired.
    pub fn get(&self, key: &str) -> Option<Vec<OpportunityRecord>> {
        self.get_entry(key).map(|entry| entry.results)
    }

    /// Like [`ResponseCache::get`] but keeps the entry metadata.
    pub fn get_entry(&self, key: &str) -> Option<CacheEntry> {
        if !self.is_enabled() {
            return None;
        }
        let path = self.entry_path(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding corrupt cache entry {}: {}", path.display(), e);
                remove_quietly(&path);
                return None;
            }
        };

        if entry.key != key || entry.is_expired(Utc::now()) {
            tracing::debug!(key, "Evicting stale cache entry");
            remove_quietly(&path);
            return None;
        }

        tracing::debug!(key, count = entry.results.len(), "Cache hit");
        Some(entry)
    }

    /// Stores the complete result set `results` under `key`. A no-op when
    /// the cache is disabled.
    pub fn put(&self, key: &str, results: &[OpportunityRecord]) -> Result<(), SearchError> {
        self.put_limited(key, results, None)
    }

    /// Stores `results` under `key`, recording the limit they were cut at
    /// when the upstream had more.
    pub fn put_limited(
        &self,
        key: &str,
        results: &[OpportunityRecord],
        truncated_at: Option<u32>,
    ) -> Result<(), SearchError> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.write_entry(&CacheEntry {
            key: key.to_string(),
            stored_at: Utc::now(),
            ttl_secs: self.ttl.as_secs().max(1),
            results: results.to_vec(),
            truncated_at,
        })
    }

    fn write_entry(&self, entry: &CacheEntry) -> Result<(), SearchError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            SearchError::Cache(format!("creating {}: {}", self.dir.display(), e))
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(|e| SearchError::Cache(format!("creating temp file: {}", e)))?;
        serde_json::to_writer(&mut tmp, entry)
            .map_err(|e| SearchError::Cache(format!("serializing entry: {}", e)))?;
        tmp.flush()
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SearchError::Cache(format!("writing temp file: {}", e)))?;
        let path = self.entry_path(&entry.key);
        tmp.persist(&path)
            .map_err(|e| SearchError::Cache(format!("renaming into {}: {}", path.display(), e.error)))?;
        Ok(())
    }

    /// Deletes every expired or unreadable entry. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, SearchError> {
        let now = Utc::now();
        self.remove_where(|path| {
            std::fs::read_to_string(path)
                .ok()
                .and_then(|c| serde_json::from_str::<CacheEntry>(&c).ok())
                .map_or(true, |entry| entry.is_expired(now))
        })
    }

    /// Deletes every entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize, SearchError> {
        self.remove_where(|_| true)
    }

    fn remove_where(&self, mut pred: impl FnMut(&Path) -> bool) -> Result<usize, SearchError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(SearchError::Cache(format!(
                    "listing {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };
        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if pred(&path) && std::fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove cache entry {}: {}", path.display(), e);
        }
    }
}

/// Short, non-reversible fingerprint of a credential.
pub fn credential_fingerprint(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.as_bytes());
    hex::encode(&digest[..6])
}

fn hash_key(namespace: &str, parts: &[&str], fingerprint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    for part in parts {
        hasher.update(b"\x1f");
        hasher.update(part.as_bytes());
    }
    hasher.update(b"\x1e");
    hasher.update(fingerprint.as_bytes());
    hex::encode(hasher.finalize())
}

/// Key for a filtered search. Keyword case and whitespace and NAICS order
/// do not affect the key.
pub fn search_key(query: &OpportunitySearchQuery, fingerprint: &str) -> String {
    let keywords = query
        .keywords()
        .map(|k| k.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .unwrap_or_default();
    let mut naics: Vec<&str> = query.naics_codes().iter().map(String::as_str).collect();
    naics.sort_unstable();
    naics.dedup();
    let naics = naics.join(",");
    let days_back = query.days_back().to_string();
    hash_key("search", &[&keywords, &naics, &days_back], fingerprint)
}

/// Key for a direct lookup of `id` of the given kind.
pub fn lookup_key(kind: &str, id: &str, fingerprint: &str) -> String {
    hash_key("lookup", &[kind, &id.to_lowercase()], fingerprint)
}
