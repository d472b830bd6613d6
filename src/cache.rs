//! Document snapshot cache.
//!
//! After a successful build the finalized document set is stored under a
//! configured key so the query layer can answer lookups without re-parsing
//! the source tree. The snapshot is replaced wholesale on every build; there
//! is no incremental merge.
//!
//! # Stores
//!
//! - [`FileCacheStore`]: one JSON file per key under a cache directory. The
//!   file name is the SHA-256 of the key, so arbitrary keys map to safe
//!   names. Writes go to a temp file first and are renamed into place, which
//!   makes replacing a key atomic for readers.
//! - [`MemoryCacheStore`]: an in-process map, for tests and embedding.
//!
//! An entry that is missing, expired, corrupt, or written by an incompatible
//! format version reads as absent.

use crate::document::Document;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Version of the on-disk entry format. Bump this to invalidate all
/// existing snapshots when the document shape changes.
const CACHE_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value store for document snapshots with a time-to-live.
pub trait CacheStore: Send + Sync {
    /// Snapshot stored under `key`, if present and unexpired at `now`.
    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Document>>;

    /// Replace the snapshot under `key`, expiring `ttl_seconds` after `now`.
    fn put_at(
        &self,
        key: &str,
        documents: &[Document],
        ttl_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError>;

    fn get(&self, key: &str) -> Option<Vec<Document>> {
        self.get_at(key, Utc::now())
    }

    /// Snapshot under `key`, or `default` when absent.
    fn get_or(&self, key: &str, default: Vec<Document>) -> Vec<Document> {
        self.get(key).unwrap_or(default)
    }

    fn put(&self, key: &str, documents: &[Document], ttl_seconds: u64) -> Result<(), CacheError> {
        self.put_at(key, documents, ttl_seconds, Utc::now())
    }
}

fn expiry(now: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    let ttl = i64::try_from(ttl_seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX);
    now.checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// On-disk representation of one key.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    key: String,
    expires_at: DateTime<Utc>,
    documents: Vec<Document>,
}

/// JSON files under a directory, one per key.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hash_key(key)))
    }
}

/// SHA-256 of a cache key, returned as a hex string.
pub fn hash_key(key: &str) -> String {
    format!("{:x}", Sha256::digest(key.as_bytes()))
}

impl CacheStore for FileCacheStore {
    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Document>> {
        let content = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        if entry.version != CACHE_VERSION || entry.key != key || entry.expires_at <= now {
            return None;
        }
        Some(entry.documents)
    }

    fn put_at(
        &self,
        key: &str,
        documents: &[Document],
        ttl_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            version: CACHE_VERSION,
            key: key.to_string(),
            expires_at: expiry(now, ttl_seconds),
            documents: documents.to_vec(),
        };
        let json = serde_json::to_string(&entry)?;

        let path = self.entry_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, (DateTime<Utc>, Vec<Document>)>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<Vec<Document>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|(expires_at, _)| *expires_at > now)
            .map(|(_, documents)| documents.clone())
    }

    fn put_at(
        &self,
        key: &str,
        documents: &[Document],
        ttl_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key.to_string(),
            (expiry(now, ttl_seconds), documents.to_vec()),
        );
        Ok(())
    }
}
