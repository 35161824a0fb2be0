//! Persisted local key/value cache.
//!
//! The admin dashboard keeps its last stats snapshot in a small string map
//! that must survive process restarts (the browser-storage analog of the
//! original shop). Access is synchronous; values are JSON strings the
//! caller encodes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Synchronous persisted key→string map.
pub trait LocalCache: Send + Sync {
    /// Fetch a value, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value.
    fn set(&self, key: &str, value: &str);

    /// Drop a value.
    fn remove(&self, key: &str);
}

/// Non-persisted implementation for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// File-backed implementation: one JSON object per cache file.
///
/// Writes go through a temp file + rename so a crash mid-write leaves the
/// previous cache intact. Write failures are logged and swallowed - the
/// cache is advisory, losing it only costs a re-fetch.
pub struct FileCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileCache {
    /// Open (or create) a cache file.
    ///
    /// A missing file starts empty; a malformed file is discarded with a
    /// warning rather than failing startup.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::load(&path);
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn load(path: &Path) -> HashMap<String, String> {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "discarding malformed cache file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let Ok(raw) = serde_json::to_string(entries) else {
            return;
        };
        let tmp = self.path.with_extension("tmp");
        let result = std::fs::write(&tmp, raw).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist cache file");
        }
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
            self.persist(&entries);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
            self.persist(&entries);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("stats"), None);
        cache.set("stats", "{\"totalUsers\":5}");
        assert_eq!(cache.get("stats").as_deref(), Some("{\"totalUsers\":5}"));
        cache.remove("stats");
        assert_eq!(cache.get("stats"), None);
    }

    #[test]
    fn test_file_cache_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dashboard.json");

        let cache = FileCache::open(&path);
        cache.set("stats", "cached");
        drop(cache);

        let reopened = FileCache::open(&path);
        assert_eq!(reopened.get("stats").as_deref(), Some("cached"));
    }

    #[test]
    fn test_file_cache_tolerates_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dashboard.json");
        std::fs::write(&path, "not json").expect("write");

        let cache = FileCache::open(&path);
        assert_eq!(cache.get("stats"), None);
        cache.set("stats", "fresh");
        assert_eq!(cache.get("stats").as_deref(), Some("fresh"));
    }

    #[test]
    fn test_file_cache_missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = FileCache::open(dir.path().join("absent.json"));
        assert_eq!(cache.get("anything"), None);
    }
}
