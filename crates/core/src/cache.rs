//! Namespaced, TTL-bounded key-value cache persisted as JSON.
//!
//! One file per namespace: `{ "<key>": { "value": ..., "expiresAt": <ms> } }`.
//! An entry is visible only while `now < expiresAt`. Expired entries are
//! dropped on load (one rewrite) and on access. Every mutation writes the
//! whole namespace back. The cache is best-effort: unreadable files start
//! empty and write failures are logged at debug level.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default entry lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    value: serde_json::Value,
    /// Unix milliseconds
    expires_at: i64,
}

impl CacheEntry {
    fn is_live(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

/// Directory holding every namespace file.
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bridge-vault-cli")
        .join("cache")
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn ttl_ms(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

/// One cache namespace backed by `<dir>/<namespace>.json`.
#[derive(Debug)]
pub struct Cache {
    namespace: String,
    path: PathBuf,
    default_ttl: Duration,
    entries: Mutex<BTreeMap<String, CacheEntry>>,
}

impl Cache {
    /// Open `namespace` in the per-user cache directory.
    pub fn open(namespace: &str) -> Self {
        Self::open_in(default_cache_dir(), namespace, DEFAULT_CACHE_TTL)
    }

    /// Open `namespace` under `dir` with a default entry lifetime.
    pub fn open_in(dir: impl AsRef<Path>, namespace: &str, default_ttl: Duration) -> Self {
        let dir = dir.as_ref();
        let path = dir.join(format!("{namespace}.json"));

        if let Err(e) = std::fs::create_dir_all(dir) {
            debug!(dir = %dir.display(), error = %e, "Failed to create cache directory");
        }

        let cache = Self {
            namespace: namespace.to_string(),
            path,
            default_ttl,
            entries: Mutex::new(BTreeMap::new()),
        };
        cache.load();
        cache
    }

    fn load(&self) {
        if !self.path.exists() {
            return;
        }

        let loaded = std::fs::read_to_string(&self.path)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                serde_json::from_str::<BTreeMap<String, CacheEntry>>(&raw).map_err(|e| e.to_string())
            });

        let mut stored = match loaded {
            Ok(stored) => stored,
            Err(e) => {
                debug!(namespace = %self.namespace, error = %e, "Failed to initialize cache");
                return;
            }
        };

        let now = now_ms();
        let before = stored.len();
        stored.retain(|_, entry| entry.is_live(now));
        let purged = before - stored.len();

        let mut entries = self.entries.lock();
        *entries = stored;
        if purged > 0 {
            debug!(namespace = %self.namespace, purged, "Purged expired cache entries");
            self.persist(&entries);
        }
    }

    fn persist(&self, entries: &BTreeMap<String, CacheEntry>) {
        let result = serde_json::to_string(entries)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&self.path, json).map_err(|e| e.to_string()));

        if let Err(e) = result {
            debug!(namespace = %self.namespace, error = %e, "Failed to save cache");
        }
    }

    /// Live value for `key`, if any.
    ///
    /// A value that no longer deserializes as `T` counts as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock();
        let now = now_ms();

        match entries.get(key).map(|entry| entry.is_live(now)) {
            Some(true) => {
                debug!(namespace = %self.namespace, key, "Cache hit");
                entries
                    .get(key)
                    .and_then(|entry| serde_json::from_value(entry.value.clone()).ok())
            }
            Some(false) => {
                debug!(namespace = %self.namespace, key, "Cache entry expired");
                entries.remove(key);
                self.persist(&entries);
                None
            }
            None => {
                debug!(namespace = %self.namespace, key, "Cache miss");
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl` (or the namespace default).
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                debug!(namespace = %self.namespace, key, error = %e, "Value not cacheable");
                return;
            }
        };

        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = now_ms().saturating_add(ttl_ms(ttl));

        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
        self.persist(&entries);
    }

    pub fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.persist(&entries);
    }

    /// Cached value for `key`, or the result of `compute` stored for `ttl`.
    ///
    /// `compute` runs at most once per call. Errors are returned uncached.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        compute: F,
        ttl: Option<Duration>,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get(key) {
            return Ok(cached);
        }

        let value = compute().await?;
        self.set(key, &value, ttl);
        Ok(value)
    }
}

/// Delete every namespace file under `dir`. Returns how many were removed.
pub fn clear_all_in(dir: impl AsRef<Path>) -> std::io::Result<usize> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }

    debug!(dir = %dir.display(), removed, "Cleared cache namespaces");
    Ok(removed)
}
