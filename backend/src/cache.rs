use std::{
    fs, io,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::models::{DistanceResult, TransportMode};

/// Distance results stay valid for a week.
pub const DEFAULT_TTL_DAYS: i64 = 7;
const DEFAULT_MEMORY_CAPACITY: usize = 1_024;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("cache entry could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed storage for serialized cache entries.
///
/// Implementations hold opaque JSON text; expiry and decoding live in
/// [`DistanceCache`].
pub trait CacheStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn write(&self, key: &str, value: String) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Bounded in-process store; least recently used entries are dropped first.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<String, String>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self
            .entries
            .lock()
            .ok()
            .and_then(|mut entries| entries.get(key).cloned()))
    }

    fn write(&self, key: &str, value: String) -> Result<(), CacheError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(key.to_string(), value);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.pop(key);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self
            .entries
            .lock()
            .map(|entries| entries.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default())
    }
}

/// One file per entry, so the cache survives restarts.
///
/// Files are named by a hash of the key, which keeps names short whatever the
/// place names are. Each file starts with the JSON-quoted key on its own line,
/// followed by the stored value; a read whose header does not match the
/// requested key is a miss.
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let content = match fs::read_to_string(self.path_for(key)) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(split_record(&content)
            .filter(|(stored_key, _)| stored_key == key)
            .map(|(_, value)| value.to_string()))
    }

    fn write(&self, key: &str, value: String) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let header = serde_json::to_string(key)?;
        fs::write(self.path_for(key), format!("{header}\n{value}"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = fs::read_to_string(&path)?;
                if let Some((key, _)) = split_record(&content) {
                    keys.push(key);
                }
            }
        }
        Ok(keys)
    }
}

/// Fixed-length file stem for a key.
fn file_stem(key: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn split_record(content: &str) -> Option<(String, &str)> {
    let (header, value) = content.split_once('\n')?;
    let key = serde_json::from_str::<String>(header).ok()?;
    Some((key, value))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub result: DistanceResult,
    pub stored_at: DateTime<Utc>,
}

/// Memoizes distance lookups per (origin, destination, mode) for a bounded time.
#[derive(Clone)]
pub struct DistanceCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl DistanceCache {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: TimeDelta::days(DEFAULT_TTL_DAYS),
        }
    }

    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCacheStore::default()), Arc::new(SystemClock))
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Lowercased, whitespace-collapsed `origin|destination|mode`.
    ///
    /// `|` and `\` inside place names are backslash-escaped so distinct
    /// place pairs never share a key.
    pub fn cache_key(origin: &str, destination: &str, mode: TransportMode) -> String {
        format!(
            "{}|{}|{}",
            escape_separator(&normalize_place(origin)),
            escape_separator(&normalize_place(destination)),
            mode
        )
    }

    pub fn get(&self, origin: &str, destination: &str, mode: TransportMode) -> Option<DistanceResult> {
        let key = Self::cache_key(origin, destination, mode);
        let raw = match self.store.read(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("Distance cache read failed for {key}: {err}");
                return None;
            }
        };

        let entry = match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) if entry.key == key => entry,
            Ok(_) | Err(_) => {
                tracing::warn!("Dropping corrupt distance cache entry {key}");
                self.discard(&key);
                return None;
            }
        };

        if self.is_expired(&entry) {
            tracing::debug!("Distance cache entry {key} expired (stored {})", entry.stored_at);
            self.discard(&key);
            return None;
        }

        tracing::debug!("Distance cache hit for {key}");
        Some(entry.result)
    }

    pub fn put(
        &self,
        origin: &str,
        destination: &str,
        mode: TransportMode,
        result: &DistanceResult,
    ) -> Result<(), CacheError> {
        let key = Self::cache_key(origin, destination, mode);
        let entry = CacheEntry {
            key: key.clone(),
            result: result.clone(),
            stored_at: self.clock.now(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.write(&key, raw)?;
        tracing::debug!("Distance cache stored {key}");
        Ok(())
    }

    pub fn evict(&self, origin: &str, destination: &str, mode: TransportMode) -> Result<(), CacheError> {
        self.store.remove(&Self::cache_key(origin, destination, mode))
    }

    /// Remove every expired or unreadable entry, returning how many were dropped.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for key in self.store.keys()? {
            let keep = self
                .store
                .read(&key)?
                .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
                .is_some_and(|entry| !self.is_expired(&entry));
            if !keep {
                self.store.remove(&key)?;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!("Purged {removed} stale distance cache entries");
        }
        Ok(removed)
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.clock.now() - entry.stored_at > self.ttl
    }

    fn discard(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            tracing::warn!("Failed to remove distance cache entry {key}: {err}");
        }
    }
}

fn escape_separator(place: &str) -> String {
    place.replace('\\', "\\\\").replace('|', "\\|")
}

fn normalize_place(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
