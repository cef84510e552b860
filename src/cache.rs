// src/cache.rs
//! Persistent key/value cache with a TTL'd slot for the event payload.
//!
//! The store itself is a plain string→string map, mirroring the
//! browser-local store the site's pages use; `EventCache` owns the
//! `{data, timestamp}` entry encoding so callers never touch the persisted
//! representation directly.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Well-known slot the site stores its event payload under.
pub const EVENTS_CACHE_KEY: &str = "kcmi_events_cache";

/// Default freshness window for cached event payloads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// String-keyed, string-valued, synchronous persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().expect("store mutex poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .expect("store mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.lock().expect("store mutex poisoned").remove(key);
    }
}

/// One file per key under a directory; survives process restarts. Write
/// failures are logged and dropped; a cold cache on the next read is the
/// acceptable outcome, same as a full browser store.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(error = ?e, dir = %self.dir.display(), "cache dir create failed");
            return;
        }
        if let Err(e) = fs::write(self.path_for(key), value) {
            tracing::warn!(error = ?e, key, "cache write failed");
        }
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// Persisted entry shape: the payload plus its write time in unix millis.
#[derive(Serialize, Deserialize)]
struct CacheEntry {
    data: Vec<Event>,
    timestamp: u64,
}

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

/// TTL'd view over one cache slot.
#[derive(Clone)]
pub struct EventCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    ttl: Duration,
    clock: Clock,
}

impl EventCache {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
            clock: Arc::new(now_millis),
        }
    }

    /// Replace the clock, so tests can advance time without sleeping.
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Persist the payload, fully overwriting any prior entry.
    pub fn write(&self, payload: &[Event]) {
        let entry = CacheEntry {
            data: payload.to_vec(),
            timestamp: (self.clock)(),
        };
        match serde_json::to_string(&entry) {
            Ok(encoded) => self.store.set(&self.key, &encoded),
            Err(e) => tracing::warn!(error = ?e, "cache entry encode failed"),
        }
    }

    /// The cached payload, or `None` when the slot is empty, corrupt, or past
    /// its TTL. `allow_stale` skips the TTL check; that path is the
    /// last-resort fallback after a failed fetch, never the normal read.
    /// A corrupt entry is cleared so the slot heals on the next write.
    pub fn read(&self, allow_stale: bool) -> Option<Vec<Event>> {
        let raw = self.store.get(&self.key)?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = ?e, key = %self.key, "corrupt cache entry, clearing slot");
                self.store.remove(&self.key);
                return None;
            }
        };
        let age = (self.clock)().saturating_sub(entry.timestamp);
        if !allow_stale && age >= self.ttl.as_millis() as u64 {
            return None;
        }
        Some(entry.data)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
