use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use dlmate_core::models::media::ExtractionResult;
use dlmate_core::Platform;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub platform: Platform,
    pub url: String,
}

impl CacheKey {
    pub fn new(platform: Platform, url: impl Into<String>) -> Self {
        Self {
            platform,
            url: url.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub insert_count: u64,
    pub eviction_count: u64,
    pub expired_count: u64,
    pub capacity: usize,
    pub ttl_seconds: u64,
}

struct CacheEntry {
    value: Arc<ExtractionResult>,
    inserted_at: Instant,
    expires_at: Instant,
    seq: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    next_seq: u64,
    hits: u64,
    misses: u64,
    inserts: u64,
    evictions: u64,
    expirations: u64,
}

impl CacheState {
    fn evict_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        let removed = before - self.entries.len();
        self.expirations += removed as u64;
        removed
    }

    fn evict_least_recently_set(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.seq)
            .map(|(k, _)| k.clone());

        if let Some(key) = oldest {
            if let Some(entry) = self.entries.remove(&key) {
                self.evictions += 1;
                tracing::debug!(
                    "[cache] evicted {} for capacity (age {:?})",
                    key,
                    entry.inserted_at.elapsed()
                );
            }
        }
    }
}

/// Bounded TTL store for extraction results.
///
/// When full, inserting a new key first drops expired entries, then the
/// least-recently-set entry (overwriting a key counts as setting it).
pub struct ResultCache {
    capacity: usize,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl ResultCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<ExtractionResult>> {
        let now = Instant::now();
        let mut state = self.lock();

        let live = match state.entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                state.entries.remove(key);
                state.expirations += 1;
                None
            }
            None => None,
        };

        if live.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        live
    }

    pub fn set(&self, key: CacheKey, value: Arc<ExtractionResult>) {
        if self.capacity == 0 {
            return;
        }

        let now = Instant::now();
        let mut state = self.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            state.evict_expired(now);
            while state.entries.len() >= self.capacity {
                state.evict_least_recently_set();
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.inserts += 1;
        state.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                expires_at: now + self.ttl,
                seq,
            },
        );
    }

    /// Idempotent; reports whether a live or expired entry was removed.
    pub fn delete(&self, key: &CacheKey) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    pub fn delete_platform(&self, platform: Platform) -> usize {
        let mut state = self.lock();
        let before = state.entries.len();
        state.entries.retain(|k, _| k.platform != platform);
        before - state.entries.len()
    }

    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let removed = state.entries.len();
        state.entries.clear();
        removed
    }

    pub fn purge_expired(&self) -> usize {
        self.lock().evict_expired(Instant::now())
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let state = self.lock();
        CacheStats {
            entry_count: state.entries.values().filter(|e| e.expires_at > now).count(),
            hit_count: state.hits,
            miss_count: state.misses,
            insert_count: state.inserts,
            eviction_count: state.evictions,
            expired_count: state.expirations,
            capacity: self.capacity,
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Periodically purges expired entries until `cancel` fires or the cache
    /// is dropped. Holds only a weak reference.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let cache: Weak<ResultCache> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else { break };
                        let purged = cache.purge_expired();
                        if purged > 0 {
                            tracing::debug!("[cache] sweep purged {} expired entries", purged);
                        }
                    }
                }
            }
        })
    }
}
