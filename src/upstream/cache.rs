//! In-memory TTL cache for decoded upstream responses
//!
//! Entries expire lazily (a stale `get` is a miss and schedules removal) and
//! eagerly (a background sweep every `ttl / 2`). When full, inserting a new
//! key evicts the oldest entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Length of a cache key in hex characters
const FINGERPRINT_LEN: usize = 16;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
    /// Insertion order, breaks ties between equal instants
    seq: u64,
}

struct Inner<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    ttl: Duration,
    max_size: usize,
    next_seq: AtomicU64,
}

impl<V> Inner<V> {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.ttl
    }

    /// Removes `key` only if it is still stale; a concurrent `set` may have
    /// refreshed it since the read that found it expired.
    fn remove_if_stale(&self, key: &str) {
        let now = Instant::now();
        let mut entries = self.write();
        if entries.get(key).is_some_and(|e| self.is_stale(e, now)) {
            entries.remove(key);
            debug!(key, "removed expired cache entry");
        }
    }

    fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !self.is_stale(entry, now));
        before - entries.len()
    }
}

struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct ResponseCache<V> {
    inner: Arc<Inner<V>>,
    sweeper: Mutex<Option<Sweeper>>,
}

impl<V> ResponseCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache and, when called inside a Tokio runtime, starts the
    /// periodic sweep.
    pub fn new(ttl: Duration, max_size: usize) -> Self {
        let inner = Arc::new(Inner {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_size,
            next_seq: AtomicU64::new(0),
        });

        let sweeper = match tokio::runtime::Handle::try_current() {
            Ok(runtime) if !ttl.is_zero() => Some(spawn_sweeper(&runtime, &inner)),
            _ => None,
        };

        info!(
            ttl_secs = ttl.as_secs_f64(),
            max_size, "response cache initialized"
        );

        Self {
            inner,
            sweeper: Mutex::new(sweeper),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.inner.read();
            let entry = entries.get(key)?;
            if !self.inner.is_stale(entry, now) {
                info!(key, "cache hit");
                return Some(entry.value.clone());
            }
        }

        debug!(key, "cache entry expired");
        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move { inner.remove_if_stale(&key) });
            }
            Err(_) => inner.remove_if_stale(&key),
        }
        None
    }

    /// Stores `value`, replacing any existing entry and its timestamp.
    pub fn set(&self, key: &str, value: V) {
        let mut entries = self.inner.write();
        // Taken under the lock so sequence order matches write order
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);

        if !entries.contains_key(key) && entries.len() >= self.inner.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| (entry.inserted_at, entry.seq))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(key = %oldest, "evicted oldest cache entry");
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                value,
                inserted_at: Instant::now(),
                seq,
            },
        );
        info!(key, "cache stored");
    }

    pub fn delete(&self, key: &str) {
        self.inner.write().remove(key);
    }

    /// Number of held entries, including expired ones not yet removed
    pub fn size(&self) -> usize {
        self.inner.read().len()
    }

    /// Removes every expired entry; returns how many were dropped.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Stops the background sweep and waits for it to finish.
    pub async fn shutdown(&self) {
        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(sweeper) = sweeper {
            let _ = sweeper.shutdown.send(true);
            let _ = sweeper.handle.await;
            debug!("cache sweeper stopped");
        }
    }
}

impl<V> Drop for ResponseCache<V> {
    fn drop(&mut self) {
        let sweeper = self
            .sweeper
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sweeper) = sweeper {
            sweeper.handle.abort();
        }
    }
}

fn spawn_sweeper<V>(runtime: &tokio::runtime::Handle, inner: &Arc<Inner<V>>) -> Sweeper
where
    V: Send + Sync + 'static,
{
    let (shutdown, mut shutdown_rx) = watch::channel(false);
    let weak: Weak<Inner<V>> = Arc::downgrade(inner);
    let period = inner.ttl / 2;

    let handle = runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(inner) = weak.upgrade() else { break };
                    let removed = inner.sweep();
                    if removed > 0 {
                        debug!(removed, "swept expired cache entries");
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }
    });

    Sweeper { shutdown, handle }
}

/// Cache key for an upstream operation: the first 16 hex characters of
/// `sha256("operation:arg1:arg2...")`.
pub fn fingerprint(operation: &str, args: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    for arg in args {
        hasher.update(b":");
        hasher.update(arg.as_bytes());
    }
    let mut key = hex::encode(hasher.finalize());
    key.truncate(FINGERPRINT_LEN);
    key
}
