//! Concurrent key/value store with per-entry absolute expiry
//!
//! Lookups never return an expired entry, whether or not the background
//! sweep has removed it yet. The sweep only bounds memory.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ExpiringStoreConfig;
use super::stats::{StoreStats, SweepCounters};

/// Absolute expiry `ttl` from now, saturating at the far future.
pub fn expiry_after(ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone)]
struct StoredEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> StoredEntry<V> {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

struct Shared<K, V> {
    entries: RwLock<HashMap<K, StoredEntry<V>>>,
    counters: SweepCounters,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash,
{
    fn purge(&self, now: DateTime<Utc>) -> usize {
        let purged = {
            let mut entries = self.entries.write();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_live(now));
            before - entries.len()
        };
        self.counters.record_sweep(purged);
        purged
    }
}

/// Thread-safe map whose entries disappear at their expiry instant.
///
/// Used for the token revocation list and the pending OAuth state registry.
/// Share it behind an `Arc`; dropping the store cancels its sweep task.
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use keygate_common::cache::{ExpiringStore, ExpiringStoreConfig};
///
/// let store: ExpiringStore<String, u32> = ExpiringStore::new(ExpiringStoreConfig::named("demo"));
/// store.put_with_ttl("a".to_string(), 1, Duration::from_secs(60));
/// assert_eq!(store.get(&"a".to_string()), Some(1));
/// assert_eq!(store.take(&"a".to_string()), Some(1));
/// assert!(store.get(&"a".to_string()).is_none());
/// ```
pub struct ExpiringStore<K, V> {
    shared: Arc<Shared<K, V>>,
    config: ExpiringStoreConfig,
    cancellation: CancellationToken,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<K, V> ExpiringStore<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a store and start its background sweep on the current tokio
    /// runtime.
    ///
    /// Without a runtime the store still works; expired entries are then only
    /// removed by [`take`](Self::take), [`delete`](Self::delete) or
    /// [`purge_expired`](Self::purge_expired).
    pub fn new(config: ExpiringStoreConfig) -> Self {
        let shared =
            Arc::new(Shared { entries: RwLock::new(HashMap::new()), counters: SweepCounters::default() });
        let cancellation = CancellationToken::new();
        let interval = config.effective_sweep_interval();

        let sweeper = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = sweep_task(
                    Arc::downgrade(&shared),
                    cancellation.clone(),
                    interval,
                    config.name.clone(),
                );
                info!(
                    store = %config.name,
                    event = "start",
                    interval_ms = interval.as_millis() as u64,
                    "Expiring store sweeper started"
                );
                Some(handle.spawn(task))
            }
            Err(_) => {
                warn!(
                    store = %config.name,
                    "No tokio runtime available; expiring store running without background sweep"
                );
                None
            }
        };

        Self { shared, config, cancellation, sweeper: Mutex::new(sweeper) }
    }

    /// Insert or overwrite `key`, expiring at `expires_at`.
    pub fn put(&self, key: K, value: V, expires_at: DateTime<Utc>) {
        self.shared.entries.write().insert(key, StoredEntry { value, expires_at });
    }

    /// Insert or overwrite `key`, expiring `ttl` from now.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.put(key, value, expiry_after(ttl));
    }

    /// Insert using the configured default TTL; without one the entry never
    /// expires.
    pub fn put_with_default_ttl(&self, key: K, value: V) {
        let expires_at = self.config.default_ttl.map_or(DateTime::<Utc>::MAX_UTC, expiry_after);
        self.put(key, value, expires_at);
    }

    /// Insert only if no live entry exists for `key`.
    ///
    /// Returns `true` when this call inserted. An expired occupant counts as
    /// absent and is replaced.
    pub fn insert_if_absent(&self, key: K, value: V, expires_at: DateTime<Utc>) -> bool {
        let now = Utc::now();
        let mut entries = self.shared.entries.write();
        match entries.entry(key) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return false;
                }
                occupied.insert(StoredEntry { value, expires_at });
                true
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(StoredEntry { value, expires_at });
                true
            }
        }
    }

    /// Value for `key` if present and not expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Utc::now();
        self.shared
            .entries
            .read()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    /// Expiry instant of a live entry.
    pub fn expires_at(&self, key: &K) -> Option<DateTime<Utc>> {
        let now = Utc::now();
        self.shared
            .entries
            .read()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.expires_at(key).is_some()
    }

    /// Remove `key` and return its value if it was live.
    ///
    /// An expired entry is evicted as well and reported as `None`, so after
    /// `take` the key is absent whatever its state was. Runs under one
    /// exclusive lock, so among concurrent callers at most one observes a
    /// given entry.
    pub fn take(&self, key: &K) -> Option<V> {
        let now = Utc::now();
        let removed = self.shared.entries.write().remove(key)?;
        removed.is_live(now).then_some(removed.value)
    }

    /// Remove `key`. Returns whether an entry (live or expired) was removed.
    pub fn delete(&self, key: &K) -> bool {
        self.shared.entries.write().remove(key).is_some()
    }

    /// Number of held entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.shared.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every expired entry now. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.shared.purge(Utc::now())
    }

    /// Stop the background sweep. Idempotent; the store remains usable.
    pub fn close(&self) {
        if self.cancellation.is_cancelled() {
            return;
        }
        self.cancellation.cancel();
        self.sweeper.lock().take();
        info!(store = %self.config.name, event = "stop", "Expiring store sweeper stopped");
    }

    /// True while a background sweep task is attached.
    pub fn is_sweeping(&self) -> bool {
        !self.cancellation.is_cancelled() && self.sweeper.lock().is_some()
    }

    pub fn stats(&self) -> StoreStats {
        self.shared.counters.snapshot(self.len())
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }
}

impl<K, V> Drop for ExpiringStore<K, V> {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

impl<K, V> std::fmt::Debug for ExpiringStore<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringStore")
            .field("name", &self.config.name)
            .field("entries", &self.shared.entries.read().len())
            .field("closed", &self.cancellation.is_cancelled())
            .finish()
    }
}

async fn sweep_task<K, V>(
    shared: Weak<Shared<K, V>>,
    cancel: CancellationToken,
    interval: Duration,
    name: String,
) where
    K: Eq + Hash,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(store = %name, event = "sweep_cancelled", "Expiring store sweep cancelled");
                break;
            }
            _ = ticker.tick() => {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let purged = shared.purge(Utc::now());
                if purged > 0 {
                    debug!(store = %name, purged, "Purged expired entries");
                }
            }
        }
    }
}
