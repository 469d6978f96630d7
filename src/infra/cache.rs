//! Short-TTL in-memory cache for normalized provider snapshots.
//!
//! Keyed by `(provider, address)`. Entries expire lazily: a read past the
//! TTL deletes the entry and reports a miss. A periodic sweep task purges
//! stale entries while the process is idle; it is redundant with lazy
//! expiry and only bounds memory, never correctness.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::domain::WalletSnapshot;

/// Default entry TTL: 5 minutes
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default sweep interval: 10 minutes
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: WalletSnapshot,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Thread-safe snapshot cache shared by all provider adapters.
///
/// Cheap to clone; clones share the same underlying store.
#[derive(Clone)]
pub struct SnapshotCache {
    store: Arc<DashMap<(String, String), CacheEntry>>,
    default_ttl: Duration,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            default_ttl,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Look up a snapshot. Expired entries are removed on this read and
    /// reported as absent.
    pub fn get(&self, provider: &str, address: &str) -> Option<WalletSnapshot> {
        let key = (provider.to_string(), address.to_string());

        if let Some(entry) = self.store.get(&key) {
            if entry.is_expired() {
                drop(entry); // release read lock before removing
                self.store.remove(&key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(provider, address, "cache miss (expired)");
                None
            } else {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(provider, address, "cache hit");
                Some(entry.snapshot.clone())
            }
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(provider, address, "cache miss");
            None
        }
    }

    /// Store a snapshot with the default TTL
    pub fn insert(&self, provider: &str, address: &str, snapshot: WalletSnapshot) {
        self.insert_with_ttl(provider, address, snapshot, self.default_ttl);
    }

    /// Store a snapshot with an explicit TTL
    pub fn insert_with_ttl(
        &self,
        provider: &str,
        address: &str,
        snapshot: WalletSnapshot,
        ttl: Duration,
    ) {
        let entry = CacheEntry {
            snapshot,
            created_at: Instant::now(),
            ttl,
        };
        self.store
            .insert((provider.to_string(), address.to_string()), entry);
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        let removed = before - self.store.len();
        if removed > 0 {
            info!(removed, "cache sweep removed expired entries");
        }
        removed
    }

    /// Administrative reset. Returns how many entries were dropped.
    pub fn clear(&self) -> usize {
        let removed = self.store.len();
        self.store.clear();
        info!(removed, "cache cleared");
        removed
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
        }
    }
}

/// Cache statistics for the monitoring surface
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

/// Spawn the periodic sweep task. The first tick fires after one full
/// interval, not at startup.
pub fn spawn_sweeper(cache: SnapshotCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await; // consume the immediate first tick
        loop {
            ticker.tick().await;
            cache.purge_expired();
        }
    })
}
