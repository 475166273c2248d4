//! In-process TTL cache
//!
//! Entries carry their own expiry. Expired entries are evicted lazily when
//! read and in bulk by [`spawn_sweeper`], which bounds memory held by keys
//! nobody reads again.

use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::CacheTypeConfig;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Anything that can drop its expired entries in one pass
pub trait Sweep: Send + Sync {
    /// Remove expired entries, returning how many were dropped
    fn sweep_expired(&self) -> usize;
}

/// String-keyed cache of `V` values with per-entry expiry
#[derive(Debug)]
pub struct TtlCache<V> {
    name: &'static str,
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
    max_entries: usize,
}

impl<V: Clone + Send + Sync> TtlCache<V> {
    pub fn new(name: &'static str, default_ttl: Duration, max_entries: usize) -> Self {
        Self {
            name,
            entries: DashMap::new(),
            default_ttl,
            max_entries,
        }
    }

    pub fn from_config(name: &'static str, config: &CacheTypeConfig) -> Self {
        Self::new(name, config.ttl_duration(), config.max_entries)
    }

    /// Fresh value for `key`; an expired entry is evicted on the way out
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                debug!(cache = self.name, key = key, "Cache HIT");
                return Some(entry.value.clone());
            }
            Some(_) => {}
            None => {
                debug!(cache = self.name, key = key, "Cache MISS");
                return None;
            }
        }

        self.entries
            .remove_if(key, |_, entry| entry.is_expired(now));
        debug!(cache = self.name, key = key, "Cache EXPIRED");
        None
    }

    /// Store `value` under `key` with the cache's default TTL
    pub fn set(&self, key: impl Into<String>, value: V) -> bool {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    /// Store `value` under `key` for `ttl`. Returns false when the cache is
    /// full of live entries and the key is new.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> bool {
        if ttl.is_zero() || self.max_entries == 0 {
            return false;
        }

        let key = key.into();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.sweep_expired();
            if self.entries.len() >= self.max_entries {
                debug!(cache = self.name, key = %key, "Cache full, entry not stored");
                return false;
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        true
    }

    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every key starting with `prefix`
    pub fn delete_by_prefix(&self, prefix: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!(
                cache = self.name,
                prefix = prefix,
                removed = removed,
                "Cache prefix invalidated"
            );
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

impl<V: Clone + Send + Sync> Sweep for TtlCache<V> {
    fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

/// Periodically sweep `cache` on the current tokio runtime. The task only
/// holds a weak reference and exits once the cache is dropped.
pub fn spawn_sweeper<C>(cache: &Arc<C>, interval: Duration) -> JoinHandle<()>
where
    C: Sweep + 'static,
{
    let weak: Weak<C> = Arc::downgrade(cache);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(cache) = weak.upgrade() else {
                debug!("Cache dropped, sweeper exiting");
                break;
            };
            let swept = cache.sweep_expired();
            if swept > 0 {
                debug!(swept = swept, "Cache sweep evicted expired entries");
            }
        }
    })
}
