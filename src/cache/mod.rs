//! Keyed TTL memoisation for upstream fetch-and-compute operations.
//!
//! Each key owns its own async mutex, held across the compute call, so
//! concurrent requesters of the same key wait for the first computation
//! instead of hitting the upstream again.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

pub struct CacheEntry {
    pub key: String,
    pub expires_at: DateTime<Utc>,
    value: Arc<dyn Any + Send + Sync>,
}

impl CacheEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

pub struct RateLimitedCache {
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl RateLimitedCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Return the live value for `key`, or run `compute` and keep its result
    /// for `ttl`.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, ttl: Duration, compute: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.get_or_compute_with(key, compute, |_| Some(ttl)).await
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but the TTL is chosen
    /// from the computed value. `None` means the value is returned without
    /// being stored.
    pub async fn get_or_compute_with<T, F, Fut, P>(&self, key: &str, compute: F, ttl_for: P) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
        P: FnOnce(&T) -> Option<Duration>,
    {
        let slot = self.slot(key).await;
        let mut entry = slot.lock().await;

        if let Some(existing) = entry.as_ref() {
            if existing.is_live(self.clock.now()) {
                if let Some(value) = existing.value.downcast_ref::<T>() {
                    debug!(key = %key, expires_at = %existing.expires_at, "RateLimitedCache: hit for {}", key);
                    return value.clone();
                }
            }
        }

        debug!(key = %key, "RateLimitedCache: miss for {}, computing", key);
        let value = compute().await;

        *entry = ttl_for(&value).map(|ttl| CacheEntry {
            key: key.to_string(),
            expires_at: self.expiry(ttl),
            value: Arc::new(value.clone()),
        });

        value
    }

    /// Drop the entry for `key`. Waits for an in-flight compute on that key.
    pub async fn invalidate(&self, key: &str) {
        let slot = self.slots.lock().await.get(key).cloned();
        if let Some(slot) = slot {
            slot.lock().await.take();
            debug!(key = %key, "RateLimitedCache: invalidated {}", key);
        }
    }

    /// Drop every entry immediately.
    pub async fn clear(&self) {
        let mut slots = self.slots.lock().await;
        let count = slots.len();
        slots.clear();
        debug!(entries = count, "RateLimitedCache: cleared {} entries", count);
    }

    /// Whether `key` currently holds a live entry.
    pub async fn contains(&self, key: &str) -> bool {
        let slot = {
            let slots = self.slots.lock().await;
            match slots.get(key) {
                Some(slot) => slot.clone(),
                None => return false,
            }
        };
        let entry = slot.lock().await;
        entry
            .as_ref()
            .map(|e| e.is_live(self.clock.now()))
            .unwrap_or(false)
    }

    /// Expiry time of the live entry for `key`, if any.
    pub async fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let slot = self.slots.lock().await.get(key).cloned()?;
        let entry = slot.lock().await;
        entry
            .as_ref()
            .filter(|e| e.is_live(self.clock.now()))
            .map(|e| e.expires_at)
    }

    async fn slot(&self, key: &str) -> Slot {
        let mut slots = self.slots.lock().await;
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }

    fn expiry(&self, ttl: Duration) -> DateTime<Utc> {
        let now = self.clock.now();
        chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for RateLimitedCache {
    fn default() -> Self {
        Self::with_system_clock()
    }
}
