//! TTL Cache
//!
//! Per-key time-to-live cache for upstream feed responses. Every feed
//! client owns one cache per value type. Failed loads are never cached, so
//! the next summary request retries the upstream.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Keyed cache whose entries expire after a per-call TTL
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key` if it is younger than `ttl`,
    /// otherwise run `load` and store its successful result.
    pub async fn get_or_try_load<F, Fut, E>(&self, key: &str, ttl: Duration, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(key, ttl).await {
            return Ok(value);
        }

        // Loads for the same key may race; the last one to finish wins.
        let value = load().await?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (Instant::now(), value.clone()));

        Ok(value)
    }

    async fn get_fresh(&self, key: &str, ttl: Duration) -> Option<V> {
        let entries = self.entries.read().await;
        let (stored_at, value) = entries.get(key)?;
        if stored_at.elapsed() < ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    /// Number of stored entries, fresh or not
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    #[cfg(test)]
    async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
