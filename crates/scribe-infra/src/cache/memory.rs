//! In-memory cache for rendered pages.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use scribe_core::ports::{Cache, CacheError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|exp| now < exp)
    }
}

/// Process-local cache behind an async `RwLock`. Expired entries are
/// dropped on read and swept on every write.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.store
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let store = self.store.read().await;
            match store.get(key) {
                Some(entry) if entry.is_live(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.store.write().await.remove(key);
        None
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut store = self.store.write().await;
        store.retain(|_, entry| entry.is_live(now));
        store.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|d| now + d),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = InMemoryCache::new();
        cache.set("index_page:anonymous:1", "<html>", None).await.unwrap();
        assert_eq!(
            cache.get("index_page:anonymous:1").await,
            Some("<html>".to_string())
        );
        assert_eq!(cache.get("index_page:anonymous:2").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = InMemoryCache::new();
        cache
            .set("short", "value", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        cache.set("long", "value", Some(Duration::from_secs(60))).await.unwrap();
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get("short").await, None);
        assert_eq!(cache.get("long").await, Some("value".to_string()));
        assert_eq!(cache.len().await, 1);
    }
}
