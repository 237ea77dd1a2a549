use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Cache port for viewer-keyed listing responses.
///
/// A pure performance optimization: correctness must never depend on it.
/// Entries carry a short fixed TTL and are either invalidated explicitly
/// or simply left to expire.
#[async_trait]
pub trait ListingCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl: Duration);
    async fn expire(&self, key: &str);
}

/// In-process implementation of the listing cache.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), (value, Instant::now() + ttl));
    }

    async fn expire(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_expire() {
        let cache = MemoryCache::new();

        cache
            .set("upcoming_rides:anonymous", "[]".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(
            cache.get("upcoming_rides:anonymous").await,
            Some("[]".to_string())
        );

        cache.expire("upcoming_rides:anonymous").await;
        assert_eq!(cache.get("upcoming_rides:anonymous").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = MemoryCache::new();

        cache
            .set("key", "value".to_string(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_millis(25)).await;

        assert_eq!(cache.get("key").await, None);
    }
}
