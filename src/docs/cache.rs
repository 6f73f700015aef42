use std::{
    collections::HashMap,
    future::Future,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::error::AppError;

struct Entry<V> {
    value: V,
    stored_at: Instant,
    last_used: u64,
}

struct Entries<V> {
    map: HashMap<String, Entry<V>>,
    tick: u64,
}

impl<V> Entries<V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .map
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.map.remove(&key);
        }
    }
}

/// Read-through cache bounded by entry count, with per-entry expiry.
///
/// A failed load never evicts what was cached. With `allow_stale` the expired
/// value is served instead of the error.
pub struct TtlLruCache<V> {
    capacity: usize,
    ttl: Duration,
    allow_stale: bool,
    entries: Mutex<Entries<V>>,
}

impl<V: Clone> TtlLruCache<V> {
    pub fn new(capacity: usize, ttl: Duration, allow_stale: bool) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            allow_stale,
            entries: Mutex::new(Entries {
                map: HashMap::new(),
                tick: 0,
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    pub async fn fetch<F, Fut>(&self, key: &str, load: F) -> Result<V, AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, AppError>>,
    {
        let stale = {
            let mut entries = self.entries.lock().await;
            let tick = entries.next_tick();
            match entries.map.get_mut(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    entry.last_used = tick;
                    return Ok(entry.value.clone());
                }
                Some(entry) => Some(entry.value.clone()),
                None => None,
            }
        };

        match load().await {
            Ok(value) => {
                let mut entries = self.entries.lock().await;
                if !entries.map.contains_key(key) && entries.map.len() >= self.capacity {
                    entries.evict_least_recent();
                }
                let tick = entries.next_tick();
                entries.map.insert(
                    key.to_string(),
                    Entry {
                        value: value.clone(),
                        stored_at: Instant::now(),
                        last_used: tick,
                    },
                );
                Ok(value)
            }
            Err(err) => match stale {
                Some(value) if self.allow_stale => {
                    tracing::warn!(key, "refresh failed, serving stale value: {err}");
                    Ok(value)
                }
                _ => Err(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use crate::error::AppError;

    use super::TtlLruCache;

    #[tokio::test]
    async fn fresh_entries_skip_the_loader() {
        let cache = TtlLruCache::new(4, Duration::from_secs(60), true);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .fetch("versions", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, AppError>(vec!["v1.0.0".to_string()])
                })
                .await
                .expect("fetch should succeed");
            assert_eq!(value, vec!["v1.0.0".to_string()]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn least_recently_used_entry_is_evicted() {
        let cache = TtlLruCache::new(2, Duration::from_secs(60), true);
        let load = |value: u32| move || async move { Ok::<_, AppError>(value) };

        cache.fetch("a", load(1)).await.expect("a should load");
        cache.fetch("b", load(2)).await.expect("b should load");
        cache.fetch("a", load(99)).await.expect("a should be cached");
        cache.fetch("c", load(3)).await.expect("c should load");

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.fetch("a", load(100)).await.expect("a should be cached"), 1);
        assert_eq!(cache.fetch("b", load(20)).await.expect("b should reload"), 20);
    }

    #[tokio::test]
    async fn stale_value_is_served_when_refresh_fails() {
        let cache = TtlLruCache::new(2, Duration::from_millis(1), true);
        cache
            .fetch("menu", || async { Ok::<_, AppError>(7) })
            .await
            .expect("first load should succeed");
        tokio::time::sleep(Duration::from_millis(5)).await;

        let value = cache
            .fetch("menu", || async { Err(AppError::internal("origin down")) })
            .await
            .expect("stale value should be served");

        assert_eq!(value, 7);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn without_stale_reads_the_error_surfaces_but_entry_survives() {
        let cache = TtlLruCache::new(2, Duration::from_millis(1), false);
        cache
            .fetch("doc", || async { Ok::<_, AppError>(7) })
            .await
            .expect("first load should succeed");
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = cache
            .fetch("doc", || async { Err(AppError::internal("origin down")) })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.len().await, 1);
    }
}
