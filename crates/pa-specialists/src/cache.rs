//! LRU caches used by the drug and policy services (§4.2.3, §4.2.4).
//!
//! Both caches deep-copy on read — callers receive an owned clone and can
//! never mutate the cached state through the returned value.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A plain LRU cache with no expiry, used for drug info (`max_cache_size = 1000`).
pub struct LruCache<V: Clone> {
    inner: Mutex<LruInner<V>>,
    capacity: usize,
}

struct LruInner<V> {
    order: VecDeque<String>,
    entries: std::collections::HashMap<String, V>,
}

impl<V: Clone> LruCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruInner {
                order: VecDeque::new(),
                entries: std::collections::HashMap::new(),
            }),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().expect("lru cache lock poisoned");
        if let Some(value) = inner.entries.get(key).cloned() {
            inner.order.retain(|k| k != key);
            inner.order.push_back(key.to_string());
            Some(value)
        } else {
            None
        }
    }

    pub fn put(&self, key: String, value: V) {
        let mut inner = self.inner.lock().expect("lru cache lock poisoned");
        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else if inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("lru cache lock poisoned").entries.len()
    }
}

/// An LRU cache with a per-entry time-to-live, used for cached coverage
/// decisions keyed by `(insurer, drug)` with a 24h TTL (§4.2.4).
pub struct TtlLruCache<V: Clone> {
    inner: Mutex<TtlInner<V>>,
    capacity: usize,
    ttl: Duration,
}

struct TtlInner<V> {
    order: VecDeque<String>,
    entries: std::collections::HashMap<String, (V, Instant)>,
}

impl<V: Clone> TtlLruCache<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(TtlInner {
                order: VecDeque::new(),
                entries: std::collections::HashMap::new(),
            }),
            capacity,
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock().expect("ttl cache lock poisoned");
        let expired = match inner.entries.get(key) {
            Some((_, inserted_at)) => inserted_at.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            inner.entries.remove(key);
            inner.order.retain(|k| k != key);
            return None;
        }
        let value = inner.entries.get(key).map(|(v, _)| v.clone());
        if value.is_some() {
            inner.order.retain(|k| k != key);
            inner.order.push_back(key.to_string());
        }
        value
    }

    pub fn put(&self, key: String, value: V) {
        let mut inner = self.inner.lock().expect("ttl cache lock poisoned");
        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        } else if inner.entries.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
        inner.order.push_back(key.clone());
        inner.entries.insert(key, (value, Instant::now()));
    }

    /// Evicts an entry ahead of its TTL, e.g. when a caller determines the
    /// cached value was invalidated by something outside the cache's own
    /// clock (a referenced record changing underneath it).
    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.lock().expect("ttl cache lock poisoned");
        inner.entries.remove(key);
        inner.order.retain(|k| k != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lru_evicts_oldest_when_over_capacity() {
        let cache: LruCache<i32> = LruCache::new(2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.put("c".to_string(), 3);
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn lru_get_refreshes_recency() {
        let cache: LruCache<i32> = LruCache::new(2);
        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        cache.get("a");
        cache.put("c".to_string(), 3);
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a"), Some(1));
    }

    #[test]
    fn ttl_cache_expires_entries() {
        let cache: TtlLruCache<i32> = TtlLruCache::new(10, Duration::from_millis(1));
        cache.put("a".to_string(), 1);
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("a").is_none());
    }
}
