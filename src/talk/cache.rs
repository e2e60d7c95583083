//! Bounded memoization for query results / 查询结果缓存
//!
//! The lock is released while a value is computed, so two racing callers may both
//! compute the same key; the later insert wins.

use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use super::collection::Selector;
use super::query::KeywordQuery;

/// Keyword cache key: language plus the exact query / 关键词缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeywordKey {
    pub lang: String,
    pub query: KeywordQuery,
}

/// Collection cache key / 展开缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionKey {
    pub lang: String,
    pub selector: Selector,
}

/// LRU memo cache; capacity 0 disables it / LRU 缓存，容量为 0 时禁用
pub struct MemoCache<K, V> {
    inner: Option<Mutex<LruCache<K, V>>>,
}

impl<K: Hash + Eq, V: Clone> MemoCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map(|c| c.lock().len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached value for `key`, computing and storing it on a miss / 读取或计算
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        let Some(cache) = &self.inner else {
            return compute();
        };

        if let Some(value) = cache.lock().get(&key) {
            return value.clone();
        }

        let value = compute();
        cache.lock().put(key, value.clone());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_hit_skips_compute() {
        let cache: MemoCache<u32, String> = MemoCache::new(4);
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            "value".to_string()
        };

        assert_eq!(cache.get_or_compute(1, compute), "value");
        assert_eq!(cache.get_or_compute(1, compute), "value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recent() {
        let cache: MemoCache<u32, u32> = MemoCache::new(2);
        cache.get_or_compute(1, || 10);
        cache.get_or_compute(2, || 20);
        cache.get_or_compute(1, || 0); // touch 1
        cache.get_or_compute(3, || 30); // evicts 2

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_or_compute(1, || 99), 10);
        assert_eq!(cache.get_or_compute(2, || 21), 21);
    }

    #[test]
    fn test_zero_capacity_disables() {
        let cache: MemoCache<u32, u32> = MemoCache::new(0);
        assert!(!cache.is_enabled());
        assert_eq!(cache.get_or_compute(1, || 1), 1);
        assert_eq!(cache.get_or_compute(1, || 2), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_keyword_keys() {
        let cache: MemoCache<KeywordKey, Arc<usize>> = MemoCache::new(8);
        let key = |lang: &str, regex: bool| KeywordKey {
            lang: lang.to_string(),
            query: KeywordQuery::new("paimon", "").regex(regex),
        };

        cache.get_or_compute(key("EN", false), || Arc::new(1));
        assert_eq!(*cache.get_or_compute(key("EN", false), || Arc::new(2)), 1);
        assert_eq!(*cache.get_or_compute(key("EN", true), || Arc::new(3)), 3);
        assert_eq!(*cache.get_or_compute(key("CHS", false), || Arc::new(4)), 4);
    }

    #[test]
    fn test_concurrent_access() {
        let cache: MemoCache<CollectionKey, u64> = MemoCache::new(16);
        std::thread::scope(|s| {
            for t in 0..8u64 {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..32i64 {
                        let key = CollectionKey {
                            lang: "EN".to_string(),
                            selector: Selector::ByTalkId(i % 4),
                        };
                        let v = cache.get_or_compute(key, || (i % 4) as u64);
                        assert_eq!(v, (i % 4) as u64, "thread {t}");
                    }
                });
            }
        });
        assert_eq!(cache.len(), 4);
    }
}
