//! In-memory memoization shared across concurrent requests.

use moka::sync::Cache;
use std::hash::Hash;

/// Entries kept per cache unless a caller asks for another bound.
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// Bounded concurrent memo map. Clones share storage.
///
/// Racing inserts for the same key are last-writer-wins; values are expected
/// to be interchangeable, so an evicted entry only costs an extra remote call.
pub struct MemoCache<K, V> {
    entries: Cache<K, V>,
}

impl<K, V> std::fmt::Debug for MemoCache<K, V>
where
    K: std::fmt::Debug + Eq + Hash + Send + Sync + 'static,
    V: std::fmt::Debug + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoCache")
            .field("entries", &self.entries)
            .finish()
    }
}

impl<K, V> Clone for MemoCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        Self {
            entries: Cache::new(max_entries),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key)
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    /// Live entries after pending evictions have been applied.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let cache: MemoCache<(String, String), String> = MemoCache::new();
        let other = cache.clone();

        other.insert(("ko".to_string(), "Chicken".to_string()), "닭고기".to_string());

        assert_eq!(
            cache.get(&("ko".to_string(), "Chicken".to_string())),
            Some("닭고기".to_string())
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_last_writer_wins() {
        let cache = MemoCache::new();
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
    }

    #[test]
    fn test_inserts_past_capacity_stay_bounded() {
        let cache: MemoCache<String, String> = MemoCache::with_capacity(100);

        for n in 0..1_000 {
            cache.insert(format!("닭고기{}", n), format!("chicken {}", n));
        }

        assert!(cache.len() <= 100, "cache grew to {}", cache.len());
        assert!(!cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_are_safe() {
        let cache: MemoCache<usize, usize> = MemoCache::new();
        let mut tasks = tokio::task::JoinSet::new();

        for n in 0..32 {
            let cache = cache.clone();
            tasks.spawn(async move {
                cache.insert(n % 8, n);
            });
        }
        while tasks.join_next().await.is_some() {}

        assert_eq!(cache.len(), 8);
    }
}
