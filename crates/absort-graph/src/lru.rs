//! Least-recently-used cache

use crate::cache::{BoundedCache, exceeds, validate_capacity};
use crate::error::CacheResult;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

pub const DEFAULT_MAXSIZE: usize = 128;

/// Evicts the entry that was least recently assigned.
///
/// Every `insert` stamps the key with a fresh tick; the recency index maps
/// ticks back to keys, so the oldest entry is the first one in the index.
pub struct LruCache<K, V> {
    maxsize: Option<usize>,
    storage: HashMap<K, (V, u64)>,
    recency: BTreeMap<u64, K>,
    tick: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Create a cache holding at most `maxsize` entries (`None` = unbounded).
    pub fn new(maxsize: Option<usize>) -> CacheResult<Self> {
        Ok(Self::from_validated(validate_capacity(maxsize)?))
    }

    pub fn with_capacity(maxsize: NonZeroUsize) -> Self {
        Self::from_validated(Some(maxsize.get()))
    }

    pub fn unbounded() -> Self {
        Self::from_validated(None)
    }

    fn from_validated(maxsize: Option<usize>) -> Self {
        LruCache {
            maxsize,
            storage: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
        }
    }

    /// Keys from least to most recently assigned.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.recency.values()
    }
}

impl<K, V> BoundedCache<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn insert(&mut self, key: K, value: V) {
        if let Some((_, stamp)) = self.storage.get(&key) {
            self.recency.remove(stamp);
        }

        self.tick += 1;
        self.recency.insert(self.tick, key.clone());
        self.storage.insert(key, (value, self.tick));

        if exceeds(self.storage.len(), self.maxsize) {
            if let Some((_, evicted)) = self.recency.pop_first() {
                self.storage.remove(&evicted);
            }
        }
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.storage.get(key).map(|(value, _)| value)
    }

    fn contains(&self, key: &K) -> bool {
        self.storage.contains_key(key)
    }

    fn len(&self) -> usize {
        self.storage.len()
    }

    fn maxsize(&self) -> Option<usize> {
        self.maxsize
    }

    fn clear(&mut self) {
        self.storage.clear();
        self.recency.clear();
        self.tick = 0;
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::from_validated(Some(DEFAULT_MAXSIZE))
    }
}

impl<K: fmt::Debug, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("maxsize", &self.maxsize)
            .field("size", &self.storage.len())
            .finish()
    }
}
