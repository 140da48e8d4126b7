//! Least-frequently-used cache backed by an indexed min-heap

use crate::cache::{BoundedCache, exceeds, validate_capacity};
use crate::error::CacheResult;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::num::NonZeroUsize;

pub const DEFAULT_MAXSIZE: usize = 128;

/// Priority of a slot past the end of the heap. Nothing compares above it,
/// so a missing child never wins a sift-down comparison.
const MAX_PRIORITY_SENTINEL: u64 = u64::MAX;

/// A min-heap of keys ordered by access count.
///
/// Positions are indexed, so `increment` re-heapifies in O(log n).
struct FrequencyQueue<K> {
    heap: Vec<K>,
    position: HashMap<K, usize>,
    priority: HashMap<K, u64>,
}

impl<K> FrequencyQueue<K>
where
    K: Clone + Eq + Hash,
{
    fn new() -> Self {
        FrequencyQueue {
            heap: Vec::new(),
            position: HashMap::new(),
            priority: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn priority(&self, key: &K) -> Option<u64> {
        self.priority.get(key).copied()
    }

    /// Bump a key's count by one, inserting it with count 1 if new.
    fn increment(&mut self, key: K) {
        match self.priority.get_mut(&key) {
            Some(count) => {
                *count += 1;
                if let Some(&index) = self.position.get(&key) {
                    self.sift_down(index);
                }
            }
            None => {
                self.priority.insert(key.clone(), 1);
                self.heap.push(key.clone());
                let index = self.heap.len() - 1;
                self.position.insert(key, index);
                self.sift_up(index);
            }
        }
    }

    /// Remove and return the key with the smallest count.
    fn pop(&mut self) -> Option<K> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let top = self.heap.pop()?;
        self.position.remove(&top);
        self.priority.remove(&top);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.position.clear();
        self.priority.clear();
    }

    fn priority_at(&self, index: usize) -> u64 {
        self.heap
            .get(index)
            .and_then(|key| self.priority.get(key).copied())
            .unwrap_or(MAX_PRIORITY_SENTINEL)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.priority_at(index) >= self.priority_at(parent) {
                return;
            }
            self.swap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let own = self.priority_at(index);
            let left_priority = self.priority_at(left);
            let right_priority = self.priority_at(right);

            let (child, child_priority) = if left_priority <= right_priority {
                (left, left_priority)
            } else {
                (right, right_priority)
            };

            if own <= child_priority {
                return;
            }
            self.swap(index, child);
            index = child;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.position.insert(self.heap[a].clone(), a);
        self.position.insert(self.heap[b].clone(), b);
    }
}

/// Evicts the entry with the fewest assignments.
///
/// Each `insert`, new key or existing, counts as one use. Among equally
/// used keys the one nearest the heap root goes first.
pub struct LfuCache<K, V> {
    maxsize: Option<usize>,
    storage: HashMap<K, V>,
    frequency: FrequencyQueue<K>,
}

impl<K, V> LfuCache<K, V>
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

    fn from_validated(maxsize: Option<usize>) -> Self {
        LfuCache {
            maxsize,
            storage: HashMap::new(),
            frequency: FrequencyQueue::new(),
        }
    }

    /// How many times a key has been assigned since it entered the cache.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.frequency.priority(key)
    }
}

impl<K, V> BoundedCache<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn insert(&mut self, key: K, value: V) {
        self.frequency.increment(key.clone());
        self.storage.insert(key, value);

        if exceeds(self.storage.len(), self.maxsize) {
            if let Some(evicted) = self.frequency.pop() {
                self.storage.remove(&evicted);
            }
        }
        debug_assert_eq!(self.storage.len(), self.frequency.len());
    }

    fn lookup(&self, key: &K) -> Option<&V> {
        self.storage.get(key)
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
        self.frequency.clear();
    }
}

impl<K, V> Default for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        LfuCache {
            maxsize: Some(DEFAULT_MAXSIZE),
            storage: HashMap::new(),
            frequency: FrequencyQueue::new(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LfuCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("maxsize", &self.maxsize)
            .field("storage", &self.storage)
            .finish()
    }
}
