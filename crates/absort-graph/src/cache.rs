//! Bounded key-value caches used to memoize distance computations

use crate::error::{CacheError, CacheResult};
use std::fmt;

/// A fixed-capacity map with an eviction policy.
///
/// Eviction happens on `insert`, once the size exceeds `maxsize`. Lookups
/// never change eviction order.
pub trait BoundedCache<K, V> {
    /// Insert or overwrite a value.
    fn insert(&mut self, key: K, value: V);

    /// Look up a value without touching eviction order.
    fn lookup(&self, key: &K) -> Option<&V>;

    /// Like [`lookup`](Self::lookup), but a missing key is reported as
    /// `KeyNotFound`.
    fn get(&self, key: &K) -> CacheResult<&V>
    where
        K: fmt::Debug,
    {
        self.lookup(key)
            .ok_or_else(|| CacheError::KeyNotFound(format!("{:?}", key)))
    }

    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity, or `None` when unbounded.
    fn maxsize(&self) -> Option<usize>;

    /// Drop every entry, keeping the capacity.
    fn clear(&mut self);
}

/// Reject a zero capacity. `None` means unbounded.
pub(crate) fn validate_capacity(maxsize: Option<usize>) -> CacheResult<Option<usize>> {
    match maxsize {
        Some(0) => Err(CacheError::InvalidCapacity(0)),
        other => Ok(other),
    }
}

pub(crate) fn exceeds(len: usize, maxsize: Option<usize>) -> bool {
    maxsize.is_some_and(|max| len > max)
}
