//! ABSort graph engine: dependency graphs, spanning orders, tree distances,
//! clustering and bounded caches

pub mod cache;
pub mod cluster;
pub mod digest;
pub mod digraph;
pub mod error;
pub mod lfu;
pub mod lru;
pub mod pqgram;
pub mod treedist;
pub mod weighted;

#[cfg(test)]
pub mod tests;

pub use cache::BoundedCache;
pub use cluster::chenyu;
pub use digest::{Digest, stable_digest};
pub use digraph::{DirectedGraph, Edge};
pub use error::{CacheError, CacheResult, GraphError, Result};
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use pqgram::{PqGram, PqGramIndex};
pub use treedist::{EditCost, UnitCost, tree_size, zhang_shasha};
pub use weighted::{Weight, WeightedGraph};
