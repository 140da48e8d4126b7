//! Same-rank tie-break: place structurally similar declarations side by side

use crate::config::SimilarityConfig;
use crate::error::Result;
use crate::model::{Declaration, SyntaxNode};
use absort_graph::{
    BoundedCache, CacheError, EditCost, LfuCache, PqGram, WeightedGraph, chenyu, zhang_shasha,
};
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Insert and delete cost 1. Renaming across kinds costs 1; within a kind it
/// costs the fraction of attribute positions that differ.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeCost;

impl EditCost<SyntaxNode> for ShapeCost {
    fn rename(&self, a: &SyntaxNode, b: &SyntaxNode) -> f64 {
        if a.kind != b.kind {
            return 1.0;
        }
        let width = a.attributes.len().max(b.attributes.len());
        if width == 0 {
            return 0.0;
        }
        let differing = (0..width)
            .filter(|&i| a.attributes.get(i) != b.attributes.get(i))
            .count();
        differing as f64 / width as f64
    }
}

/// Label of a node for pq-gram comparison.
pub fn shape_label(node: &SyntaxNode) -> (String, Vec<String>) {
    (node.kind.clone(), node.attributes.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceAlgorithm {
    ZhangShasha,
    PqGram(PqGram),
}

impl DistanceAlgorithm {
    pub fn distance(&self, a: &SyntaxNode, b: &SyntaxNode) -> f64 {
        match self {
            DistanceAlgorithm::ZhangShasha => {
                zhang_shasha(a, b, SyntaxNode::children, &ShapeCost)
            }
            DistanceAlgorithm::PqGram(shape) => {
                shape.distance(a, b, SyntaxNode::children, shape_label)
            }
        }
    }
}

/// Orders a group of same-rank declarations by structural similarity.
pub struct SimilaritySorter<'c> {
    config: &'c SimilarityConfig,
    pq_gram: PqGram,
    memo_capacity: NonZeroUsize,
}

impl<'c> SimilaritySorter<'c> {
    /// Fails on an invalid pq-gram shape or a zero memo capacity.
    pub fn new(config: &'c SimilarityConfig) -> Result<Self> {
        let pq_gram = PqGram::new(config.pq_p, config.pq_q)?;
        let memo_capacity = NonZeroUsize::new(config.memo_capacity)
            .ok_or(CacheError::InvalidCapacity(config.memo_capacity))?;
        Ok(Self {
            config,
            pq_gram,
            memo_capacity,
        })
    }

    /// Pick the exact algorithm when every shape is small enough.
    pub fn algorithm_for(&self, decls: &[&Declaration]) -> DistanceAlgorithm {
        let threshold = self.config.exact_size_threshold;
        if decls.iter().all(|decl| decl.shape.size() <= threshold) {
            DistanceAlgorithm::ZhangShasha
        } else {
            DistanceAlgorithm::PqGram(self.pq_gram)
        }
    }

    /// Reorder `decls` so that similar shapes are adjacent.
    ///
    /// Groups of at most `cluster_threshold` members are ordered by the
    /// spanning walk of their complete distance graph; larger groups are
    /// clustered with `chenyu` and flattened.
    pub fn sort<'d>(&self, decls: Vec<&'d Declaration>) -> Result<Vec<&'d Declaration>> {
        if !self.config.enabled || decls.len() <= 1 {
            return Ok(decls);
        }

        let algorithm = self.algorithm_for(&decls);
        let count = decls.len();
        tracing::debug!("Ordering {} same-rank declarations with {:?}", count, algorithm);

        let mut memo: LfuCache<(usize, usize), f64> = LfuCache::with_capacity(self.memo_capacity);
        let mut distance = |i: &usize, j: &usize| -> f64 {
            if i == j {
                return 0.0;
            }
            let key = (*i.min(j), *i.max(j));
            if let Some(&known) = memo.lookup(&key) {
                return known;
            }
            let d = algorithm.distance(&decls[key.0].shape, &decls[key.1].shape);
            tracing::trace!("distance({}, {}) = {}", decls[key.0].name, decls[key.1].name, d);
            memo.insert(key, d);
            d
        };

        let order: Vec<usize> = if count > self.config.cluster_threshold {
            let slots: Vec<usize> = (0..count).collect();
            let seed = self.config.seed.unwrap_or(count as u64);
            chenyu(&slots, &mut distance, self.config.cluster_k, seed)?.concat()
        } else {
            let mut graph: WeightedGraph<&str> = WeightedGraph::new();
            for decl in &decls {
                graph.add_node(decl.name.as_str());
            }
            for i in 0..count {
                for j in (i + 1)..count {
                    let weight = distance(&i, &j);
                    graph.add_edge(decls[i].name.as_str(), decls[j].name.as_str(), weight)?;
                }
            }
            let position: HashMap<&str, usize> = decls
                .iter()
                .enumerate()
                .map(|(i, decl)| (decl.name.as_str(), i))
                .collect();
            graph
                .minimum_spanning_tree()?
                .into_iter()
                .filter_map(|name| position.get(name).copied())
                .collect()
        };

        Ok(order.into_iter().map(|i| decls[i]).collect())
    }
}
