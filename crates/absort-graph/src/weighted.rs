//! Undirected weighted graph with a deterministic minimum spanning tree walk

use crate::digest::{Digest, stable_digest};
use crate::error::{GraphError, Result};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

pub type Weight = f64;

/// An undirected weighted graph whose nodes are identified by value.
///
/// Each unordered pair carries at most one weight; adding an existing edge
/// again overwrites its weight.
#[derive(Clone)]
pub struct WeightedGraph<N> {
    inner: StableUnGraph<N, Weight>,
    index: HashMap<N, NodeIndex>,
}

impl<N: fmt::Debug> fmt::Debug for WeightedGraph<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeightedGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl<N> WeightedGraph<N>
where
    N: Clone + Eq + Hash + fmt::Debug + Serialize,
{
    pub fn new() -> Self {
        WeightedGraph {
            inner: StableUnGraph::default(),
            index: HashMap::new(),
        }
    }

    /// Ensure a node is present. Idempotent.
    pub fn add_node(&mut self, node: N) {
        self.intern(node);
    }

    /// Add the edge `{v, w}` with the given weight.
    pub fn add_edge(&mut self, v: N, w: N, weight: Weight) -> Result<()> {
        if v == w {
            return Err(GraphError::SelfLoop(format!("{:?}", v)));
        }
        let a = self.intern(v);
        let b = self.intern(w);
        match self.inner.find_edge(a, b) {
            Some(edge) => self.inner[edge] = weight,
            None => {
                self.inner.add_edge(a, b, weight);
            }
        }
        Ok(())
    }

    /// Remove the edge `{v, w}`. No-op when absent.
    pub fn remove_edge(&mut self, v: &N, w: &N) {
        if let (Some(&a), Some(&b)) = (self.index.get(v), self.index.get(w)) {
            if let Some(edge) = self.inner.find_edge(a, b) {
                self.inner.remove_edge(edge);
            }
        }
    }

    /// Weight of the edge `{v, w}`.
    pub fn weight(&self, v: &N, w: &N) -> Result<Weight> {
        let missing = || GraphError::EdgeNotFound(format!("{:?}", v), format!("{:?}", w));
        let a = *self.index.get(v).ok_or_else(missing)?;
        let b = *self.index.get(w).ok_or_else(missing)?;
        self.inner
            .find_edge(a, b)
            .map(|edge| self.inner[edge])
            .ok_or_else(missing)
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    pub fn num_nodes(&self) -> usize {
        self.inner.node_count()
    }

    pub fn num_edges(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.inner.node_indices().map(move |idx| &self.inner[idx])
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.index.clear();
    }

    /// The edge with globally minimum weight; the earliest inserted wins ties.
    pub fn find_minimum_edge(&self) -> Result<(N, N)> {
        let mut best: Option<(NodeIndex, NodeIndex, Weight)> = None;
        for edge in self.inner.edge_references() {
            let weight = *edge.weight();
            if best.is_none_or(|(_, _, w)| weight < w) {
                best = Some((edge.source(), edge.target(), weight));
            }
        }
        best.map(|(a, b, _)| (self.inner[a].clone(), self.inner[b].clone()))
            .ok_or(GraphError::NoMinimumEdge)
    }

    /// Visit every node in Prim order, starting from the minimum edge.
    ///
    /// The result is a node ordering, not an edge set: each node after the
    /// first two is the unseen endpoint of the lightest edge leaving the
    /// visited set. The two seed endpoints are ordered by ascending digest and
    /// equal-weight candidates prefer the endpoint with the smaller digest, so
    /// the order only depends on node contents, weights, and insertion order.
    ///
    /// A graph without edges yields its nodes in insertion order. A graph with
    /// edges that does not reach every node fails with `Disconnected`.
    pub fn minimum_spanning_tree(&self) -> Result<Vec<N>> {
        if self.inner.edge_count() == 0 {
            return Ok(self.nodes().cloned().collect());
        }

        let digests: HashMap<NodeIndex, Digest> = self
            .inner
            .node_indices()
            .map(|idx| -> Result<(NodeIndex, Digest)> {
                Ok((idx, stable_digest(&self.inner[idx])?))
            })
            .collect::<Result<_>>()?;

        let (first, second) = self.minimum_edge_indices()?;
        let mut seed = [first, second];
        seed.sort_by_key(|idx| digests[idx]);

        let mut seen: HashSet<NodeIndex> = seed.iter().copied().collect();
        let mut order = seed.to_vec();

        while order.len() < self.inner.node_count() {
            let mut best: Option<(NodeIndex, Weight)> = None;

            for edge in self.inner.edge_references() {
                let unseen = match (seen.contains(&edge.source()), seen.contains(&edge.target())) {
                    (true, false) => edge.target(),
                    (false, true) => edge.source(),
                    _ => continue,
                };
                let weight = *edge.weight();
                let better = match best {
                    None => true,
                    Some((current, w)) => {
                        weight < w || (weight == w && digests[&unseen] < digests[&current])
                    }
                };
                if better {
                    best = Some((unseen, weight));
                }
            }

            let (next, _) = best.ok_or(GraphError::Disconnected)?;
            seen.insert(next);
            order.push(next);
        }

        tracing::trace!("Spanning order over {} nodes", order.len());

        Ok(order.into_iter().map(|idx| self.inner[idx].clone()).collect())
    }

    fn minimum_edge_indices(&self) -> Result<(NodeIndex, NodeIndex)> {
        let (a, b) = self.find_minimum_edge()?;
        Ok((self.index[&a], self.index[&b]))
    }

    fn intern(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.inner.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }
}

impl<N> Default for WeightedGraph<N>
where
    N: Clone + Eq + Hash + fmt::Debug + Serialize,
{
    fn default() -> Self {
        Self::new()
    }
}
