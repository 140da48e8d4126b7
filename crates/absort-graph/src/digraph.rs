//! Directed dependency graph using petgraph::StableDiGraph keyed by node value

use crate::error::{GraphError, Result};
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

/// An edge `(from, to)` reported by cycle detection.
pub type Edge<N> = (N, N);

/// A directed graph whose nodes are identified by value.
///
/// Edges are unweighted and idempotent. Nodes and successors iterate in
/// insertion order in every traversal, SCC decomposition included, so results
/// are deterministic for a given sequence of `add_node`/`add_edge` calls.
pub struct DirectedGraph<N> {
    inner: StableDiGraph<N, ()>,
    index: HashMap<N, NodeIndex>,
}

impl<N: fmt::Debug> fmt::Debug for DirectedGraph<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectedGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl<N> DirectedGraph<N>
where
    N: Clone + Eq + Hash + fmt::Debug,
{
    pub fn new() -> Self {
        DirectedGraph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Ensure a node is present. Idempotent.
    pub fn add_node(&mut self, node: N) {
        self.intern(node);
    }

    /// Add an edge `v -> w`, registering both endpoints.
    ///
    /// `w` is registered even though it gains no successors, so sinks remain
    /// visible as nodes.
    pub fn add_edge(&mut self, v: N, w: N) -> Result<()> {
        if v == w {
            return Err(GraphError::SelfLoop(format!("{:?}", v)));
        }
        let from = self.intern(v);
        let to = self.intern(w);
        if self.inner.find_edge(from, to).is_none() {
            self.inner.add_edge(from, to, ());
        }
        Ok(())
    }

    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.inner.node_indices().map(move |idx| &self.inner[idx])
    }

    /// Successors of a node in insertion order.
    pub fn successors(&self, node: &N) -> Result<Vec<&N>> {
        let idx = self.lookup(node)?;
        Ok(self
            .children(idx)
            .into_iter()
            .map(|child| &self.inner[child])
            .collect())
    }

    /// Nodes that no other node points to.
    pub fn find_sources(&self) -> Vec<N> {
        self.inner
            .node_indices()
            .filter(|&idx| {
                self.inner
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.inner[idx].clone())
            .collect()
    }

    /// Nodes without successors.
    pub fn find_sinks(&self) -> Vec<N> {
        self.inner
            .node_indices()
            .filter(|&idx| {
                self.inner
                    .neighbors_directed(idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|idx| self.inner[idx].clone())
            .collect()
    }

    /// Whether every node is reachable from the first inserted node.
    pub fn connected(&self) -> bool {
        match self.inner.node_indices().next() {
            None => true,
            Some(entry) => self.bfs_indices(entry).len() == self.inner.node_count(),
        }
    }

    /// Breadth-first traversal from `source`.
    ///
    /// Only nodes reachable from `source` are visited.
    pub fn bfs(&self, source: &N) -> Result<Vec<N>> {
        let start = self.lookup(source)?;
        Ok(self.resolve(self.bfs_indices(start)))
    }

    /// Pre-order depth-first traversal from `source`, using an explicit stack.
    ///
    /// Children are visited in insertion order, matching the recursive
    /// formulation. Only nodes reachable from `source` are visited.
    pub fn dfs(&self, source: &N) -> Result<Vec<N>> {
        let start = self.lookup(source)?;

        let mut stack = vec![start];
        let mut traversed = HashSet::new();
        let mut order = Vec::new();

        while let Some(idx) = stack.pop() {
            if !traversed.insert(idx) {
                continue;
            }
            order.push(idx);
            stack.extend(self.children(idx).into_iter().rev());
        }

        Ok(self.resolve(order))
    }

    /// Return one back edge reachable from `source`, or `None`.
    ///
    /// `None` does not imply the whole graph is acyclic, only the part
    /// reachable from `source`.
    pub fn detect_back_edge(&self, source: &N) -> Result<Option<Edge<N>>> {
        let start = self.lookup(source)?;

        let mut stack = vec![start];
        let mut current_path: Vec<NodeIndex> = Vec::new();
        let mut on_path = HashSet::new();
        let mut traversed = HashSet::new();

        while let Some(&idx) = stack.last() {
            if traversed.contains(&idx) {
                stack.pop();
            } else if current_path.last() != Some(&idx) {
                current_path.push(idx);
                on_path.insert(idx);

                for child in self.children(idx) {
                    if on_path.contains(&child) {
                        return Ok(Some((self.inner[idx].clone(), self.inner[child].clone())));
                    }
                    stack.push(child);
                }
            } else {
                stack.pop();
                current_path.pop();
                on_path.remove(&idx);
                traversed.insert(idx);
            }
        }

        Ok(None)
    }

    /// Return the nodes of one cycle as a closed path `[n0, .., nk, n0]`,
    /// or an empty vector when the graph is acyclic.
    ///
    /// Not intended to enumerate all cycles.
    pub fn detect_cycle(&self) -> Vec<N> {
        let mut traversed: HashSet<NodeIndex> = HashSet::new();

        for entry in self.inner.node_indices() {
            if traversed.contains(&entry) {
                continue;
            }

            let mut stack = vec![entry];
            let mut path: Vec<NodeIndex> = Vec::new();
            let mut position: HashMap<NodeIndex, usize> = HashMap::new();

            while let Some(&idx) = stack.last() {
                if traversed.contains(&idx) {
                    stack.pop();
                } else if path.last() != Some(&idx) {
                    path.push(idx);
                    position.insert(idx, path.len() - 1);

                    for child in self.children(idx) {
                        if let Some(&start) = position.get(&child) {
                            let mut cycle = path[start..].to_vec();
                            cycle.push(child);
                            return self.resolve(cycle);
                        }
                        stack.push(child);
                    }
                } else {
                    path.pop();
                    position.remove(&idx);
                    stack.pop();
                    traversed.insert(idx);
                }
            }
        }

        Vec::new()
    }

    /// Strongly connected components (Tarjan, explicit stack).
    ///
    /// Components come out in reverse topological order of the condensation:
    /// a component is listed before every component that depends on it.
    /// Every node appears in exactly one component, members in discovery
    /// order. Roots and successors are visited in insertion order.
    pub fn strongly_connected_components(&self) -> Vec<Vec<N>> {
        let mut state = SccState::default();
        let mut components: Vec<Vec<N>> = Vec::new();

        for root in self.inner.node_indices() {
            if state.discovery.contains_key(&root) {
                continue;
            }
            state.enter(root, self.children(root));

            while let Some((idx, children, next)) = state.calls.last_mut() {
                let idx = *idx;
                if let Some(&child) = children.get(*next) {
                    *next += 1;
                    if !state.discovery.contains_key(&child) {
                        state.enter(child, self.children(child));
                    } else if state.on_stack.contains(&child) {
                        state.lower(idx, state.discovery[&child]);
                    }
                    continue;
                }

                state.calls.pop();
                let low = state.lowlink[&idx];
                if let Some(&(parent, _, _)) = state.calls.last() {
                    state.lower(parent, low);
                }
                if low == state.discovery[&idx] {
                    components.push(self.resolve(state.pop_component(idx)));
                }
            }
        }

        components
    }

    /// Strict topological sort, sources first.
    pub fn topological_sort(&self, reverse: bool) -> Result<Vec<N>> {
        self.topological_sort_by(reverse, |rank| rank)
    }

    /// Strict topological sort with a caller-supplied order for each rank.
    ///
    /// Each round emits every current source, ordered by `same_rank_sorter`,
    /// then removes them. With `reverse`, sinks are peeled instead. Fails with
    /// `CircularDependency` when nodes remain but none of them is a source.
    ///
    /// Note that `reverse = true` is not the reversal of `reverse = false`.
    pub fn topological_sort_by<F>(&self, reverse: bool, same_rank_sorter: F) -> Result<Vec<N>>
    where
        F: FnMut(Vec<N>) -> Vec<N>,
    {
        if reverse {
            return self.transpose().topological_sort_by(false, same_rank_sorter);
        }

        let (order, remaining) = self.peel_sources(same_rank_sorter);
        if !remaining.is_empty() {
            return Err(GraphError::CircularDependency);
        }
        Ok(order)
    }

    /// Cycle-tolerant topological sort.
    pub fn relaxed_topological_sort(&self, reverse: bool) -> Vec<N> {
        self.relaxed_topological_sort_by(reverse, |rank| rank)
    }

    /// Like [`topological_sort_by`](Self::topological_sort_by), but when only
    /// cyclic nodes remain they are emitted as one final rank instead of failing.
    pub fn relaxed_topological_sort_by<F>(&self, reverse: bool, mut same_rank_sorter: F) -> Vec<N>
    where
        F: FnMut(Vec<N>) -> Vec<N>,
    {
        if reverse {
            return self
                .transpose()
                .relaxed_topological_sort_by(false, same_rank_sorter);
        }

        let (mut order, remaining) = self.peel_sources(&mut same_rank_sorter);
        if !remaining.is_empty() {
            tracing::debug!(
                "Cycle among {} nodes, emitting them as one rank",
                remaining.len()
            );
            order.extend(same_rank_sorter(self.resolve(remaining)));
        }
        order
    }

    /// Graph with every edge reversed. All nodes are kept, in the same order.
    pub fn transpose(&self) -> DirectedGraph<N> {
        let mut transposed = DirectedGraph::new();
        for idx in self.inner.node_indices() {
            transposed.add_node(self.inner[idx].clone());
        }
        for idx in self.inner.node_indices() {
            for child in self.children(idx) {
                let from = transposed.index[&self.inner[child]];
                let to = transposed.index[&self.inner[idx]];
                transposed.inner.add_edge(from, to, ());
            }
        }
        transposed
    }

    fn intern(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.inner.add_node(node.clone());
        self.index.insert(node, idx);
        idx
    }

    fn lookup(&self, node: &N) -> Result<NodeIndex> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(format!("{:?}", node)))
    }

    /// Successor indices in insertion order.
    ///
    /// petgraph lists neighbours most recently added first.
    fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .inner
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    fn bfs_indices(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut queue = VecDeque::from([start]);
        let mut traversed = HashSet::new();
        let mut order = Vec::new();

        while let Some(idx) = queue.pop_front() {
            if !traversed.insert(idx) {
                continue;
            }
            order.push(idx);
            queue.extend(self.children(idx));
        }

        order
    }

    /// Kahn's algorithm grouped by rank. Returns the emitted order and the
    /// indices that could not be emitted because they sit on or behind a cycle.
    fn peel_sources<F>(&self, mut same_rank_sorter: F) -> (Vec<N>, Vec<NodeIndex>)
    where
        F: FnMut(Vec<N>) -> Vec<N>,
    {
        let mut indegree: HashMap<NodeIndex, usize> = self
            .inner
            .node_indices()
            .map(|idx| {
                let degree = self
                    .inner
                    .neighbors_directed(idx, Direction::Incoming)
                    .count();
                (idx, degree)
            })
            .collect();

        let mut sources: Vec<NodeIndex> = self
            .inner
            .node_indices()
            .filter(|idx| indegree[idx] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.inner.node_count());
        let mut emitted = HashSet::new();

        while !sources.is_empty() {
            order.extend(same_rank_sorter(self.resolve(sources.clone())));
            emitted.extend(sources.iter().copied());

            let mut next = Vec::new();
            for &idx in &sources {
                for child in self.children(idx) {
                    if let Some(degree) = indegree.get_mut(&child) {
                        *degree -= 1;
                        if *degree == 0 {
                            next.push(child);
                        }
                    }
                }
            }
            sources = next;
        }

        let remaining = self
            .inner
            .node_indices()
            .filter(|idx| !emitted.contains(idx))
            .collect();

        (order, remaining)
    }

    fn resolve(&self, indices: Vec<NodeIndex>) -> Vec<N> {
        indices
            .into_iter()
            .map(|idx| self.inner[idx].clone())
            .collect()
    }
}

/// Bookkeeping for the explicit-stack Tarjan walk.
#[derive(Default)]
struct SccState {
    discovery: HashMap<NodeIndex, usize>,
    lowlink: HashMap<NodeIndex, usize>,
    on_stack: HashSet<NodeIndex>,
    pending: Vec<NodeIndex>,
    /// (node, its successors, next successor to look at)
    calls: Vec<(NodeIndex, Vec<NodeIndex>, usize)>,
}

impl SccState {
    fn enter(&mut self, idx: NodeIndex, children: Vec<NodeIndex>) {
        let order = self.discovery.len();
        self.discovery.insert(idx, order);
        self.lowlink.insert(idx, order);
        self.on_stack.insert(idx);
        self.pending.push(idx);
        self.calls.push((idx, children, 0));
    }

    fn lower(&mut self, idx: NodeIndex, candidate: usize) {
        if let Some(low) = self.lowlink.get_mut(&idx) {
            *low = (*low).min(candidate);
        }
    }

    /// Pop the component rooted at `root`, in discovery order.
    fn pop_component(&mut self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut component = Vec::new();
        while let Some(member) = self.pending.pop() {
            self.on_stack.remove(&member);
            component.push(member);
            if member == root {
                break;
            }
        }
        component.reverse();
        component
    }
}

impl<N> Clone for DirectedGraph<N>
where
    N: Clone,
{
    /// Copies the adjacency structure. Node values are cloned, not rebuilt.
    fn clone(&self) -> Self {
        DirectedGraph {
            inner: self.inner.clone(),
            index: self.index.clone(),
        }
    }
}

impl<N> Default for DirectedGraph<N>
where
    N: Clone + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Display for DirectedGraph<N>
where
    N: Clone + Eq + Hash + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirectedGraph({{")?;
        for (i, idx) in self.inner.node_indices().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let children: Vec<&N> = self
                .children(idx)
                .into_iter()
                .map(|child| &self.inner[child])
                .collect();
            write!(f, "{:?}: {:?}", self.inner[idx], children)?;
        }
        write!(f, "}})")
    }
}
