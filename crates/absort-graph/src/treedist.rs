//! Zhang-Shasha tree edit distance over caller-supplied trees
//!
//! Trees are any `T` with a children accessor. Both inputs are flattened into
//! arenas first, so a forest is a list of arena ids and two structurally equal
//! subtrees at different positions are still distinct memo entries.

use crate::cache::BoundedCache;
use crate::lru::LruCache;
use std::num::NonZeroUsize;

/// Upper bound on memoized forest pairs per distance computation.
pub const MEMO_CAPACITY: usize = 1 << 16;

/// Per-operation costs of editing one tree into another.
pub trait EditCost<T: ?Sized> {
    fn insert(&self, _node: &T) -> f64 {
        1.0
    }

    fn delete(&self, _node: &T) -> f64 {
        1.0
    }

    /// Cost of relabelling `a` as `b`. Must be zero for identical nodes.
    fn rename(&self, a: &T, b: &T) -> f64;
}

/// Unit insert and delete; rename costs 1 unless the nodes compare equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitCost;

impl<T: PartialEq + ?Sized> EditCost<T> for UnitCost {
    fn rename(&self, a: &T, b: &T) -> f64 {
        if a == b { 0.0 } else { 1.0 }
    }
}

/// Number of nodes in a tree, root included.
pub fn tree_size<T, F>(root: &T, children: F) -> usize
where
    F: Fn(&T) -> &[T],
{
    let mut size = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        size += 1;
        stack.extend(children(node));
    }
    size
}

type Forest = Vec<u32>;

struct Arena<'t, T> {
    nodes: Vec<&'t T>,
    children: Vec<Vec<u32>>,
}

impl<'t, T> Arena<'t, T> {
    fn flatten<F>(root: &'t T, children: &F) -> Self
    where
        F: Fn(&T) -> &[T],
    {
        let mut arena = Arena {
            nodes: vec![root],
            children: vec![Vec::new()],
        };
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            let node = arena.nodes[id];
            let mut ids = Vec::new();
            for child in children(node) {
                let child_id = arena.nodes.len();
                arena.nodes.push(child);
                arena.children.push(Vec::new());
                ids.push(child_id as u32);
                stack.push(child_id);
            }
            arena.children[id] = ids;
        }
        arena
    }

    fn node(&self, id: u32) -> &'t T {
        self.nodes[id as usize]
    }

    /// Replace the rightmost tree of a non-empty forest by its children.
    fn remove_rightmost_root(&self, forest: &[u32]) -> Forest {
        let Some((&last, rest)) = forest.split_last() else {
            return Vec::new();
        };
        let mut reduced = rest.to_vec();
        reduced.extend_from_slice(&self.children[last as usize]);
        reduced
    }
}

#[derive(Clone, Copy)]
enum Case {
    BothEmpty,
    Insert,
    Delete,
    SingleTrees,
    General,
}

/// One pending `forest_distance(f1, f2)` evaluation and the sub-results
/// gathered for it so far.
struct Frame {
    f1: Forest,
    f2: Forest,
    case: Case,
    deps: Vec<(Forest, Forest)>,
    results: Vec<f64>,
}

/// Zhang-Shasha edit distance between two trees.
///
/// Evaluated as an explicit worklist over forest pairs, so tree depth is
/// bounded by heap memory rather than the call stack.
pub fn zhang_shasha<T, F, C>(tree1: &T, tree2: &T, children: F, cost: &C) -> f64
where
    F: Fn(&T) -> &[T],
    C: EditCost<T> + ?Sized,
{
    let left = Arena::flatten(tree1, &children);
    let right = Arena::flatten(tree2, &children);

    let mut memo: LruCache<(Forest, Forest), f64> = NonZeroUsize::new(MEMO_CAPACITY)
        .map_or_else(LruCache::unbounded, LruCache::with_capacity);

    let mut stack = vec![Frame::plan(&left, &right, vec![0], vec![0])];

    loop {
        let Some(frame) = stack.last_mut() else {
            return 0.0;
        };

        if let Some((d1, d2)) = frame.deps.get(frame.results.len()) {
            let key = (d1.clone(), d2.clone());
            match memo.lookup(&key) {
                Some(&value) => frame.results.push(value),
                None => {
                    let (d1, d2) = key;
                    let next = Frame::plan(&left, &right, d1, d2);
                    stack.push(next);
                }
            }
            continue;
        }

        let Some(done) = stack.pop() else {
            return 0.0;
        };
        let value = done.combine(&left, &right, cost);
        match stack.last_mut() {
            Some(parent) => {
                parent.results.push(value);
                memo.insert((done.f1, done.f2), value);
            }
            None => {
                tracing::trace!(
                    "Tree edit distance {} over {}x{} nodes ({} memoized)",
                    value,
                    left.nodes.len(),
                    right.nodes.len(),
                    memo.len()
                );
                return value;
            }
        }
    }
}

impl Frame {
    fn plan<T>(left: &Arena<'_, T>, right: &Arena<'_, T>, f1: Forest, f2: Forest) -> Self {
        let (case, deps) = match (f1.is_empty(), f2.is_empty()) {
            (true, true) => (Case::BothEmpty, Vec::new()),
            (true, false) => (
                Case::Insert,
                vec![(f1.clone(), right.remove_rightmost_root(&f2))],
            ),
            (false, true) => (
                Case::Delete,
                vec![(left.remove_rightmost_root(&f1), f2.clone())],
            ),
            (false, false) => {
                let reduced1 = left.remove_rightmost_root(&f1);
                let reduced2 = right.remove_rightmost_root(&f2);
                let mut deps = vec![
                    (reduced1.clone(), f2.clone()),
                    (f1.clone(), reduced2.clone()),
                ];
                if f1.len() == 1 && f2.len() == 1 {
                    deps.push((reduced1, reduced2));
                    (Case::SingleTrees, deps)
                } else {
                    let (n1, n2) = (f1.len() - 1, f2.len() - 1);
                    deps.push((f1[..n1].to_vec(), f2[..n2].to_vec()));
                    deps.push((vec![f1[n1]], vec![f2[n2]]));
                    (Case::General, deps)
                }
            }
        };
        Frame {
            f1,
            f2,
            case,
            deps,
            results: Vec::new(),
        }
    }

    fn combine<T, C>(&self, left: &Arena<'_, T>, right: &Arena<'_, T>, cost: &C) -> f64
    where
        C: EditCost<T> + ?Sized,
    {
        let r = &self.results;
        let last1 = self.f1.last().map(|&id| left.node(id));
        let last2 = self.f2.last().map(|&id| right.node(id));

        match (self.case, last1, last2) {
            (Case::Insert, _, Some(b)) => r[0] + cost.insert(b),
            (Case::Delete, Some(a), _) => r[0] + cost.delete(a),
            (Case::SingleTrees, Some(a), Some(b)) => (r[0] + cost.delete(a))
                .min(r[1] + cost.insert(b))
                .min(r[2] + cost.rename(a, b)),
            (Case::General, Some(a), Some(b)) => (r[0] + cost.delete(a))
                .min(r[1] + cost.insert(b))
                .min(r[2] + r[3]),
            _ => 0.0,
        }
    }
}
