//! PQ-Gram approximate tree distance
//!
//! A pq-gram is a window of `p` ancestor labels (the stem) followed by `q`
//! consecutive sibling labels (the base), padded with blanks. Two trees are
//! compared through the multisets of their pq-grams, which takes time linear
//! in tree size instead of the cubic Zhang-Shasha program.

use crate::error::{GraphError, Result};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Multiset of pq-grams; `None` is the blank padding label.
pub type PqGramIndex<L> = HashMap<Vec<Option<L>>, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PqGram {
    p: usize,
    q: usize,
}

impl Default for PqGram {
    fn default() -> Self {
        PqGram { p: 2, q: 3 }
    }
}

impl PqGram {
    pub fn new(p: usize, q: usize) -> Result<Self> {
        if p == 0 || q == 0 {
            return Err(GraphError::InvalidPqGramShape { p, q });
        }
        Ok(PqGram { p, q })
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn q(&self) -> usize {
        self.q
    }

    /// Build the pq-gram multiset of a tree.
    pub fn index<T, L, F, G>(&self, root: &T, children: F, label: G) -> PqGramIndex<L>
    where
        L: Clone + Eq + Hash,
        F: Fn(&T) -> &[T],
        G: Fn(&T) -> L,
    {
        let mut index = PqGramIndex::new();
        let root_stem = self.shift(&vec![None; self.p], Some(label(root)));
        let mut stack = vec![(root, root_stem)];

        while let Some((node, stem)) = stack.pop() {
            let kids = children(node);
            let mut base: VecDeque<Option<L>> = std::iter::repeat_n(None, self.q).collect();

            if kids.is_empty() {
                *index.entry(gram(&stem, &base)).or_default() += 1;
                continue;
            }

            for child in kids {
                let child_label = label(child);
                slide(&mut base, Some(child_label.clone()));
                *index.entry(gram(&stem, &base)).or_default() += 1;
                stack.push((child, self.shift(&stem, Some(child_label))));
            }
            for _ in 1..self.q {
                slide(&mut base, None);
                *index.entry(gram(&stem, &base)).or_default() += 1;
            }
        }

        index
    }

    /// Normalized pq-gram distance in `[0, 1]`.
    ///
    /// Identical trees score 0. The score is symmetric in its arguments.
    pub fn distance<T, L, F, G>(&self, tree1: &T, tree2: &T, children: F, label: G) -> f64
    where
        L: Clone + Eq + Hash,
        F: Fn(&T) -> &[T],
        G: Fn(&T) -> L,
    {
        let index1 = self.index(tree1, &children, &label);
        let index2 = self.index(tree2, &children, &label);
        index_distance(&index1, &index2)
    }

    fn shift<L: Clone>(&self, stem: &[Option<L>], next: Option<L>) -> Vec<Option<L>> {
        let mut shifted: Vec<Option<L>> = stem.iter().skip(1).cloned().collect();
        shifted.push(next);
        shifted
    }
}

/// Normalized symmetric difference of two pq-gram multisets.
pub fn index_distance<L: Eq + Hash>(index1: &PqGramIndex<L>, index2: &PqGramIndex<L>) -> f64 {
    let mut difference = 0usize;
    let mut total = 0usize;

    for (gram, &c1) in index1 {
        let c2 = index2.get(gram).copied().unwrap_or(0);
        difference += c1.abs_diff(c2);
        total += c1.max(c2);
    }
    for (gram, &c2) in index2 {
        if !index1.contains_key(gram) {
            difference += c2;
            total += c2;
        }
    }

    if total == 0 {
        return 0.0;
    }
    difference as f64 / total as f64
}

fn slide<L>(window: &mut VecDeque<Option<L>>, next: Option<L>) {
    window.pop_front();
    window.push_back(next);
}

fn gram<L: Clone>(stem: &[Option<L>], base: &VecDeque<Option<L>>) -> Vec<Option<L>> {
    stem.iter().chain(base.iter()).cloned().collect()
}
