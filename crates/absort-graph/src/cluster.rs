//! Divisive hierarchical clustering ("chenyu")
//!
//! Points are split around `k` sampled centroids, the centroids are ordered
//! by a minimum spanning tree over their pairwise distances, and each part is
//! split again in that order. Consecutive output clusters are close under
//! the distance function, at a cost of roughly `k * n * log_k(n)` distance
//! evaluations instead of `n^2`.

use crate::error::{GraphError, Result};
use crate::weighted::WeightedGraph;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

/// Order `points` into clusters of mutually close points.
///
/// `k` must be at least 2. The same points, `k` and `seed` always produce
/// the same clusters in the same order. Within a cluster, points keep their
/// input order. Every point appears in exactly one cluster.
pub fn chenyu<P, D>(points: &[P], mut distance: D, k: usize, seed: u64) -> Result<Vec<Vec<P>>>
where
    P: Clone,
    D: FnMut(&P, &P) -> f64,
{
    if k < 2 {
        return Err(GraphError::InvalidClusterCount(k));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut pending: Vec<Vec<usize>> = vec![(0..points.len()).collect()];

    while let Some(members) = pending.pop() {
        if members.is_empty() {
            continue;
        }
        if members.len() < k {
            clusters.push(members);
            continue;
        }

        let centroids: Vec<usize> = sample(&mut rng, members.len(), k)
            .into_iter()
            .map(|i| members[i])
            .collect();

        let mut parts: Vec<Vec<usize>> = vec![Vec::new(); k];
        for &member in &members {
            let mut nearest = 0;
            let mut nearest_distance = f64::INFINITY;
            for (slot, &centroid) in centroids.iter().enumerate() {
                let d = distance(&points[centroid], &points[member]);
                if d < nearest_distance {
                    nearest = slot;
                    nearest_distance = d;
                }
            }
            parts[nearest].push(member);
        }

        let occupied: Vec<usize> = (0..k).filter(|&slot| !parts[slot].is_empty()).collect();
        if let [only] = occupied.as_slice() {
            tracing::trace!("{} points collapse onto one centroid", members.len());
            clusters.push(std::mem::take(&mut parts[*only]));
            continue;
        }

        // Centroids are graph nodes by slot, so equal points never merge.
        let mut graph: WeightedGraph<usize> = WeightedGraph::new();
        for a in 0..k {
            for b in (a + 1)..k {
                let weight = distance(&points[centroids[a]], &points[centroids[b]]);
                graph.add_edge(a, b, weight)?;
            }
        }

        let order = graph.minimum_spanning_tree()?;
        tracing::trace!(
            "Split {} points into {} parts, visiting centroids {:?}",
            members.len(),
            occupied.len(),
            order
        );

        for slot in order.into_iter().rev() {
            if !parts[slot].is_empty() {
                pending.push(std::mem::take(&mut parts[slot]));
            }
        }
    }

    Ok(clusters
        .into_iter()
        .map(|cluster| cluster.into_iter().map(|i| points[i].clone()).collect())
        .collect())
}
