//! k-spanning-tree clustering.
//!
//! Compute a minimum spanning forest, then prune the heaviest surviving
//! forest edge exactly `k - 1` times; the connected components of what is
//! left are the clusters. Pruning a spanning tree `k - 1` times yields `k`
//! clusters, hence the name.

use super::mst::{minimum_spanning_forest, MstAlgorithm, MstEdge};
use crate::types::{ClusterAssignment, ClusterId, DependencyGraph, WeightRepository};
use petgraph::stable_graph::NodeIndex;
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;

/// Cluster a graph into (up to) `k` groups by spanning-tree pruning.
///
/// Removal stops early when the forest runs out of edges, so sparse or
/// disconnected graphs may produce more than `k` clusters and small `k` on a
/// disconnected graph cannot merge components.
///
/// # Panics
/// Panics if `k < 1`; asking for zero clusters is a precondition violation.
pub fn k_spanning_tree_clusters(
    graph: &DependencyGraph,
    weights: &WeightRepository,
    k: usize,
    algorithm: MstAlgorithm,
) -> ClusterAssignment {
    assert!(k >= 1, "k-spanning-tree requires k >= 1, got {k}");

    let mut forest = minimum_spanning_forest(graph, weights, algorithm);

    // Ascending sort, then drop the k-1 heaviest from the tail; weight ties
    // resolve by endpoint index so both MST algorithms prune identically.
    forest.sort_by_key(|e| (e.weight, e.source, e.target));
    let keep = forest.len().saturating_sub(k - 1);
    forest.truncate(keep);

    components_of(graph, &forest)
}

/// Connected components of the graph restricted to the given forest edges.
fn components_of(graph: &DependencyGraph, forest: &[MstEdge]) -> ClusterAssignment {
    let dense: HashMap<NodeIndex, usize> = graph
        .vertices()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();

    let mut uf = UnionFind::<usize>::new(dense.len());
    for e in forest {
        uf.union(dense[&e.source], dense[&e.target]);
    }

    ClusterAssignment::from_labels(
        graph
            .vertices()
            .map(|v| (v, uf.find(dense[&v]) as ClusterId)),
    )
}
