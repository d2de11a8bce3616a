//! Shared-nearest-neighbour clustering.
//!
//! An edge's SNN weight is the number of undirected neighbours its endpoints
//! share. Pruning deletes every edge below the threshold and, because a
//! deletion shrinks neighbourhoods, weights are recomputed and the pass
//! repeated until a pass deletes nothing. Running the clustering again on its
//! own pruned output is therefore a no-op.

use crate::types::{ClusterAssignment, ClusterId, DependencyGraph};
use petgraph::stable_graph::NodeIndex;
use std::collections::{BTreeMap, BTreeSet};

/// Undirected simple adjacency used by the pruning fixpoint.
type Adjacency = BTreeMap<NodeIndex, BTreeSet<NodeIndex>>;

fn adjacency_of(graph: &DependencyGraph) -> Adjacency {
    let mut adj: Adjacency = graph.vertices().map(|v| (v, BTreeSet::new())).collect();
    for (u, v) in graph.undirected_edges() {
        if let Some(s) = adj.get_mut(&u) {
            s.insert(v);
        }
        if let Some(s) = adj.get_mut(&v) {
            s.insert(u);
        }
    }
    adj
}

fn snn_weight(adj: &Adjacency, u: NodeIndex, v: NodeIndex) -> usize {
    adj[&u].intersection(&adj[&v]).count()
}

/// Prune edges below the SNN threshold until a fixpoint is reached,
/// returning the surviving adjacency.
fn prune_to_fixpoint(mut adj: Adjacency, threshold: usize) -> Adjacency {
    loop {
        let mut doomed: Vec<(NodeIndex, NodeIndex)> = Vec::new();
        for (&u, nbrs) in &adj {
            for &v in nbrs {
                if u < v && snn_weight(&adj, u, v) < threshold {
                    doomed.push((u, v));
                }
            }
        }
        if doomed.is_empty() {
            return adj;
        }
        for (u, v) in doomed {
            if let Some(s) = adj.get_mut(&u) {
                s.remove(&v);
            }
            if let Some(s) = adj.get_mut(&v) {
                s.remove(&u);
            }
        }
    }
}

fn components(adj: &Adjacency) -> ClusterAssignment {
    let mut label: BTreeMap<NodeIndex, ClusterId> = BTreeMap::new();
    let mut next: ClusterId = 0;
    for &start in adj.keys() {
        if label.contains_key(&start) {
            continue;
        }
        let mut stack = vec![start];
        label.insert(start, next);
        while let Some(v) = stack.pop() {
            for &u in &adj[&v] {
                if !label.contains_key(&u) {
                    label.insert(u, next);
                    stack.push(u);
                }
            }
        }
        next += 1;
    }
    ClusterAssignment::from_labels(label)
}

/// Shared-nearest-neighbour clustering.
///
/// A threshold of zero deletes nothing and the clusters are the connected
/// components of the input.
pub fn snn_clusters(graph: &DependencyGraph, threshold: usize) -> ClusterAssignment {
    let adj = prune_to_fixpoint(adjacency_of(graph), threshold);
    components(&adj)
}

/// The undirected edges surviving SNN pruning, `(u, v)` with `u < v`.
///
/// Exposed so callers can rebuild the pruned graph; feeding it back through
/// [`snn_clusters`] with the same threshold removes nothing further.
pub fn snn_pruned_edges(graph: &DependencyGraph, threshold: usize) -> Vec<(NodeIndex, NodeIndex)> {
    let adj = prune_to_fixpoint(adjacency_of(graph), threshold);
    let mut edges = Vec::new();
    for (&u, nbrs) in &adj {
        for &v in nbrs {
            if u < v {
                edges.push((u, v));
            }
        }
    }
    edges
}
