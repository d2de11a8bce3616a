//! Component-based clustering.
//!
//! Two variants: strong components label vertices by their strongly-connected
//! component of the directed graph, and highly-connected components refine an
//! undirected graph by repeated global min cuts until every remaining piece
//! is highly connected (min-cut weight exceeding half its vertex count).

use crate::types::{ClusterAssignment, ClusterId, DependencyGraph};
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::NodeIndex;
use std::collections::{BTreeMap, BTreeSet};

/// Strongly-connected-components clustering.
///
/// The partition is exactly the SCC labelling; pruning every edge whose
/// endpoints carry different labels leaves zero inter-cluster edges by
/// construction.
pub fn strong_components_clusters(graph: &DependencyGraph) -> ClusterAssignment {
    let sccs = tarjan_scc(graph.graph());
    ClusterAssignment::from_labels(sccs.into_iter().enumerate().flat_map(|(id, members)| {
        members
            .into_iter()
            .map(move |v| (v, id as ClusterId))
    }))
}

/// Count edges whose endpoints lie in different clusters.
pub fn inter_cluster_edge_count(graph: &DependencyGraph, assignment: &ClusterAssignment) -> usize {
    graph
        .undirected_edges()
        .iter()
        .filter(|(u, v)| !assignment.same_cluster(*u, *v))
        .count()
}

/// Highly-connected-components clustering.
///
/// Works an explicit worklist of vertex sets instead of recursing: pop a
/// set, compute its global min cut, emit it as a cluster when the cut weight
/// exceeds half the set size, otherwise split along the cut and push both
/// sides back. Trivial sets (one vertex, or no internal edges) are emitted
/// per vertex.
pub fn highly_connected_clusters(graph: &DependencyGraph) -> ClusterAssignment {
    let mut labels: BTreeMap<NodeIndex, ClusterId> = BTreeMap::new();
    let mut next_label: ClusterId = 0;

    let all: Vec<NodeIndex> = graph.vertices().collect();
    let mut worklist: Vec<Vec<NodeIndex>> = vec![all];

    while let Some(set) = worklist.pop() {
        if set.is_empty() {
            continue;
        }
        if set.len() == 1 {
            labels.insert(set[0], next_label);
            next_label += 1;
            continue;
        }

        let matrix = induced_matrix(graph, &set);

        // Disconnected induced subgraphs split into their components first;
        // Stoer-Wagner assumes one component.
        let comps = matrix_components(&matrix);
        if comps.len() > 1 {
            for comp in comps {
                worklist.push(comp.into_iter().map(|i| set[i]).collect());
            }
            continue;
        }

        let (cut_weight, side) = stoer_wagner_min_cut(&matrix);
        // Highly connected: edge connectivity above half the vertex count.
        if cut_weight * 2 > set.len() as i64 {
            for &v in &set {
                labels.insert(v, next_label);
            }
            next_label += 1;
            continue;
        }

        let side_set: BTreeSet<usize> = side.iter().copied().collect();
        let mut a = Vec::new();
        let mut b = Vec::new();
        for (i, &v) in set.iter().enumerate() {
            if side_set.contains(&i) {
                a.push(v);
            } else {
                b.push(v);
            }
        }
        worklist.push(a);
        worklist.push(b);
    }

    ClusterAssignment::from_labels(labels)
}

/// Undirected unit-weight adjacency matrix of the induced subgraph.
fn induced_matrix(graph: &DependencyGraph, set: &[NodeIndex]) -> Vec<Vec<i64>> {
    let index: BTreeMap<NodeIndex, usize> =
        set.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let n = set.len();
    let mut m = vec![vec![0i64; n]; n];
    for (u, v) in graph.undirected_edges() {
        if let (Some(&i), Some(&j)) = (index.get(&u), index.get(&v)) {
            m[i][j] = 1;
            m[j][i] = 1;
        }
    }
    m
}

fn matrix_components(m: &[Vec<i64>]) -> Vec<Vec<usize>> {
    let n = m.len();
    let mut seen = vec![false; n];
    let mut comps = Vec::new();
    for start in 0..n {
        if seen[start] {
            continue;
        }
        let mut comp = Vec::new();
        let mut stack = vec![start];
        seen[start] = true;
        while let Some(i) = stack.pop() {
            comp.push(i);
            for (j, &w) in m[i].iter().enumerate() {
                if w > 0 && !seen[j] {
                    seen[j] = true;
                    stack.push(j);
                }
            }
        }
        comp.sort_unstable();
        comps.push(comp);
    }
    comps
}

/// Stoer-Wagner global minimum cut on a connected weighted matrix.
///
/// Returns the cut weight and one side of the cut as indices into the
/// matrix. Requires at least two vertices.
fn stoer_wagner_min_cut(matrix: &[Vec<i64>]) -> (i64, Vec<usize>) {
    let n = matrix.len();
    debug_assert!(n >= 2);

    let mut w: Vec<Vec<i64>> = matrix.to_vec();
    // merged[i] lists the original vertices contracted into i.
    let mut merged: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut active: Vec<usize> = (0..n).collect();

    let mut best_weight = i64::MAX;
    let mut best_side: Vec<usize> = Vec::new();

    while active.len() > 1 {
        // Maximum-adjacency ordering starting from the first active vertex.
        let mut in_a = vec![false; n];
        let mut weights_to_a = vec![0i64; n];
        let mut order: Vec<usize> = Vec::with_capacity(active.len());

        for _ in 0..active.len() {
            let mut pick = usize::MAX;
            for &v in &active {
                if !in_a[v] && (pick == usize::MAX || weights_to_a[v] > weights_to_a[pick]) {
                    pick = v;
                }
            }
            in_a[pick] = true;
            order.push(pick);
            for &v in &active {
                if !in_a[v] {
                    weights_to_a[v] += w[pick][v];
                }
            }
        }

        let t = *order.last().expect("active set is non-empty");
        let s = order[order.len() - 2];
        let cut_of_phase = weights_to_a[t];

        if cut_of_phase < best_weight {
            best_weight = cut_of_phase;
            best_side = merged[t].clone();
        }

        // Contract t into s.
        let absorbed = merged[t].clone();
        merged[s].extend(absorbed);
        for &v in &active {
            if v != s && v != t {
                w[s][v] += w[t][v];
                w[v][s] = w[s][v];
            }
        }
        active.retain(|&v| v != t);
    }

    best_side.sort_unstable();
    (best_weight, best_side)
}
