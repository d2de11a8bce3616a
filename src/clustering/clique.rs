//! Maximal-clique clustering.
//!
//! Enumerates maximal cliques of the undirected simple view with
//! Bron-Kerbosch (pivoting), then keeps only the single largest clique as
//! the dominant cluster. This variant deliberately does not produce a
//! covering partition of cliques; vertices outside the winner keep singleton
//! ids so the assignment stays total.

use crate::types::{ClusterAssignment, ClusterId, DependencyGraph};
use petgraph::stable_graph::NodeIndex;
use std::collections::{BTreeMap, BTreeSet};

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

/// Enumerate all maximal cliques in deterministic order.
pub fn maximal_cliques(graph: &DependencyGraph) -> Vec<Vec<NodeIndex>> {
    let adj = adjacency_of(graph);
    let mut cliques = Vec::new();
    let candidates: BTreeSet<NodeIndex> = adj.keys().copied().collect();
    bron_kerbosch(
        &adj,
        &mut BTreeSet::new(),
        candidates,
        BTreeSet::new(),
        &mut cliques,
    );
    cliques
}

fn bron_kerbosch(
    adj: &Adjacency,
    current: &mut BTreeSet<NodeIndex>,
    mut candidates: BTreeSet<NodeIndex>,
    mut excluded: BTreeSet<NodeIndex>,
    out: &mut Vec<Vec<NodeIndex>>,
) {
    if candidates.is_empty() && excluded.is_empty() {
        // The root call on an empty graph reaches here with nothing
        // accumulated; the empty set is not a clique.
        if !current.is_empty() {
            out.push(current.iter().copied().collect());
        }
        return;
    }

    // Pivot on the candidate/excluded vertex with the most candidate
    // neighbours, ties to the lowest vertex index; only non-neighbours of
    // the pivot need expansion.
    let pivot = candidates
        .iter()
        .chain(excluded.iter())
        .copied()
        .max_by_key(|v| {
            (
                adj[v].intersection(&candidates).count(),
                std::cmp::Reverse(*v),
            )
        })
        .expect("candidate or excluded set is non-empty");
    let expand: Vec<NodeIndex> = candidates.difference(&adj[&pivot]).copied().collect();

    for v in expand {
        let nbrs = &adj[&v];
        current.insert(v);
        bron_kerbosch(
            adj,
            current,
            candidates.intersection(nbrs).copied().collect(),
            excluded.intersection(nbrs).copied().collect(),
            out,
        );
        current.remove(&v);
        candidates.remove(&v);
        excluded.insert(v);
    }
}

/// The single largest maximal clique; ties broken by enumeration order.
pub fn largest_clique(graph: &DependencyGraph) -> Vec<NodeIndex> {
    let mut best: Vec<NodeIndex> = Vec::new();
    for clique in maximal_cliques(graph) {
        if clique.len() > best.len() {
            best = clique;
        }
    }
    best
}

/// Maximal-clique-enumeration clustering.
///
/// The winning clique becomes cluster 0; every remaining vertex gets its own
/// singleton id, keeping the assignment total without pretending the
/// algorithm produced a covering clique partition.
pub fn clique_clusters(graph: &DependencyGraph) -> ClusterAssignment {
    let winner: BTreeSet<NodeIndex> = largest_clique(graph).into_iter().collect();
    let mut labels: BTreeMap<NodeIndex, ClusterId> = BTreeMap::new();
    let mut next: ClusterId = 1;
    for v in graph.vertices() {
        if winner.contains(&v) {
            labels.insert(v, 0);
        } else {
            labels.insert(v, next);
            next += 1;
        }
    }
    ClusterAssignment::from_labels(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_largest_clique() {
        // A 4-clique {0,1,2,3} and a triangle {4,5,6} sharing vertex 3 via
        // an edge.
        let mut g = DependencyGraph::new();
        let vs: Vec<NodeIndex> = (0..7).map(|i| g.add_vertex(format!("v{i}"))).collect();
        for i in 0..4 {
            for j in (i + 1)..4 {
                g.add_dependency(vs[i], vs[j], "calls");
            }
        }
        g.add_dependency(vs[4], vs[5], "calls");
        g.add_dependency(vs[5], vs[6], "calls");
        g.add_dependency(vs[4], vs[6], "calls");
        g.add_dependency(vs[3], vs[4], "calls");

        let clique = largest_clique(&g);
        assert_eq!(clique, vec![vs[0], vs[1], vs[2], vs[3]]);
    }

    #[test]
    fn test_clique_clusters_total_with_singleton_rest() {
        let mut g = DependencyGraph::new();
        let vs: Vec<NodeIndex> = (0..5).map(|i| g.add_vertex(format!("v{i}"))).collect();
        // Triangle {0,1,2}; 3 and 4 attached by single edges.
        g.add_dependency(vs[0], vs[1], "calls");
        g.add_dependency(vs[1], vs[2], "calls");
        g.add_dependency(vs[0], vs[2], "calls");
        g.add_dependency(vs[2], vs[3], "calls");
        g.add_dependency(vs[3], vs[4], "calls");

        let a = clique_clusters(&g);
        assert_eq!(a.len(), 5);
        assert_eq!(a.cluster_count(), 3);
        assert!(a.same_cluster(vs[0], vs[1]));
        assert!(a.same_cluster(vs[1], vs[2]));
        assert!(!a.same_cluster(vs[3], vs[4]));
    }

    #[test]
    fn test_tie_broken_by_enumeration_order() {
        // Two disjoint triangles: the one containing the lowest vertex wins.
        let mut g = DependencyGraph::new();
        let vs: Vec<NodeIndex> = (0..6).map(|i| g.add_vertex(format!("v{i}"))).collect();
        for t in [[0, 1, 2], [3, 4, 5]] {
            g.add_dependency(vs[t[0]], vs[t[1]], "calls");
            g.add_dependency(vs[t[1]], vs[t[2]], "calls");
            g.add_dependency(vs[t[0]], vs[t[2]], "calls");
        }

        let clique = largest_clique(&g);
        assert_eq!(clique, vec![vs[0], vs[1], vs[2]]);

        let a = clique_clusters(&g);
        assert!(a.same_cluster(vs[0], vs[2]));
        assert!(!a.same_cluster(vs[3], vs[4]));
    }

    #[test]
    fn test_edgeless_graph_is_all_singletons() {
        let mut g = DependencyGraph::new();
        for i in 0..3 {
            g.add_vertex(format!("v{i}"));
        }
        let a = clique_clusters(&g);
        assert_eq!(a.cluster_count(), 3);
    }

    #[test]
    fn test_empty_graph() {
        let g = DependencyGraph::new();
        assert!(maximal_cliques(&g).is_empty());
        assert!(largest_clique(&g).is_empty());
        assert!(clique_clusters(&g).is_empty());
    }
}
