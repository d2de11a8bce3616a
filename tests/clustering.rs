//! Scenario tests for the clustering layer.
//!
//! These exercise the public clustering API end to end: weighted graphs
//! built through the dependency-type/weight-repository split, the full
//! clusterer registry, and the determinism guarantees.

use archviz_kernel::clustering::{
    compute_clusters, highly_connected_clusters, inter_cluster_edge_count,
    k_spanning_tree_clusters, snn_clusters, snn_pruned_edges, strong_components_clusters,
    Clusterer, ClusteringParams, MstAlgorithm,
};
use archviz_kernel::{DependencyGraph, WeightRepository};
use petgraph::stable_graph::NodeIndex;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Build a graph from weighted undirected edges. Each weight gets its own
/// dependency type in the repository, so edge weights are independent.
fn weighted_graph(
    n: usize,
    edges: &[(usize, usize, i64)],
) -> (DependencyGraph, WeightRepository, Vec<NodeIndex>) {
    let mut g = DependencyGraph::new();
    let vs: Vec<NodeIndex> = (0..n).map(|i| g.add_vertex(format!("mod_{i}"))).collect();
    let mut repo = WeightRepository::new(1);
    for &(u, v, w) in edges {
        let dep_type = format!("w{w}");
        repo.set_weight(dep_type.clone(), w);
        g.add_dependency(vs[u], vs[v], dep_type);
    }
    (g, repo, vs)
}

fn groups_of_labels(
    g: &DependencyGraph,
    assignment: &archviz_kernel::ClusterAssignment,
) -> Vec<Vec<String>> {
    assignment
        .groups()
        .into_iter()
        .map(|vs| vs.into_iter().map(|v| g.label(v).to_string()).collect())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// k-spanning-tree
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_five_module_scenario_partitions_into_three() {
    // mod_0..mod_4 with weighted dependencies; the unique MST is
    // {0-2, 2-3, 1-2, 3-4} and cutting its two heaviest edges for k = 3
    // leaves {mod_0, mod_2, mod_3} with mod_1 and mod_4 split off.
    let edges = [
        (0, 1, 7),
        (0, 2, 2),
        (0, 3, 4),
        (1, 2, 3),
        (1, 3, 5),
        (2, 3, 2),
        (2, 4, 6),
        (3, 4, 4),
    ];
    let (g, repo, _) = weighted_graph(5, &edges);

    for algorithm in [MstAlgorithm::Prim, MstAlgorithm::Kruskal] {
        let a = k_spanning_tree_clusters(&g, &repo, 3, algorithm);
        assert_eq!(a.cluster_count(), 3, "{algorithm}");
        assert_eq!(
            groups_of_labels(&g, &a),
            vec![
                vec!["mod_0".to_string(), "mod_2".into(), "mod_3".into()],
                vec!["mod_1".to_string()],
                vec!["mod_4".to_string()],
            ],
            "{algorithm}"
        );
    }
}

#[test]
fn test_k_exceeding_components_yields_all_singletons() {
    let (g, repo, _) = weighted_graph(3, &[(0, 1, 1), (1, 2, 1)]);
    let a = k_spanning_tree_clusters(&g, &repo, 10, MstAlgorithm::Kruskal);
    assert_eq!(a.cluster_count(), 3);
}

#[test]
fn test_k_one_keeps_connected_graph_whole() {
    let (g, repo, vs) = weighted_graph(4, &[(0, 1, 1), (1, 2, 5), (2, 3, 9)]);
    let a = k_spanning_tree_clusters(&g, &repo, 1, MstAlgorithm::Prim);
    assert_eq!(a.cluster_count(), 1);
    assert!(a.same_cluster(vs[0], vs[3]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared nearest neighbours
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_snn_severs_bridge_between_cliques() {
    // Two 4-cliques joined by a single bridge. The bridge endpoints share no
    // neighbours, so SNN pruning at threshold 2 splits the graph in two.
    let mut edges = Vec::new();
    for clique in [[0, 1, 2, 3], [4, 5, 6, 7]] {
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.push((clique[i], clique[j], 1));
            }
        }
    }
    edges.push((3, 4, 1));
    let (g, _, vs) = weighted_graph(8, &edges);

    let a = snn_clusters(&g, 2);
    assert_eq!(a.cluster_count(), 2);
    assert!(a.same_cluster(vs[0], vs[3]));
    assert!(!a.same_cluster(vs[3], vs[4]));
}

#[test]
fn test_snn_is_idempotent_on_its_own_output() {
    let mut edges = Vec::new();
    for clique in [[0, 1, 2, 3], [4, 5, 6, 7]] {
        for i in 0..4 {
            for j in (i + 1)..4 {
                edges.push((clique[i], clique[j], 1));
            }
        }
    }
    edges.push((3, 4, 1));
    edges.push((2, 5, 1));
    let (g, _, _) = weighted_graph(8, &edges);

    // Rebuild a graph containing only the surviving edges and recluster:
    // the fixpoint pruning must not remove anything further.
    let survivors = snn_pruned_edges(&g, 2);
    let mut pruned = DependencyGraph::new();
    let vs: Vec<NodeIndex> = (0..8).map(|i| pruned.add_vertex(format!("mod_{i}"))).collect();
    for (u, v) in &survivors {
        pruned.add_dependency(vs[u.index()], vs[v.index()], "calls");
    }

    assert_eq!(snn_pruned_edges(&pruned, 2), survivors);
    assert_eq!(snn_clusters(&g, 2), snn_clusters(&pruned, 2));
}

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_strong_components_respect_direction() {
    // A 3-cycle feeding a 2-cycle through a one-way edge.
    let mut g = DependencyGraph::new();
    let vs: Vec<NodeIndex> = (0..5).map(|i| g.add_vertex(format!("mod_{i}"))).collect();
    g.add_dependency(vs[0], vs[1], "calls");
    g.add_dependency(vs[1], vs[2], "calls");
    g.add_dependency(vs[2], vs[0], "calls");
    g.add_dependency(vs[2], vs[3], "calls");
    g.add_dependency(vs[3], vs[4], "calls");
    g.add_dependency(vs[4], vs[3], "calls");

    let a = strong_components_clusters(&g);
    assert_eq!(a.cluster_count(), 2);
    assert!(a.same_cluster(vs[0], vs[2]));
    assert!(a.same_cluster(vs[3], vs[4]));
    assert!(!a.same_cluster(vs[2], vs[3]));
    assert_eq!(inter_cluster_edge_count(&g, &a), 1);
}

#[test]
fn test_highly_connected_splits_bridged_triangles() {
    let edges = [
        (0, 1, 1),
        (1, 2, 1),
        (0, 2, 1),
        (3, 4, 1),
        (4, 5, 1),
        (3, 5, 1),
        (2, 3, 1),
    ];
    let (g, _, vs) = weighted_graph(6, &edges);

    let a = highly_connected_clusters(&g);
    assert_eq!(a.cluster_count(), 2);
    assert!(a.same_cluster(vs[0], vs[2]));
    assert!(a.same_cluster(vs[3], vs[5]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism and totality across the registry
// ─────────────────────────────────────────────────────────────────────────────

const ALL_CLUSTERERS: [Clusterer; 7] = [
    Clusterer::KSpanningTree,
    Clusterer::SharedNearestNeighbour,
    Clusterer::StrongComponents,
    Clusterer::HighlyConnectedComponents,
    Clusterer::MaximalClique,
    Clusterer::Louvain,
    Clusterer::LayeredLabelPropagation,
];

#[test]
fn test_same_seed_reproduces_every_clusterer() {
    let edges = [
        (0, 1, 2),
        (1, 2, 3),
        (2, 3, 2),
        (3, 0, 5),
        (2, 4, 1),
        (4, 5, 4),
        (5, 6, 1),
        (6, 4, 2),
    ];
    let (g, repo, _) = weighted_graph(7, &edges);
    let params = ClusteringParams::default();

    for clusterer in ALL_CLUSTERERS {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);
        let a = compute_clusters(&g, &repo, clusterer, MstAlgorithm::Prim, &params, &mut rng_a);
        let b = compute_clusters(&g, &repo, clusterer, MstAlgorithm::Prim, &params, &mut rng_b);
        assert_eq!(a, b, "clusterer {clusterer} not reproducible");
    }
}

proptest! {
    #[test]
    fn prop_every_clusterer_is_total_and_normalized(
        n in 1usize..12,
        raw_edges in prop::collection::vec((0usize..12, 0usize..12), 0..30),
        seed in 0u64..16,
    ) {
        let mut g = DependencyGraph::new();
        let vs: Vec<NodeIndex> = (0..n).map(|i| g.add_vertex(format!("mod_{i}"))).collect();
        for (u, v) in raw_edges {
            let (u, v) = (u % n, v % n);
            if u != v {
                g.add_dependency(vs[u], vs[v], "calls");
            }
        }
        let repo = WeightRepository::default();
        let params = ClusteringParams::default();

        for clusterer in ALL_CLUSTERERS {
            let mut rng = StdRng::seed_from_u64(seed);
            let a = compute_clusters(&g, &repo, clusterer, MstAlgorithm::Kruskal, &params, &mut rng);

            // Total over the vertex set.
            prop_assert_eq!(a.len(), n, "clusterer {}", clusterer);
            for &v in &vs {
                prop_assert!(a.get(v).is_some());
            }
            // Ids are dense after normalization.
            let count = a.cluster_count() as u64;
            for (_, id) in a.iter() {
                prop_assert!(id < count);
            }
        }
    }
}
