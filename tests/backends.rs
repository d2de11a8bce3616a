//! Full-session scenarios across the backends.
//!
//! These drive the clustering, layout and weight backends together the way
//! the surrounding visualization tool does: shared weight repository, live
//! property maps handed to a renderer, undo/redo over mixed mutations, and
//! the worker-pool initial pass.

use archviz_kernel::{
    Clusterer, ClusteringBackend, ClusteringConfig, DependencyGraph, LayoutBackend, LayoutConfig,
    MstAlgorithm, TopologyKind, WeightBackend, WeightRepository, WorkerPool,
};
use petgraph::stable_graph::NodeIndex;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Two triangles of `calls` edges joined by one `inherits` bridge.
fn bridged_triangles() -> (DependencyGraph, Vec<NodeIndex>) {
    let mut g = DependencyGraph::new();
    let vs: Vec<NodeIndex> = (0..6).map(|i| g.add_vertex(format!("mod_{i}"))).collect();
    for &(u, v) in &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
        g.add_dependency(vs[u], vs[v], "calls");
    }
    g.add_dependency(vs[2], vs[3], "inherits");
    (g, vs)
}

struct Session {
    clustering: ClusteringBackend,
    layout: LayoutBackend,
    weights: WeightBackend,
    vs: Vec<NodeIndex>,
}

fn session() -> Session {
    let (g, vs) = bridged_triangles();
    let graph = Arc::new(g);
    let repo = Rc::new(RefCell::new(WeightRepository::default()));

    let clustering = ClusteringBackend::new(
        Arc::clone(&graph),
        Rc::clone(&repo),
        &ClusteringConfig::default(),
    )
    .unwrap();
    let layout = LayoutBackend::new(Arc::clone(&graph), &LayoutConfig::default()).unwrap();
    let weights = WeightBackend::new(repo);
    Session {
        clustering,
        layout,
        weights,
        vs,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cross-backend workflows
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_weight_edit_changes_clustering_outcome() {
    // With uniform weights the k = 2 cut lands inside a triangle; making
    // the bridge expensive through the shared repository moves the cut onto
    // the bridge on the next recompute.
    let (g, vs) = bridged_triangles();
    let repo = Rc::new(RefCell::new(WeightRepository::default()));
    let mut config = ClusteringConfig::default();
    config.params.k = 2;
    let mut clustering =
        ClusteringBackend::new(Arc::new(g), Rc::clone(&repo), &config).unwrap();
    let mut weights = WeightBackend::new(repo);

    clustering.update_clusters();
    assert!(clustering.clusters().same_cluster(vs[2], vs[3]));

    weights.set_weight("inherits", 100);
    clustering.update_clusters();

    let assignment = clustering.clusters().clone();
    assert_eq!(assignment.cluster_count(), 2);
    assert!(assignment.same_cluster(vs[0], vs[2]));
    assert!(assignment.same_cluster(vs[3], vs[5]));
    assert!(!assignment.same_cluster(vs[2], vs[3]));
}

#[test]
fn test_undo_redo_across_mixed_mutations() {
    let mut s = session();
    s.clustering.update_clusters();
    let initial = s.clustering.clusters().clone();

    s.clustering.select_clusterer(Clusterer::Louvain);
    let after_louvain = s.clustering.clusters().clone();
    s.clustering.select_mst_finder(MstAlgorithm::Kruskal);

    assert!(s.clustering.undo());
    assert_eq!(s.clustering.selected_mst_finder(), MstAlgorithm::Prim);
    assert_eq!(*s.clustering.clusters(), after_louvain);

    assert!(s.clustering.undo());
    assert_eq!(s.clustering.selected_clusterer(), Clusterer::KSpanningTree);
    assert_eq!(*s.clustering.clusters(), initial);

    assert!(s.clustering.redo());
    assert_eq!(s.clustering.selected_clusterer(), Clusterer::Louvain);
    assert_eq!(*s.clustering.clusters(), after_louvain);
}

#[test]
fn test_weight_undo_round_trips_through_shared_repository() {
    let mut s = session();
    assert_eq!(s.weights.weight_of("inherits"), 1);

    s.weights.set_weight("inherits", 9);
    s.weights.set_weight("calls", 2);
    assert!(s.weights.undo());
    assert!(s.weights.undo());

    // Both edits reverted; the repository the clustering backend sees is
    // back at the defaults.
    assert_eq!(s.weights.weight_of("inherits"), 1);
    assert_eq!(s.weights.weight_of("calls"), 1);

    assert!(s.weights.redo());
    assert_eq!(s.weights.weight_of("inherits"), 9);
}

#[test]
fn test_maps_stay_live_across_recomputes() {
    let mut s = session();
    let cluster_map = s.clustering.cluster_map();
    let position_map = s.layout.position_map();

    s.clustering.update_clusters();
    s.layout.refresh_layout();

    // k-spanning-tree keeps the first triangle together.
    assert!(cluster_map.get(s.vs[0]) == cluster_map.get(s.vs[1]));
    let position_before = position_map.get(s.vs[0]);

    s.clustering.select_clusterer(Clusterer::StrongComponents);
    s.layout.update_topology(TopologyKind::Sphere, 4.0);

    // Same adapter objects, new results: the one-way triangles fall apart
    // into singleton components, and positions move into the new topology.
    assert_ne!(cluster_map.get(s.vs[0]), cluster_map.get(s.vs[1]));
    assert!(s.layout.topology().contains(&position_map.get(s.vs[0])));
    assert_ne!(position_map.get(s.vs[0]), position_before);
}

#[test]
fn test_notifications_fire_once_per_effective_change() {
    let mut s = session();
    let clusters = Rc::new(Cell::new(0u32));
    let layouts = Rc::new(Cell::new(0u32));
    let weights = Rc::new(Cell::new(0u32));
    {
        let clusters = Rc::clone(&clusters);
        s.clustering
            .on_clusters_changed(move || clusters.set(clusters.get() + 1));
    }
    {
        let layouts = Rc::clone(&layouts);
        s.layout
            .on_layout_changed(move || layouts.set(layouts.get() + 1));
    }
    {
        let weights = Rc::clone(&weights);
        s.weights
            .on_weights_changed(move || weights.set(weights.get() + 1));
    }

    s.clustering.update_clusters();
    s.clustering.select_clusterer(Clusterer::KSpanningTree); // already selected
    s.layout.refresh_layout();
    s.layout.update_topology(TopologyKind::Cube, 10.0); // already active
    s.weights.set_weight("calls", 1); // already the resolution

    assert_eq!(clusters.get(), 1);
    assert_eq!(layouts.get(), 1);
    assert_eq!(weights.get(), 0);

    s.weights.set_weight("calls", 5);
    assert_eq!(weights.get(), 1);
}

#[test]
fn test_graph_swap_resets_history() {
    let mut s = session();
    s.clustering.update_clusters();
    s.clustering.select_clusterer(Clusterer::Louvain);
    s.layout.refresh_layout();

    let mut replacement = DependencyGraph::new();
    let a = replacement.add_vertex("core");
    let b = replacement.add_vertex("ui");
    replacement.add_dependency(a, b, "calls");
    let replacement = Arc::new(replacement);

    s.clustering.set_graph(Arc::clone(&replacement));
    s.layout.set_graph(replacement);

    // Results cover the new graph immediately.
    assert_eq!(s.clustering.clusters().len(), 2);
    assert_eq!(s.layout.layout().len(), 2);

    // Commands from the old graph's lifetime are unreachable.
    assert!(!s.clustering.undo());
    assert!(!s.layout.undo());
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker offload
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_initial_pass_runs_on_worker_pool() {
    let pool = WorkerPool::new(2);

    // The expensive part (graph construction and the first clustering run)
    // happens off-thread; the backends are fed on the caller's side.
    let handle = pool.spawn(|ctx| {
        let (g, _) = bridged_triangles();
        ctx.report_progress(0.5);
        ctx.report_progress(1.0);
        g
    });

    let graph = Arc::new(handle.wait().expect("task was not cancelled"));
    let repo = Rc::new(RefCell::new(WeightRepository::default()));
    let mut backend =
        ClusteringBackend::new(graph, repo, &ClusteringConfig::default()).unwrap();
    backend.update_clusters();
    assert_eq!(backend.clusters().len(), 6);
}

#[test]
fn test_cancelled_initial_pass_feeds_nothing() {
    let pool = WorkerPool::new(1);
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

    let handle = pool.spawn(move |_| {
        release_rx.recv().unwrap();
        let (g, _) = bridged_triangles();
        g
    });

    handle.cancel();
    release_tx.send(()).unwrap();
    assert!(handle.wait().is_none());
}
