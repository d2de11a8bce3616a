//! Dynamic property-map adapters.
//!
//! Live read-through views over backend state for the renderer. The adapters
//! hold the backend's shared state handle, never a snapshot, so every query
//! observes mutations made after the adapter was created. Querying a vertex
//! the relevant recompute has not covered is a precondition violation.

use crate::backend::clustering::ClusteringState;
use crate::backend::layout::LayoutState;
use crate::types::{ClusterId, Position};
use petgraph::stable_graph::NodeIndex;
use std::cell::RefCell;
use std::rc::Rc;

/// Live vertex-to-cluster view over a clustering backend.
#[derive(Clone)]
pub struct ClusterMap {
    state: Rc<RefCell<ClusteringState>>,
}

impl ClusterMap {
    pub(crate) fn new(state: Rc<RefCell<ClusteringState>>) -> Self {
        Self { state }
    }

    /// Cluster id of a vertex.
    ///
    /// # Panics
    /// Panics when the last recompute did not cover `vertex`.
    pub fn get(&self, vertex: NodeIndex) -> ClusterId {
        self.state.borrow().clusters.cluster_of(vertex)
    }

    /// Cluster id of a vertex, `None` when not covered.
    pub fn try_get(&self, vertex: NodeIndex) -> Option<ClusterId> {
        self.state.borrow().clusters.get(vertex)
    }
}

impl std::fmt::Debug for ClusterMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterMap")
            .field("vertices", &self.state.borrow().clusters.len())
            .finish()
    }
}

/// Live vertex-to-position view over a layout backend.
#[derive(Clone)]
pub struct PositionMap {
    state: Rc<RefCell<LayoutState>>,
}

impl PositionMap {
    pub(crate) fn new(state: Rc<RefCell<LayoutState>>) -> Self {
        Self { state }
    }

    /// Position of a vertex.
    ///
    /// # Panics
    /// Panics when the last recompute did not cover `vertex`.
    pub fn get(&self, vertex: NodeIndex) -> Position {
        self.state.borrow().layout.position_of(vertex)
    }

    /// Position of a vertex, `None` when not covered.
    pub fn try_get(&self, vertex: NodeIndex) -> Option<Position> {
        self.state.borrow().layout.get(vertex)
    }
}

impl std::fmt::Debug for PositionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionMap")
            .field("vertices", &self.state.borrow().layout.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::{ClusteringBackend, ClusteringConfig, LayoutBackend, LayoutConfig};
    use crate::clustering::Clusterer;
    use crate::types::{DependencyGraph, TopologyKind, WeightRepository};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn path_graph(n: usize) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        let vs: Vec<_> = (0..n).map(|i| g.add_vertex(format!("v{i}"))).collect();
        for i in 0..n - 1 {
            g.add_dependency(vs[i], vs[i + 1], "calls");
        }
        g
    }

    #[test]
    fn test_cluster_map_is_live() {
        let graph = Arc::new(path_graph(4));
        let weights = Rc::new(RefCell::new(WeightRepository::default()));
        let mut backend =
            ClusteringBackend::new(Arc::clone(&graph), weights, &ClusteringConfig::default())
                .unwrap();

        let map = backend.cluster_map();
        let v0 = graph.vertices().next().unwrap();
        assert_eq!(map.try_get(v0), None);

        backend.update_clusters();
        let before = map.get(v0);

        // A mutation after map creation must be visible through the map.
        backend.select_clusterer(Clusterer::StrongComponents);
        assert_eq!(map.get(v0), before); // ids normalized, v0 still cluster 0
        assert_eq!(
            map.try_get(graph.vertices().last().unwrap()),
            Some(3),
            "singleton SCCs of the path must show through the live view"
        );
    }

    #[test]
    fn test_position_map_is_live() {
        let graph = Arc::new(path_graph(5));
        let mut backend =
            LayoutBackend::new(Arc::clone(&graph), &LayoutConfig::default()).unwrap();

        let map = backend.position_map();
        let v0 = graph.vertices().next().unwrap();
        assert_eq!(map.try_get(v0), None);

        backend.refresh_layout();
        let first = map.get(v0);

        backend.update_topology(TopologyKind::Sphere, 3.0);
        let second = map.get(v0);
        assert!(backend.topology().contains(&second));
        assert_ne!(first, second);
    }

    #[test]
    #[should_panic(expected = "no position assigned")]
    fn test_query_before_recompute_is_fatal() {
        let graph = Arc::new(path_graph(2));
        let backend = LayoutBackend::new(Arc::clone(&graph), &LayoutConfig::default()).unwrap();
        let map = backend.position_map();
        map.get(graph.vertices().next().unwrap());
    }
}
