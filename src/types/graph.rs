//! Dependency graph model.
//!
//! Vertices stand for software artefacts (modules, packages, translation
//! units); identity is the stable `NodeIndex` handle, the label is only
//! carried for collaborators that render or report. Edges are directed
//! dependencies carrying a dependency-type string; the numeric weight of an
//! edge is resolved externally through a [`WeightRepository`].

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A directed dependency between two artefacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Dependency type, e.g. `"inherits"` or `"calls"`. Weight resolution
    /// happens against a [`WeightRepository`] keyed by this string.
    pub dependency_type: String,
}

impl DependencyEdge {
    /// Create a dependency edge of the given type.
    pub fn new(dependency_type: impl Into<String>) -> Self {
        Self {
            dependency_type: dependency_type.into(),
        }
    }
}

/// Directed multigraph of software artefacts and their dependencies.
///
/// Thin wrapper over a petgraph `StableDiGraph` so vertex handles stay valid
/// across unrelated removals. Clustering algorithms operate on the
/// undirected simple view exposed by [`DependencyGraph::neighbours`] unless
/// they are explicitly direction-aware (strong components).
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: StableDiGraph<String, DependencyEdge>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex with an artefact label.
    pub fn add_vertex(&mut self, label: impl Into<String>) -> NodeIndex {
        self.graph.add_node(label.into())
    }

    /// Add a directed dependency edge.
    pub fn add_dependency(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        dependency_type: impl Into<String>,
    ) -> EdgeIndex {
        self.graph.add_edge(from, to, DependencyEdge::new(dependency_type))
    }

    /// Borrow the underlying petgraph graph.
    pub fn graph(&self) -> &StableDiGraph<String, DependencyEdge> {
        &self.graph
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges (parallel edges counted individually).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over all vertex handles in ascending index order.
    pub fn vertices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Artefact label of a vertex.
    pub fn label(&self, v: NodeIndex) -> &str {
        &self.graph[v]
    }

    /// Distinct undirected neighbours of `v`, in ascending index order.
    ///
    /// Parallel edges and self-loops collapse to the simple view; `v` itself
    /// is never included.
    pub fn neighbours(&self, v: NodeIndex) -> Vec<NodeIndex> {
        let set: BTreeSet<NodeIndex> = self
            .graph
            .neighbors_undirected(v)
            .filter(|&u| u != v)
            .collect();
        set.into_iter().collect()
    }

    /// Number of shared undirected neighbours of `u` and `v`.
    pub fn shared_neighbour_count(&self, u: NodeIndex, v: NodeIndex) -> usize {
        let nu: BTreeSet<NodeIndex> = self.neighbours(u).into_iter().collect();
        self.neighbours(v)
            .into_iter()
            .filter(|w| nu.contains(w) && *w != u && *w != v)
            .count()
    }

    /// Undirected simple edges `(u, v)` with `u < v`, in ascending order.
    pub fn undirected_edges(&self) -> Vec<(NodeIndex, NodeIndex)> {
        let mut set = BTreeSet::new();
        for e in self.graph.edge_references() {
            let (a, b) = (e.source(), e.target());
            if a == b {
                continue;
            }
            let pair = if a < b { (a, b) } else { (b, a) };
            set.insert(pair);
        }
        set.into_iter().collect()
    }
}

/// External weight resolution, keyed by dependency-type string.
///
/// Dependency types not present in the repository resolve to the default
/// weight, so a freshly constructed repository is already total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRepository {
    weights: BTreeMap<String, i64>,
    default_weight: i64,
}

impl WeightRepository {
    /// Create a repository where every type resolves to `default_weight`.
    pub fn new(default_weight: i64) -> Self {
        Self {
            weights: BTreeMap::new(),
            default_weight,
        }
    }

    /// Resolve the weight for a dependency type.
    pub fn resolve(&self, dependency_type: &str) -> i64 {
        self.weights
            .get(dependency_type)
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Resolve the weight of a concrete edge.
    pub fn resolve_edge(&self, graph: &DependencyGraph, edge: EdgeIndex) -> i64 {
        let dep = &graph.graph()[edge];
        self.resolve(&dep.dependency_type)
    }

    /// Set the weight for a dependency type, returning the previous
    /// explicitly-set weight if there was one.
    pub fn set_weight(&mut self, dependency_type: impl Into<String>, weight: i64) -> Option<i64> {
        self.weights.insert(dependency_type.into(), weight)
    }

    /// Remove an explicit weight, falling back to the default.
    pub fn clear_weight(&mut self, dependency_type: &str) -> Option<i64> {
        self.weights.remove(dependency_type)
    }

    /// The default weight for unknown types.
    pub fn default_weight(&self) -> i64 {
        self.default_weight
    }
}

impl Default for WeightRepository {
    fn default() -> Self {
        Self::new(1)
    }
}
