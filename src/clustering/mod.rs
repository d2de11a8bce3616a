//! Clustering algorithms.
//!
//! Pure functions computing a total vertex-to-cluster assignment. Algorithm
//! selection is a closed tagged variant dispatched by [`compute_clusters`];
//! backends validate ids against their plugged-in subset, so no algorithm is
//! ever looked up by reflection.

pub mod clique;
pub mod components;
pub mod k_spanning_tree;
pub mod label_propagation;
pub mod louvain;
pub mod mst;
pub mod snn;

pub use clique::{clique_clusters, largest_clique, maximal_cliques};
pub use components::{
    highly_connected_clusters, inter_cluster_edge_count, strong_components_clusters,
};
pub use k_spanning_tree::k_spanning_tree_clusters;
pub use label_propagation::{label_propagation_clusters, LlpParams};
pub use louvain::{louvain_clusters, modularity};
pub use mst::{minimum_spanning_forest, MstAlgorithm, MstEdge};
pub use snn::{snn_clusters, snn_pruned_edges};

use crate::types::{ClusterAssignment, DependencyGraph, WeightRepository};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Pluggable clusterer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Clusterer {
    /// MST pruning into k groups.
    KSpanningTree,
    /// Shared-nearest-neighbour pruning.
    SharedNearestNeighbour,
    /// Strongly-connected-components labelling.
    StrongComponents,
    /// Min-cut refinement into highly connected subgraphs.
    HighlyConnectedComponents,
    /// Single dominant maximal clique.
    MaximalClique,
    /// Greedy modularity optimization.
    Louvain,
    /// Layered label propagation.
    LayeredLabelPropagation,
}

impl Clusterer {
    /// Parse a clusterer id from its identifier string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "k_spanning_tree" => Some(Self::KSpanningTree),
            "shared_nearest_neighbour" | "snn" => Some(Self::SharedNearestNeighbour),
            "strong_components" => Some(Self::StrongComponents),
            "highly_connected_components" => Some(Self::HighlyConnectedComponents),
            "maximal_clique" => Some(Self::MaximalClique),
            "louvain" => Some(Self::Louvain),
            "layered_label_propagation" | "llp" => Some(Self::LayeredLabelPropagation),
            _ => None,
        }
    }
}

impl std::fmt::Display for Clusterer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::KSpanningTree => "k_spanning_tree",
            Self::SharedNearestNeighbour => "shared_nearest_neighbour",
            Self::StrongComponents => "strong_components",
            Self::HighlyConnectedComponents => "highly_connected_components",
            Self::MaximalClique => "maximal_clique",
            Self::Louvain => "louvain",
            Self::LayeredLabelPropagation => "layered_label_propagation",
        };
        write!(f, "{s}")
    }
}

/// Tuning parameters shared by the parameterized clusterers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringParams {
    /// Number of clusters for k-spanning-tree. Must be at least 1.
    pub k: usize,
    /// Minimum shared-neighbour weight an edge needs to survive SNN pruning.
    pub snn_threshold: usize,
    /// Layered label propagation parameters.
    pub llp: LlpParams,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self {
            k: 3,
            snn_threshold: 2,
            llp: LlpParams::default(),
        }
    }
}

/// Dispatch to the selected clustering algorithm.
///
/// # Panics
/// Propagates the per-algorithm precondition panics (`k < 1`).
pub fn compute_clusters<R: Rng + ?Sized>(
    graph: &DependencyGraph,
    weights: &WeightRepository,
    clusterer: Clusterer,
    mst_algorithm: MstAlgorithm,
    params: &ClusteringParams,
    rng: &mut R,
) -> ClusterAssignment {
    match clusterer {
        Clusterer::KSpanningTree => {
            k_spanning_tree_clusters(graph, weights, params.k, mst_algorithm)
        }
        Clusterer::SharedNearestNeighbour => snn_clusters(graph, params.snn_threshold),
        Clusterer::StrongComponents => strong_components_clusters(graph),
        Clusterer::HighlyConnectedComponents => highly_connected_clusters(graph),
        Clusterer::MaximalClique => clique_clusters(graph),
        Clusterer::Louvain => louvain_clusters(graph, weights),
        Clusterer::LayeredLabelPropagation => {
            label_propagation_clusters(graph, &params.llp, rng)
        }
    }
}
