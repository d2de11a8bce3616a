//! # archviz-kernel
//!
//! Deterministic clustering and 3D layout for software dependency graphs.
//!
//! The kernel answers two questions about an architecture graph:
//!
//! > Which vertices belong together? Where does each vertex sit in space?
//!
//! ## Core Contract
//!
//! 1. Given a dependency graph and a weight assignment, partition every
//!    vertex into clusters with one of seven interchangeable algorithms
//! 2. Embed every vertex inside a bounded 3D topology
//! 3. Expose both results through undoable, observable backends with live
//!    property-map views for a renderer
//!
//! ## Architecture
//!
//! ```text
//! DependencyGraph + WeightRepository
//!         ↓                  ↓
//! ClusteringBackend    LayoutBackend      (CommandHistory each)
//!         ↓                  ↓
//!    ClusterMap         PositionMap       (live views)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same graph + same weights + same configuration (including seed) →
//!   identical cluster assignment and identical layout
//! - Cluster ids are normalized by first appearance in vertex order
//! - Randomized steps draw from a seeded generator owned by the backend

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod clustering;
pub mod layout;
pub mod history;
pub mod backend;
pub mod maps;
pub mod task;

// Re-exports
pub use types::{
    ClusterAssignment, ClusterId, DependencyEdge, DependencyGraph, Layout, Position, Topology,
    TopologyKind, WeightRepository,
};
pub use clustering::{
    compute_clusters, Clusterer, ClusteringParams, LlpParams, MstAlgorithm,
};
pub use layout::{compute_layout, GursoyAtunParams, LayoutAlgorithm};
pub use history::{Command, CommandHistory};
pub use backend::{
    ClusteringBackend, ClusteringConfig, ConfigError, LayoutBackend, LayoutConfig, WeightBackend,
};
pub use maps::{ClusterMap, PositionMap};
pub use task::{TaskContext, TaskHandle, WorkerPool};
