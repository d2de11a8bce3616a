//! Core types for the clustering and layout kernel.

pub mod cluster;
pub mod graph;
pub mod position;
pub mod topology;

pub use cluster::{ClusterAssignment, ClusterId};
pub use graph::{DependencyEdge, DependencyGraph, WeightRepository};
pub use position::{Layout, Position};
pub use topology::{Topology, TopologyKind};
