//! Topology-bound layout algorithms.

pub mod gursoy_atun;

pub use gursoy_atun::{gursoy_atun_layout, GursoyAtunParams};

use crate::types::{DependencyGraph, Layout, Topology};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Pluggable layout algorithm identifier.
///
/// A closed variant set: backends validate selections against their
/// plugged-in subset of these, never by reflection. Currently the
/// self-organizing-map layout is the only member, but the registry treats it
/// like any other plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LayoutAlgorithm {
    /// Gursoy-Atun self-organizing-map layout.
    GursoyAtun,
}

impl LayoutAlgorithm {
    /// Parse a layout algorithm id from its identifier string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gursoy_atun" | "gursoy-atun" => Some(Self::GursoyAtun),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GursoyAtun => write!(f, "gursoy_atun"),
        }
    }
}

/// Run the selected layout algorithm against the topology.
pub fn compute_layout<R: Rng + ?Sized>(
    graph: &DependencyGraph,
    topology: &Topology,
    algorithm: LayoutAlgorithm,
    params: &GursoyAtunParams,
    rng: &mut R,
) -> Layout {
    match algorithm {
        LayoutAlgorithm::GursoyAtun => gursoy_atun_layout(graph, topology, params, rng),
    }
}
