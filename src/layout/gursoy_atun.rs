//! Gursoy-Atun self-organizing-map layout.
//!
//! Each iteration samples a target point from the topology, finds the vertex
//! whose current position is nearest (the winner), and pulls the winner plus
//! its graph neighbourhood toward the target. Displacement decays
//! exponentially with hop distance from the winner and both the learning
//! rate and the neighbourhood diameter shrink over the iteration schedule:
//! early iterations do coarse global placement, late ones local refinement.
//!
//! The layout is fully determined by the random sampling sequence, so a
//! seeded generator reproduces it exactly.

use crate::types::{DependencyGraph, Layout, Topology};
use petgraph::stable_graph::NodeIndex;
use rand::Rng;
use std::collections::{HashMap, VecDeque};

/// Schedule parameters for the self-organizing-map sweep.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GursoyAtunParams {
    /// Number of update iterations; `None` derives `max(100, vertex count)`.
    pub iterations: Option<usize>,
    /// Starting neighbourhood diameter in hops; `None` derives
    /// `sqrt(vertex count)`.
    pub initial_diameter: Option<f64>,
    /// Final neighbourhood diameter in hops.
    pub final_diameter: f64,
    /// Starting learning rate.
    pub initial_learning: f64,
    /// Final learning rate.
    pub final_learning: f64,
}

impl Default for GursoyAtunParams {
    fn default() -> Self {
        Self {
            iterations: None,
            initial_diameter: None,
            final_diameter: 1.0,
            initial_learning: 0.8,
            final_learning: 0.2,
        }
    }
}

/// Exponential interpolation from `start` to `end` at `progress` in `[0, 1]`.
fn decay(start: f64, end: f64, progress: f64) -> f64 {
    start * (end / start).powf(progress)
}

/// Hop distances from `winner`, capped at `max_hops`.
fn neighbourhood(
    graph: &DependencyGraph,
    winner: NodeIndex,
    max_hops: usize,
) -> HashMap<NodeIndex, usize> {
    let mut dist: HashMap<NodeIndex, usize> = HashMap::new();
    dist.insert(winner, 0);
    let mut queue = VecDeque::from([winner]);
    while let Some(v) = queue.pop_front() {
        let d = dist[&v];
        if d >= max_hops {
            continue;
        }
        for u in graph.neighbours(v) {
            if !dist.contains_key(&u) {
                dist.insert(u, d + 1);
                queue.push_back(u);
            }
        }
    }
    dist
}

/// Compute a Gursoy-Atun layout of the graph inside the topology.
///
/// Every vertex receives a position (initial placement is a topology sample);
/// disconnected vertices are refined whenever they win an iteration. The
/// empty graph yields an empty layout.
pub fn gursoy_atun_layout<R: Rng + ?Sized>(
    graph: &DependencyGraph,
    topology: &Topology,
    params: &GursoyAtunParams,
    rng: &mut R,
) -> Layout {
    let vertices: Vec<NodeIndex> = graph.vertices().collect();
    let mut layout = Layout::new();
    if vertices.is_empty() {
        return layout;
    }

    for &v in &vertices {
        layout.set(v, topology.sample(rng));
    }

    let n = vertices.len();
    let iterations = params.iterations.unwrap_or_else(|| n.max(100));
    let initial_diameter = params
        .initial_diameter
        .unwrap_or_else(|| (n as f64).sqrt().max(1.0));

    for step in 0..iterations {
        let progress = if iterations > 1 {
            step as f64 / (iterations - 1) as f64
        } else {
            1.0
        };
        let learning = decay(params.initial_learning, params.final_learning, progress);
        let diameter = decay(initial_diameter, params.final_diameter, progress);

        let target = topology.sample(rng);

        // Winner: nearest current position, ties to the lowest vertex index.
        let mut winner = vertices[0];
        let mut best = layout.position_of(winner).distance(&target);
        for &v in &vertices[1..] {
            let d = layout.position_of(v).distance(&target);
            if d < best {
                best = d;
                winner = v;
            }
        }

        for (v, hops) in neighbourhood(graph, winner, diameter.ceil() as usize) {
            let factor = learning * (-(hops as f64) / diameter).exp();
            let pulled = layout.position_of(v).pulled_toward(&target, factor);
            layout.set(v, topology.clamp(&pulled));
        }
    }

    layout
}
