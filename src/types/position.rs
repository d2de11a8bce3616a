//! 3D positions and layouts.

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A point in layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Position {
    /// Create a position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn origin() -> Self {
        Self::default()
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance from the origin.
    pub fn norm(&self) -> f64 {
        self.distance(&Position::origin())
    }

    /// Move this position toward `target` by `factor` of the separation.
    /// `factor == 0.0` is a no-op, `factor == 1.0` lands on the target.
    pub fn pulled_toward(&self, target: &Position, factor: f64) -> Position {
        Position {
            x: self.x + factor * (target.x - self.x),
            y: self.y + factor * (target.y - self.y),
            z: self.z + factor * (target.z - self.z),
        }
    }
}

/// Total map from vertex to position.
///
/// Produced wholesale by a layout recompute; defined for every vertex of the
/// graph used in the last recompute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    map: HashMap<NodeIndex, Position>,
}

impl Layout {
    /// Create an empty layout (the result for an empty graph).
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of a vertex, if covered by the last recompute.
    pub fn get(&self, v: NodeIndex) -> Option<Position> {
        self.map.get(&v).copied()
    }

    /// Position of a vertex.
    ///
    /// # Panics
    /// Panics if `v` was not covered by the last recompute.
    pub fn position_of(&self, v: NodeIndex) -> Position {
        match self.map.get(&v) {
            Some(p) => *p,
            None => panic!("no position assigned for vertex {v:?}; recompute has not covered it"),
        }
    }

    /// Set the position of a vertex.
    pub fn set(&mut self, v: NodeIndex, p: Position) {
        self.map.insert(v, p);
    }

    /// Number of vertices covered.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no vertex is covered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(vertex, position)` pairs in ascending vertex order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, Position)> + '_ {
        let sorted: BTreeMap<NodeIndex, Position> =
            self.map.iter().map(|(&v, &p)| (v, p)).collect();
        sorted.into_iter()
    }
}
