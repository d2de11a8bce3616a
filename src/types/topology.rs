//! Bounded 3D manifolds used as layout coordinate spaces.

use super::position::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kind of bounded manifold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TopologyKind {
    /// Axis-aligned cube `[-scale, scale]^3`.
    Cube,
    /// Ball of radius `scale` centred on the origin.
    Sphere,
}

impl TopologyKind {
    /// Parse a topology kind from its identifier string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cube" => Some(Self::Cube),
            "sphere" => Some(Self::Sphere),
            _ => None,
        }
    }
}

impl std::fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cube => write!(f, "cube"),
            Self::Sphere => write!(f, "sphere"),
        }
    }
}

/// Bounded 3D manifold: a kind plus a positive scale.
///
/// Exposes uniform interior sampling for the self-organizing-map layout and
/// `{kind, scale}` for comparison and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    kind: TopologyKind,
    scale: f64,
}

impl Topology {
    /// Create a topology.
    ///
    /// # Panics
    /// Panics if `scale` is not strictly positive.
    pub fn new(kind: TopologyKind, scale: f64) -> Self {
        assert!(scale > 0.0, "topology scale must be positive, got {scale}");
        Self { kind, scale }
    }

    /// Cube bounded by `[-scale, scale]^3`.
    pub fn cube(scale: f64) -> Self {
        Self::new(TopologyKind::Cube, scale)
    }

    /// Ball of radius `scale`.
    pub fn sphere(scale: f64) -> Self {
        Self::new(TopologyKind::Sphere, scale)
    }

    /// The manifold kind.
    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    /// The manifold scale.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sample a point uniformly from the interior.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        match self.kind {
            TopologyKind::Cube => Position::new(
                rng.gen_range(-self.scale..=self.scale),
                rng.gen_range(-self.scale..=self.scale),
                rng.gen_range(-self.scale..=self.scale),
            ),
            TopologyKind::Sphere => {
                // Rejection sampling from the bounding cube keeps the
                // interior distribution uniform; acceptance ratio is ~0.52.
                loop {
                    let p = Position::new(
                        rng.gen_range(-self.scale..=self.scale),
                        rng.gen_range(-self.scale..=self.scale),
                        rng.gen_range(-self.scale..=self.scale),
                    );
                    if p.norm() <= self.scale {
                        return p;
                    }
                }
            }
        }
    }

    /// True when the point lies inside the bound (with a small tolerance for
    /// accumulated floating-point drift).
    pub fn contains(&self, p: &Position) -> bool {
        let eps = 1e-9 * self.scale;
        match self.kind {
            TopologyKind::Cube => {
                let bound = self.scale + eps;
                p.x.abs() <= bound && p.y.abs() <= bound && p.z.abs() <= bound
            }
            TopologyKind::Sphere => p.norm() <= self.scale + eps,
        }
    }

    /// Clamp a point into the bound, leaving interior points untouched.
    pub fn clamp(&self, p: &Position) -> Position {
        match self.kind {
            TopologyKind::Cube => Position::new(
                p.x.clamp(-self.scale, self.scale),
                p.y.clamp(-self.scale, self.scale),
                p.z.clamp(-self.scale, self.scale),
            ),
            TopologyKind::Sphere => {
                let n = p.norm();
                if n <= self.scale || n == 0.0 {
                    *p
                } else {
                    let f = self.scale / n;
                    Position::new(p.x * f, p.y * f, p.z * f)
                }
            }
        }
    }
}
