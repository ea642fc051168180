//! Support point, drain hole and status records.

use mesh_types::PointSet;
use nalgebra::{Point3, Vector3};

/// Support points with radii closer than this compare equal.
pub const RADIUS_EPSILON: f32 = 1e-4;

/// A point where a support head touches the model.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportPoint {
    /// Contact position.
    pub pos: Point3<f32>,
    /// Radius of the support head's front sphere.
    pub head_front_radius: f32,
    /// Whether the point supports the lowest layer of a new island.
    pub is_new_island: bool,
}

impl SupportPoint {
    /// Create a support point.
    #[must_use]
    pub const fn new(pos: Point3<f32>, head_front_radius: f32, is_new_island: bool) -> Self {
        Self {
            pos,
            head_front_radius,
            is_new_island,
        }
    }

    /// Build from a packed `[x, y, z, radius, island]` row; any non-zero
    /// island value marks a new island.
    #[must_use]
    pub fn from_row(row: [f32; 5]) -> Self {
        let [x, y, z, radius, island] = row;
        Self::new(Point3::new(x, y, z), radius, island != 0.0)
    }

    /// Pack into a `[x, y, z, radius, island]` row.
    #[must_use]
    pub fn to_row(&self) -> [f32; 5] {
        [
            self.pos.x,
            self.pos.y,
            self.pos.z,
            self.head_front_radius,
            if self.is_new_island { 1.0 } else { 0.0 },
        ]
    }

    /// Position widened to `f64`.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.pos.cast()
    }
}

impl PartialEq for SupportPoint {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
            && (self.head_front_radius - other.head_front_radius).abs() < RADIUS_EPSILON
            && self.is_new_island == other.is_new_island
    }
}

/// Positions of `points` as an N×3 point set, row `i` for point `i`.
#[must_use]
pub fn support_point_set(points: &[SupportPoint]) -> PointSet {
    PointSet::from_fn(points.len(), |row, col| f64::from(points[row].pos[col]))
}

/// A cylindrical hole drilled into a hollowed model to let resin drain.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrainHole {
    /// Position of the hole's base on the surface.
    pub pos: Point3<f32>,
    /// Drilling direction.
    pub normal: Vector3<f32>,
    /// Hole radius.
    pub radius: f32,
    /// Drilling depth.
    pub height: f32,
}

impl DrainHole {
    /// Create a drain hole.
    #[must_use]
    pub const fn new(pos: Point3<f32>, normal: Vector3<f32>, radius: f32, height: f32) -> Self {
        Self {
            pos,
            normal,
            radius,
            height,
        }
    }
}

impl Default for DrainHole {
    fn default() -> Self {
        Self::new(Point3::origin(), Vector3::z(), 5.0, 10.0)
    }
}

impl PartialEq for DrainHole {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
            && self.normal == other.normal
            && (self.radius - other.radius).abs() < RADIUS_EPSILON
            && (self.height - other.height).abs() < RADIUS_EPSILON
    }
}

/// Where a model's support points came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointsStatus {
    /// No points yet.
    #[default]
    NoPoints,
    /// Automatic generation is running.
    Generating,
    /// Points were generated automatically.
    AutoGenerated,
    /// The user edited the points.
    UserModified,
}
