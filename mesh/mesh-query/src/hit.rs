//! Results of ray and distance queries.

use crate::geometry::Ray;
use mesh_types::Triangle;
use nalgebra::{Point3, Vector3};

/// A ray/mesh intersection.
///
/// Distances are ray parameters: `position = source + direction * distance`,
/// so they are in units of the direction's length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    distance: f64,
    face: usize,
    source: Point3<f64>,
    direction: Vector3<f64>,
    normal: Vector3<f64>,
}

impl Hit {
    pub(crate) fn new(ray: &Ray, distance: f64, face: usize, triangle: &Triangle) -> Self {
        Self {
            distance,
            face,
            source: ray.origin,
            direction: ray.direction,
            normal: triangle.normal().unwrap_or_else(Vector3::zeros),
        }
    }

    /// Ray parameter of the intersection.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    /// Index of the face that was hit.
    #[must_use]
    pub const fn face(&self) -> usize {
        self.face
    }

    /// Origin of the ray.
    #[must_use]
    pub const fn source(&self) -> Point3<f64> {
        self.source
    }

    /// Direction of the ray, as given.
    #[must_use]
    pub const fn direction(&self) -> Vector3<f64> {
        self.direction
    }

    /// Intersection point.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.source + self.direction * self.distance
    }

    /// Unit normal of the hit face, `(v1 - v0) × (v2 - v0)` normalized.
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// True if the ray travels along the face normal, i.e. it left the
    /// solid through this face and therefore started inside.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.normal.dot(&self.direction) > 0.0
    }
}

/// Outcome of [`AcceleratedMesh::query_ray_hit`](crate::AcceleratedMesh::query_ray_hit).
///
/// # Example
///
/// ```
/// use mesh_query::HitResult;
///
/// let placeholder = HitResult::default();
/// assert!(!placeholder.is_valid());
/// assert!(placeholder.distance().is_nan());
///
/// let far = HitResult::sentinel(f64::INFINITY);
/// assert_eq!(far.distance(), f64::INFINITY);
/// assert_eq!(far.face(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitResult {
    /// The ray hit the mesh.
    Hit(Hit),
    /// The ray was cast and hit nothing.
    Miss {
        /// Origin of the ray.
        source: Point3<f64>,
        /// Direction of the ray.
        direction: Vector3<f64>,
    },
    /// No ray was cast; carries a preset distance so callers can fold
    /// results with `min`/`max` (e.g. `+inf` as the identity of a minimum).
    Sentinel(f64),
}

impl HitResult {
    /// A placeholder carrying `distance`.
    #[must_use]
    pub const fn sentinel(distance: f64) -> Self {
        Self::Sentinel(distance)
    }

    /// Hit distance; NaN for a miss, the preset value for a sentinel.
    #[must_use]
    pub const fn distance(&self) -> f64 {
        match self {
            Self::Hit(hit) => hit.distance,
            Self::Miss { .. } => f64::NAN,
            Self::Sentinel(d) => *d,
        }
    }

    /// True only for an actual hit.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// The hit, if any.
    #[must_use]
    pub const fn as_hit(&self) -> Option<&Hit> {
        match self {
            Self::Hit(hit) => Some(hit),
            _ => None,
        }
    }

    /// Hit face index; `None` stands for "no face".
    #[must_use]
    pub fn face(&self) -> Option<usize> {
        self.as_hit().map(Hit::face)
    }

    /// Intersection point of a hit.
    #[must_use]
    pub fn position(&self) -> Option<Point3<f64>> {
        self.as_hit().map(Hit::position)
    }

    /// Unit normal of the hit face.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3<f64>> {
        self.as_hit().map(Hit::normal)
    }

    /// True if there is a hit and the ray started inside the solid.
    #[must_use]
    pub fn is_inside(&self) -> bool {
        self.as_hit().is_some_and(Hit::is_inside)
    }

    /// Origin of the cast ray; `None` for a sentinel.
    #[must_use]
    pub const fn source(&self) -> Option<Point3<f64>> {
        match self {
            Self::Hit(hit) => Some(hit.source),
            Self::Miss { source, .. } => Some(*source),
            Self::Sentinel(_) => None,
        }
    }
}

impl Default for HitResult {
    fn default() -> Self {
        Self::Sentinel(f64::NAN)
    }
}

impl From<Hit> for HitResult {
    fn from(hit: Hit) -> Self {
        Self::Hit(hit)
    }
}

/// Outcome of [`AcceleratedMesh::squared_distance`](crate::AcceleratedMesh::squared_distance).
///
/// Only produced by a query on a non-empty mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquaredDistance {
    pub(crate) value: f64,
    pub(crate) face: usize,
    pub(crate) point: Point3<f64>,
}

impl SquaredDistance {
    /// Squared distance to the closest surface point.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Euclidean distance to the closest surface point.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.value.sqrt()
    }

    /// Face containing the closest point.
    #[must_use]
    pub const fn face(&self) -> usize {
        self.face
    }

    /// The closest point itself; may lie on an edge or corner of the face.
    #[must_use]
    pub const fn point_on_mesh(&self) -> Point3<f64> {
        self.point
    }
}
