//! The mesh container: points plus triangle and quad faces.

use crate::{ContourError, ContourResult};
use mesh_types::{Aabb, MeshBounds, TriangleMesh};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A loose mesh made of points, triangles and quads.
///
/// Support geometry (pillars, heads, pads) is generated piece by piece and
/// glued together with [`Contour::merge`]. Quads are kept as quads until the
/// container is turned into a [`TriangleMesh`].
///
/// No topology checks happen here: duplicate points, degenerate faces and
/// non-manifold edges all pass through untouched.
///
/// # Example
///
/// ```
/// use mesh_contour::Contour;
/// use nalgebra::Point3;
///
/// let mut pad = Contour::new();
/// pad.merge_triangles(&[[
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ]]);
///
/// let mut support = Contour::new();
/// support.merge(&pad).merge(&pad);
///
/// assert_eq!(support.point_count(), 6);
/// assert_eq!(support.faces3[1], [3, 4, 5]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contour {
    /// Point coordinates.
    pub points: Vec<Point3<f64>>,
    /// Triangle faces, indices into `points`.
    pub faces3: Vec<[u32; 3]>,
    /// Quad faces, indices into `points`, corners in winding order.
    pub faces4: Vec<[u32; 4]>,
}

impl Contour {
    /// An empty container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            faces3: Vec::new(),
            faces4: Vec::new(),
        }
    }

    /// True if there are no points, or no faces of either kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || (self.faces3.is_empty() && self.faces4.is_empty())
    }

    /// Number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of faces, triangles and quads together.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces3.len() + self.faces4.len()
    }

    /// Number of triangles after splitting every quad in two.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.faces3.len() + 2 * self.faces4.len()
    }

    /// Append `other` to this container.
    ///
    /// Points are appended and `other`'s face indices are shifted by this
    /// container's prior point count. Both face lists are appended in order.
    /// Nothing is deduplicated, so merging is associative.
    ///
    /// # Note
    ///
    /// Indices are `u32`; containers beyond ~4 billion points are unsupported.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) -> &mut Self {
        debug_assert!(other.validate().is_ok(), "merging a container with dangling indices");

        let offset = self.points.len() as u32;

        self.points.extend_from_slice(&other.points);
        self.faces3
            .extend(other.faces3.iter().map(|f| f.map(|i| i + offset)));
        self.faces4
            .extend(other.faces4.iter().map(|f| f.map(|i| i + offset)));
        self
    }

    /// Append raw triangles given by their corner positions.
    ///
    /// Each triangle adds three new points and one triangle face.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge_triangles(&mut self, triangles: &[[Point3<f64>; 3]]) -> &mut Self {
        self.points.reserve(triangles.len() * 3);
        self.faces3.reserve(triangles.len());

        for corners in triangles {
            let base = self.points.len() as u32;
            self.points.extend_from_slice(corners);
            self.faces3.push([base, base + 1, base + 2]);
        }
        self
    }

    /// Check that every face index refers to an existing point.
    ///
    /// # Errors
    ///
    /// [`ContourError::IndexOutOfRange`] for the first dangling index;
    /// triangles are numbered first, then quads.
    pub fn validate(&self) -> ContourResult<()> {
        let count = self.points.len();
        let triangles = self.faces3.iter().map(|f| f.as_slice());
        let quads = self.faces4.iter().map(|f| f.as_slice());

        for (face, indices) in triangles.chain(quads).enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= count) {
                return Err(ContourError::IndexOutOfRange {
                    face,
                    index: i64::from(index),
                    point_count: count,
                });
            }
        }
        Ok(())
    }

    /// Triangle faces with every quad `[a, b, c, d]` split into `[a, b, c]`
    /// and `[c, d, a]`, quads after the plain triangles.
    #[must_use]
    pub fn triangulated_faces(&self) -> Vec<[u32; 3]> {
        let mut faces = Vec::with_capacity(self.triangle_count());
        faces.extend_from_slice(&self.faces3);
        for &[a, b, c, d] in &self.faces4 {
            faces.push([a, b, c]);
            faces.push([c, d, a]);
        }
        faces
    }
}

impl MeshBounds for Contour {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter())
    }
}

impl From<&TriangleMesh> for Contour {
    fn from(mesh: &TriangleMesh) -> Self {
        Self {
            points: mesh.vertices.clone(),
            faces3: mesh.faces.clone(),
            faces4: Vec::new(),
        }
    }
}

impl From<TriangleMesh> for Contour {
    fn from(mesh: TriangleMesh) -> Self {
        Self {
            points: mesh.vertices,
            faces3: mesh.faces,
            faces4: Vec::new(),
        }
    }
}

impl From<&Contour> for TriangleMesh {
    fn from(contour: &Contour) -> Self {
        Self::from_parts(contour.points.clone(), contour.triangulated_faces())
    }
}

impl From<Contour> for TriangleMesh {
    fn from(contour: Contour) -> Self {
        let faces = contour.triangulated_faces();
        Self::from_parts(contour.points, faces)
    }
}
