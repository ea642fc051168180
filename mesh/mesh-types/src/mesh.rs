//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Triangle};
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh as handed over by the slicer.
///
/// Vertices and faces are stored separately, faces referencing vertices by
/// index. The mesh is not required to be closed or manifold; support
/// generation works on whatever the model file contained.
///
/// # Invariant
///
/// Every face index should be `< vertices.len()`. The fields are public, so
/// this is not enforced here; consumers that build acceleration structures
/// check it with [`TriangleMesh::first_invalid_face`].
///
/// # Example
///
/// ```
/// use mesh_types::{MeshTopology, Point3, TriangleMesh};
///
/// let mesh = TriangleMesh::from_parts(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as indices into `vertices`, CCW seen from outside.
    pub faces: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertex and face tables.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from flat coordinate and index arrays.
    ///
    /// * `positions` - `[x0, y0, z0, x1, y1, z1, ...]`
    /// * `indices` - `[a0, b0, c0, a1, b1, c1, ...]`
    ///
    /// Returns an empty mesh if either length is not a multiple of three.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{MeshTopology, TriangleMesh};
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let mesh = TriangleMesh::from_raw(&positions, &[0, 1, 2]);
    /// assert_eq!(mesh.vertex_count(), 3);
    ///
    /// let broken = TriangleMesh::from_raw(&positions[..4], &[0, 1, 2]);
    /// assert!(broken.vertices.is_empty());
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();
        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Self { vertices, faces }
    }

    /// Find the first face referencing a vertex that does not exist.
    ///
    /// Returns `(face_index, offending_vertex_index)`.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{Point3, TriangleMesh};
    ///
    /// let mesh = TriangleMesh::from_parts(vec![Point3::origin(); 3], vec![[0, 1, 2], [0, 1, 3]]);
    /// assert_eq!(mesh.first_invalid_face(), Some((1, 3)));
    /// ```
    #[must_use]
    pub fn first_invalid_face(&self) -> Option<(usize, u32)> {
        let count = self.vertices.len();
        self.faces.iter().enumerate().find_map(|(face, indices)| {
            indices
                .iter()
                .find(|&&i| i as usize >= count)
                .map(|&i| (face, i))
        })
    }

    /// Translate every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Lowest Z coordinate of any vertex, or `None` for a mesh without vertices.
    #[must_use]
    pub fn min_z(&self) -> Option<f64> {
        self.vertices.iter().map(|v| v.z).reduce(f64::min)
    }

    /// Merge another mesh into this one.
    ///
    /// The other mesh's vertices are appended and its face indices are
    /// shifted by this mesh's prior vertex count. Nothing is deduplicated.
    ///
    /// # Note
    ///
    /// Indices are `u32`; meshes beyond ~4 billion vertices are unsupported.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|&[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    fn resolve(&self, [a, b, c]: [u32; 3]) -> Triangle {
        Triangle::new(
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        )
    }
}

impl MeshTopology for TriangleMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<Point3<f64>> {
        self.vertices.get(index).copied()
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }

    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        let face = *self.faces.get(face_index)?;
        if face.iter().any(|&i| i as usize >= self.vertices.len()) {
            return None;
        }
        Some(self.resolve(face))
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        (0..self.faces.len()).filter_map(|i| self.triangle(i))
    }
}

impl MeshBounds for TriangleMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }
}

/// Build a closed unit cube from (0,0,0) to (1,1,1) with outward normals.
///
/// Handy as a watertight fixture for ray parity and distance tests.
///
/// # Example
///
/// ```
/// use mesh_types::{MeshTopology, unit_cube};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> TriangleMesh {
    let positions = [
        0.0, 0.0, 0.0, // 0
        1.0, 0.0, 0.0, // 1
        1.0, 1.0, 0.0, // 2
        0.0, 1.0, 0.0, // 3
        0.0, 0.0, 1.0, // 4
        1.0, 0.0, 1.0, // 5
        1.0, 1.0, 1.0, // 6
        0.0, 1.0, 1.0, // 7
    ];
    let indices = [
        0, 2, 1, 0, 3, 2, // bottom, -Z
        4, 5, 6, 4, 6, 7, // top, +Z
        0, 1, 5, 0, 5, 4, // front, -Y
        3, 7, 6, 3, 6, 2, // back, +Y
        0, 4, 7, 0, 7, 3, // left, -X
        1, 2, 6, 1, 6, 5, // right, +X
    ];
    TriangleMesh::from_raw(&positions, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mesh_without_faces_is_empty() {
        let mut mesh = TriangleMesh::new();
        assert!(mesh.is_empty());

        mesh.vertices.push(Point3::origin());
        assert!(mesh.is_empty());

        mesh.faces.push([0, 0, 0]);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn from_raw_rejects_ragged_input() {
        let mesh = TriangleMesh::from_raw(&[0.0, 1.0], &[0, 1, 2]);
        assert_eq!(mesh, TriangleMesh::new());
    }

    #[test]
    fn first_invalid_face_reports_offender() {
        let mut mesh = unit_cube();
        assert_eq!(mesh.first_invalid_face(), None);

        mesh.faces.push([1, 2, 99]);
        assert_eq!(mesh.first_invalid_face(), Some((12, 99)));
        assert!(mesh.triangle(12).is_none());
        assert_eq!(mesh.triangles().count(), 12);
    }

    #[test]
    fn merge_offsets_indices() {
        let mut a =
            TriangleMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]);
        let b = a.clone();

        a.merge(&b);
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.faces, vec![[0, 1, 2], [3, 4, 5]]);
    }

    #[test]
    fn min_z_tracks_lowest_vertex() {
        let mut cube = unit_cube();
        assert_eq!(TriangleMesh::new().min_z(), None);

        cube.translate(Vector3::new(0.0, 0.0, -2.5));
        assert_relative_eq!(cube.min_z().unwrap_or(f64::NAN), -2.5);
        assert_relative_eq!(cube.bounds().max.z, -1.5);
    }

    #[test]
    fn unit_cube_surface_area() {
        assert_relative_eq!(unit_cube().surface_area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_cube_normals_point_outward() {
        let cube = unit_cube();
        let center = cube.center();
        for tri in cube.triangles() {
            let normal = tri.normal().unwrap_or_else(Vector3::zeros);
            assert!(normal.dot(&(tri.centroid() - center)) > 0.0);
        }
    }
}
