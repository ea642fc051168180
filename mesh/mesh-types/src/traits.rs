//! Traits shared by the mesh representations.

use crate::{Aabb, Triangle};
use nalgebra::Point3;

/// Read access to an indexed triangle mesh.
///
/// Implemented by the plain input mesh and by the query-side mesh so the
/// same algorithms (normal lookup, export) can run on either.
pub trait MeshTopology {
    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of triangle faces.
    fn face_count(&self) -> usize;

    /// A mesh without vertices or without faces is empty.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 || self.face_count() == 0
    }

    /// Vertex position by index.
    fn vertex(&self, index: usize) -> Option<Point3<f64>>;

    /// Face by index, as three vertex indices.
    fn face(&self, index: usize) -> Option<[u32; 3]>;

    /// Face by index with resolved positions.
    ///
    /// Returns `None` if the face index, or any of its vertex indices, is
    /// out of range.
    fn triangle(&self, face_index: usize) -> Option<Triangle>;

    /// Iterate over all resolvable triangles.
    fn triangles(&self) -> impl Iterator<Item = Triangle>;
}

/// Types that can report an axis-aligned bounding box.
pub trait MeshBounds {
    /// Bounding box of all vertices; empty if there are none.
    fn bounds(&self) -> Aabb;

    /// Bounding box, or `None` if empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }

    /// Center of the bounding box.
    fn center(&self) -> Point3<f64> {
        self.bounds().center()
    }
}
