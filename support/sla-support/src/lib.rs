//! Geometry core for SLA support generation.
//!
//! This umbrella crate re-exports the crates a support generator builds on:
//! the mesh container, the accelerated mesh with ray and distance queries,
//! normal estimation, and clustering of candidate points.
//!
//! # Quick Start
//!
//! ```
//! use sla_support::prelude::*;
//!
//! // Index the model
//! let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
//!
//! // Drop a ray onto the top face
//! let hit = mesh.query_ray_hit(&Point3::new(0.25, 0.5, 3.0), &Vector3::new(0.0, 0.0, -1.0));
//! assert!((hit.distance() - 2.0).abs() < 1e-12);
//!
//! // Estimate normals for candidate points
//! let points = point_set_from_points(&[Point3::new(0.25, 0.5, 1.5)]);
//! let n = normals(&points, &mesh, 0.05, &NeverCancel, None).unwrap();
//! assert!((n[(0, 2)] - 1.0).abs() < 1e-12);
//!
//! // Group nearby candidates
//! let clusters = cluster_point_set(&points, 2.0, 0);
//! assert_eq!(clusters, vec![vec![0]]);
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Input mesh, `Triangle`, `Aabb`, N×3 point sets
//! - [`contour`] - Mesh container with merging and OBJ text dumps
//! - [`query`] - BVH-accelerated ray hits, squared distance, ground level
//! - [`points`] - Normal estimation, cancellation, support point records
//! - [`cluster`] - Distance and predicate clustering with a size cap
//!
//! # Feature Flags
//!
//! - `serde` - `Serialize`/`Deserialize` for the plain records

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Input mesh, triangles, bounding boxes and point sets.
pub use mesh_types as types;

/// Mesh container and OBJ text dumps.
pub use mesh_contour as contour;

/// BVH-accelerated mesh queries.
pub use mesh_query as query;

/// Normal estimation and support point records.
pub use support_points as points;

/// Support point clustering.
pub use support_cluster as cluster;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for support generation.
///
/// # Usage
///
/// ```
/// use sla_support::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{
        Aabb, MeshBounds, MeshTopology, Point3, PointSet, Triangle, TriangleMesh, Vector3,
        point_at, point_set_from_points, unit_cube,
    };

    // Container
    pub use mesh_contour::Contour;

    // Queries
    pub use mesh_query::{AcceleratedMesh, Hit, HitResult, QueryParams, SquaredDistance};

    // Normals
    pub use support_points::{
        CancelToken, Cancellation, NeverCancel, NormalParams, SupportPoint, estimate_normals,
        estimate_normals_sequential, normals,
    };

    // Clustering
    pub use support_cluster::{ClusteredPoints, cluster_by_distance, cluster_point_set};
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let mesh = TriangleMesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_module_reexports() {
        let _ = types::TriangleMesh::new();
        let _ = contour::Contour::new();
        let _ = query::QueryParams::default();
        let _ = points::NormalParams::default();
        let _ = cluster::IndexedPoint {
            position: types::Point3::origin(),
            index: 0,
        };
    }
}
