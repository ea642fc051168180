//! Ray casting and distance queries on triangle meshes.
//!
//! [`AcceleratedMesh`] wraps an indexed triangle mesh with a bounding volume
//! hierarchy so the support generator can ask, many thousands of times per
//! model:
//!
//! - where does a ray from a support head first meet the model
//!   ([`AcceleratedMesh::query_ray_hit`]) and where does it cross it
//!   ([`AcceleratedMesh::query_ray_hits`]);
//! - how far is a point from the surface, and on which face is the closest
//!   point ([`AcceleratedMesh::squared_distance`]);
//! - where is the print platform ([`AcceleratedMesh::ground_level`]).
//!
//! The index is built once and never changes; every query takes `&self`,
//! so one mesh can serve a whole rayon pool.
//!
//! # Example
//!
//! ```
//! use mesh_query::AcceleratedMesh;
//! use mesh_types::{Point3, TriangleMesh, Vector3};
//!
//! let triangle =
//!     TriangleMesh::from_raw(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], &[0, 1, 2]);
//! let mesh = AcceleratedMesh::new(&triangle).unwrap();
//!
//! let hit = mesh.query_ray_hit(&Point3::new(0.25, 0.25, 1.0), &Vector3::new(0.0, 0.0, -1.0));
//! assert!(hit.is_valid());
//! assert_eq!(hit.face(), Some(0));
//! assert_eq!(hit.normal(), Some(Vector3::new(0.0, 0.0, 1.0)));
//! assert!(!hit.is_inside());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bvh;
mod error;
mod geometry;
mod ground;
mod hit;
mod mesh;
mod params;

pub use error::{QueryError, QueryResult};
pub use geometry::{
    Ray, closest_point_on_segment, closest_point_on_triangle, ray_triangle_intersect,
};
pub use ground::GroundLevel;
pub use hit::{Hit, HitResult, SquaredDistance};
pub use mesh::AcceleratedMesh;
pub use params::QueryParams;

pub use mesh_types::{MeshBounds, MeshTopology};
