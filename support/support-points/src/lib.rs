//! Support point records and surface normal estimation.
//!
//! Support heads must meet the model perpendicular to its surface, so every
//! candidate point needs the normal of the surface underneath it. This
//! crate estimates those normals against an
//! [`AcceleratedMesh`](mesh_query::AcceleratedMesh), in parallel and with
//! cooperative cancellation, and defines the records the support pipeline
//! passes around.
//!
//! # Example
//!
//! ```
//! use mesh_query::AcceleratedMesh;
//! use mesh_types::{Point3, point_set_from_points, unit_cube};
//! use support_points::{CancelToken, normals};
//!
//! let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
//! let points = point_set_from_points(&[
//!     Point3::new(0.25, 0.5, 2.0),
//!     Point3::new(-1.0, 0.25, 0.5),
//! ]);
//!
//! let token = CancelToken::new();
//! let n = normals(&points, &mesh, 0.05, &token, None).unwrap();
//! assert!((n[(0, 2)] - 1.0).abs() < 1e-12);
//! assert!((n[(1, 0)] + 1.0).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cancel;
mod error;
mod normals;
mod params;
mod point;

pub use cancel::{CancelToken, Cancellation, NeverCancel};
pub use error::{SupportError, SupportResult};
pub use normals::{NormalEstimate, estimate_normals, estimate_normals_sequential, normals};
pub use params::{EdgePolicy, NormalParams};
pub use point::{DrainHole, PointsStatus, RADIUS_EPSILON, SupportPoint, support_point_set};
