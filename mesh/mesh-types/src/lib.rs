//! Input geometry types for the SLA support core.
//!
//! This crate provides the plain data types every other crate builds on:
//!
//! - [`TriangleMesh`] - The externally supplied indexed triangle mesh
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`PointSet`] - An N×3 matrix of points, one point per row
//!
//! # Layer 0 Crate
//!
//! No I/O, no logging, no threads. Everything here is a value type that can
//! be built from raw arrays and handed to the query and clustering crates.
//!
//! # Units
//!
//! Unit-agnostic `f64` coordinates. The slicer feeding this crate works in
//! millimeters, so tolerances elsewhere (e.g. the 0.05 normal epsilon) are
//! tuned for that scale.
//!
//! # Coordinate System
//!
//! Right-handed, Z up. The print platform lies at the mesh's minimum Z.
//! Face winding is **counter-clockwise (CCW) when viewed from outside**, so
//! normals computed with the right-hand rule point outward.
//!
//! # Example
//!
//! ```
//! use mesh_types::{MeshTopology, Point3, TriangleMesh};
//!
//! let mut mesh = TriangleMesh::new();
//! mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
//! mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! assert_eq!(mesh.face_count(), 1);
//! assert!(mesh.first_invalid_face().is_none());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bounds;
mod mesh;
mod point_set;
mod traits;
mod triangle;

pub use bounds::Aabb;
pub use mesh::{TriangleMesh, unit_cube};
pub use point_set::{PointSet, point_at, point_set_from_points, points_of, set_row};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
