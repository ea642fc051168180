//! Mesh container for generated support geometry.
//!
//! Support structures are assembled from many small pieces (heads, pillars,
//! bridges, pads). Each piece is built as a [`Contour`]: a point list with
//! triangle and quad faces. Pieces are concatenated with
//! [`Contour::merge`] and the result is turned into a
//! [`TriangleMesh`](mesh_types::TriangleMesh) or dumped as OBJ text for
//! inspection.
//!
//! # Example
//!
//! ```
//! use mesh_contour::Contour;
//! use mesh_types::{TriangleMesh, unit_cube};
//!
//! let mut supports = Contour::new();
//! supports.merge(&Contour::from(unit_cube()));
//! supports.merge(&Contour::from(unit_cube()));
//!
//! let mut text = Vec::new();
//! supports.to_obj(&mut text).unwrap();
//! let back = Contour::from_obj(text.as_slice()).unwrap();
//!
//! let mesh = TriangleMesh::from(back);
//! assert_eq!(mesh.faces.len(), 24);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod contour;
mod error;
mod obj;

pub use contour::Contour;
pub use error::{ContourError, ContourResult};
