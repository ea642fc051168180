//! Error types for mesh queries.

use thiserror::Error;

/// Result type for mesh queries.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors produced while building or querying an
/// [`AcceleratedMesh`](crate::AcceleratedMesh).
///
/// A ray that hits nothing is not an error; see
/// [`HitResult::Miss`](crate::HitResult::Miss).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The query needs at least one face.
    #[error("{query} requires a mesh with at least one face")]
    EmptyMesh {
        /// Name of the query that was attempted.
        query: &'static str,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        /// Face index.
        face: usize,
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}
