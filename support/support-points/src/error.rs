//! Error types for support point processing.

use mesh_query::QueryError;
use thiserror::Error;

/// Result type for support point processing.
pub type SupportResult<T> = Result<T, SupportError>;

/// Errors produced by normal estimation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SupportError {
    /// The caller's cancellation check fired; no partial output is returned.
    #[error("cancelled after {processed} points")]
    Cancelled {
        /// Points finished before the cancellation was observed.
        processed: usize,
    },

    /// A selected row does not exist in the point set.
    #[error("selected row {index} is out of range for {len} points")]
    IndexOutOfRange {
        /// The offending selection entry.
        index: u32,
        /// Number of rows in the point set.
        len: usize,
    },

    /// A parameter is outside its valid range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// What is wrong.
        reason: String,
    },

    /// The underlying mesh query failed.
    #[error(transparent)]
    Query(#[from] QueryError),
}
