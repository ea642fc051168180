//! Error types for the mesh container.

use thiserror::Error;

/// Result type for container operations.
pub type ContourResult<T> = Result<T, ContourError>;

/// Errors produced while validating or (de)serializing a [`Contour`](crate::Contour).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContourError {
    /// A line of the text dump could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// A face references a point that does not exist.
    #[error("face {face} references point {index}, but only {point_count} points exist")]
    IndexOutOfRange {
        /// Face index (triangles first, then quads); for OBJ input, the
        /// 0-based ordinal of the `f` record.
        face: usize,
        /// Offending point index (0-based).
        index: i64,
        /// Number of points in the container.
        point_count: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContourError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
