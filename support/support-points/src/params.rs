//! Parameters for normal estimation.

/// How rows whose closest point sits on a vertex or edge get their normal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgePolicy {
    /// Use the normal of the closest face; the flag is informational.
    #[default]
    NearestFace,

    /// Average the distinct normals of every face sharing the vertex or
    /// edge the closest point lies on.
    AverageAdjacent,
}

/// Parameters for [`estimate_normals`](crate::estimate_normals).
///
/// # Example
///
/// ```
/// use support_points::{EdgePolicy, NormalParams};
///
/// let params = NormalParams::default();
/// assert!((params.eps - 0.05).abs() < 1e-12);
/// assert_eq!(params.edge_policy, EdgePolicy::NearestFace);
///
/// let smooth = NormalParams::averaging().eps(0.1).parallel(false);
/// assert_eq!(smooth.edge_policy, EdgePolicy::AverageAdjacent);
/// assert!(!smooth.parallel);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalParams {
    /// Distance from a face vertex or edge under which a closest point
    /// counts as lying on it. Must be finite and non-negative.
    pub eps: f64,

    /// Normal selection for vertex and edge contacts.
    pub edge_policy: EdgePolicy,

    /// Spread rows across the rayon pool.
    pub parallel: bool,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            eps: 0.05,
            edge_policy: EdgePolicy::NearestFace,
            parallel: true,
        }
    }
}

impl NormalParams {
    /// Smooth normals at vertex and edge contacts.
    #[must_use]
    pub const fn averaging() -> Self {
        Self {
            eps: 0.05,
            edge_policy: EdgePolicy::AverageAdjacent,
            parallel: true,
        }
    }

    /// Set the vertex/edge contact tolerance.
    #[must_use]
    pub const fn eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Set the contact policy.
    #[must_use]
    pub const fn edge_policy(mut self, policy: EdgePolicy) -> Self {
        self.edge_policy = policy;
        self
    }

    /// Enable or disable parallel evaluation.
    #[must_use]
    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.eps.is_finite() && self.eps >= 0.0 {
            Ok(())
        } else {
            Err(format!("eps must be finite and non-negative, got {}", self.eps))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = NormalParams::default();
        assert!((params.eps - 0.05).abs() < f64::EPSILON);
        assert_eq!(params.edge_policy, EdgePolicy::NearestFace);
        assert!(params.parallel);
    }

    #[test]
    fn test_builder_pattern() {
        let params = NormalParams::default()
            .eps(0.2)
            .edge_policy(EdgePolicy::AverageAdjacent)
            .parallel(false);
        assert!((params.eps - 0.2).abs() < f64::EPSILON);
        assert_eq!(params.edge_policy, EdgePolicy::AverageAdjacent);
        assert!(!params.parallel);
    }

    #[test]
    fn test_validate() {
        assert!(NormalParams::default().validate().is_ok());
        assert!(NormalParams::default().eps(0.0).validate().is_ok());
        assert!(NormalParams::default().eps(-1.0).validate().is_err());
        assert!(NormalParams::default().eps(f64::NAN).validate().is_err());
        assert!(NormalParams::default().eps(f64::INFINITY).validate().is_err());
    }
}
