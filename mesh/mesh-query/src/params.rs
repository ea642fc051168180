//! Parameters for building the mesh index.

/// Tuning knobs for [`AcceleratedMesh`](crate::AcceleratedMesh).
///
/// The defaults suit support generation on printable models (thousands to
/// millions of faces, millimeter units).
///
/// # Example
///
/// ```
/// use mesh_query::QueryParams;
///
/// let params = QueryParams::default();
/// assert_eq!(params.max_leaf_size, 4);
///
/// let single_threaded = QueryParams::sequential().max_leaf_size(8);
/// assert_eq!(single_threaded.parallel_threshold, usize::MAX);
/// assert_eq!(single_threaded.max_leaf_size, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryParams {
    /// Maximum number of faces stored in one leaf of the hierarchy.
    /// Zero is treated as one.
    pub max_leaf_size: usize,

    /// Subtrees with at least this many faces are built on the rayon pool.
    pub parallel_threshold: usize,

    /// Ray hits closer to the origin than this are ignored, so a ray cast
    /// from a point on the surface does not report that surface.
    /// Measured in world units, whatever the length of the direction.
    pub min_hit_distance: f64,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            max_leaf_size: 4,
            parallel_threshold: 4096,
            min_hit_distance: 1e-10,
        }
    }
}

impl QueryParams {
    /// One face per leaf: deepest tree, fewest triangle tests per query.
    #[must_use]
    pub const fn precise() -> Self {
        Self {
            max_leaf_size: 1,
            parallel_threshold: 4096,
            min_hit_distance: 1e-10,
        }
    }

    /// Never build on the thread pool.
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            max_leaf_size: 4,
            parallel_threshold: usize::MAX,
            min_hit_distance: 1e-10,
        }
    }

    /// Set the leaf size.
    #[must_use]
    pub const fn max_leaf_size(mut self, size: usize) -> Self {
        self.max_leaf_size = size;
        self
    }

    /// Set the parallel build threshold.
    #[must_use]
    pub const fn parallel_threshold(mut self, faces: usize) -> Self {
        self.parallel_threshold = faces;
        self
    }

    /// Set the minimum accepted hit distance.
    #[must_use]
    pub const fn min_hit_distance(mut self, distance: f64) -> Self {
        self.min_hit_distance = distance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_where_named() {
        let d = QueryParams::default();
        assert_eq!(QueryParams::precise(), d.max_leaf_size(1));
        assert_eq!(QueryParams::sequential(), d.parallel_threshold(usize::MAX));
    }

    #[test]
    fn builder_sets_hit_distance() {
        let p = QueryParams::default().min_hit_distance(0.5);
        assert!((p.min_hit_distance - 0.5).abs() < f64::EPSILON);
    }
}
