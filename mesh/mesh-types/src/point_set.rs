//! Point sets stored as N×3 matrices.
//!
//! Support point candidates and their normals travel between stages as
//! dense matrices with one point per row. These helpers convert between the
//! matrix rows and [`Point3`] values.

use nalgebra::{MatrixXx3, Point3, Vector3};

/// N×3 matrix of `f64`, one point (or vector) per row.
pub type PointSet = MatrixXx3<f64>;

/// Build a point set from points, preserving order.
///
/// # Example
///
/// ```
/// use mesh_types::{Point3, point_at, point_set_from_points};
///
/// let set = point_set_from_points(&[Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]);
/// assert_eq!(set.nrows(), 2);
/// assert_eq!(point_at(&set, 1), Point3::new(4.0, 5.0, 6.0));
/// ```
#[must_use]
pub fn point_set_from_points(points: &[Point3<f64>]) -> PointSet {
    PointSet::from_fn(points.len(), |row, col| points[row][col])
}

/// Row `row` as a point.
///
/// # Panics
///
/// Panics if `row >= points.nrows()`.
#[inline]
#[must_use]
pub fn point_at(points: &PointSet, row: usize) -> Point3<f64> {
    Point3::new(points[(row, 0)], points[(row, 1)], points[(row, 2)])
}

/// Overwrite row `row` with the components of `value`.
///
/// # Panics
///
/// Panics if `row >= points.nrows()`.
#[inline]
pub fn set_row(points: &mut PointSet, row: usize, value: &Vector3<f64>) {
    for col in 0..3 {
        points[(row, col)] = value[col];
    }
}

/// All rows as points.
#[must_use]
pub fn points_of(points: &PointSet) -> Vec<Point3<f64>> {
    (0..points.nrows()).map(|row| point_at(points, row)).collect()
}
