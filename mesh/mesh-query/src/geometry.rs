//! Point/triangle and ray/triangle primitives.

use mesh_types::{Aabb, Triangle};
use nalgebra::{Point3, Vector3};

/// Relative tolerance below which a ray counts as parallel to a triangle's
/// plane. Scaled by the edge and direction lengths so it is unit-free.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// A ray with an origin and an unnormalized direction.
///
/// Parameters along the ray are in units of `direction`'s length: the point
/// at parameter `t` is `origin + direction * t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start of the ray.
    pub origin: Point3<f64>,
    /// Direction; not required to be unit length.
    pub direction: Vector3<f64>,
}

impl Ray {
    /// Create a ray.
    #[must_use]
    pub const fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Component-wise reciprocal of the direction for slab tests.
    ///
    /// Components too small to invert become `f64::MAX`, which keeps the
    /// slab products finite (no `0 * inf`).
    #[must_use]
    pub fn inverse_direction(&self) -> Vector3<f64> {
        self.direction.map(|d| {
            if d.abs() < f64::MIN_POSITIVE {
                f64::MAX
            } else {
                1.0 / d
            }
        })
    }

    /// Parameter interval `[t_enter, t_exit]` in which the ray is inside
    /// `aabb`, clamped to `t >= 0`. `None` if the ray misses the box.
    #[must_use]
    pub fn box_interval(
        &self,
        aabb: &Aabb,
        inverse_direction: &Vector3<f64>,
    ) -> Option<(f64, f64)> {
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        for axis in 0..3 {
            let t1 = (aabb.min[axis] - self.origin[axis]) * inverse_direction[axis];
            let t2 = (aabb.max[axis] - self.origin[axis]) * inverse_direction[axis];
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        if t_exit >= t_enter && t_exit >= 0.0 {
            Some((t_enter.max(0.0), t_exit))
        } else {
            None
        }
    }
}

/// Closest point of a triangle to `point`.
///
/// Region-based search after Ericson, *Real-Time Collision Detection*:
/// the answer lies in one of the three vertex regions, the three edge
/// regions or the face interior. Degenerate triangles fall back to the
/// nearest point on their edges.
///
/// # Example
///
/// ```
/// use mesh_query::closest_point_on_triangle;
/// use mesh_types::{Point3, Triangle};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// let inside = closest_point_on_triangle(&Point3::new(0.2, 0.2, 3.0), &tri);
/// assert!((inside - Point3::new(0.2, 0.2, 0.0)).norm() < 1e-12);
/// assert_eq!(closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.0), &tri), tri.v0);
/// ```
#[must_use]
pub fn closest_point_on_triangle(point: &Point3<f64>, tri: &Triangle) -> Point3<f64> {
    let [a, b, c] = tri.vertices();
    let ab = b - a;
    let ac = c - a;

    let ap = point - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = point - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = point - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let sum = va + vb + vc;
    if sum.abs() <= f64::MIN_POSITIVE || !sum.is_finite() {
        return closest_point_on_edges(point, tri);
    }
    a + ab * (vb / sum) + ac * (vc / sum)
}

/// Closest point of the segment `[start, end]` to `point`.
#[must_use]
pub fn closest_point_on_segment(
    point: &Point3<f64>,
    start: &Point3<f64>,
    end: &Point3<f64>,
) -> Point3<f64> {
    let d = end - start;
    let len_sq = d.norm_squared();
    if len_sq <= 0.0 {
        return *start;
    }
    let t = ((point - start).dot(&d) / len_sq).clamp(0.0, 1.0);
    start + d * t
}

fn closest_point_on_edges(point: &Point3<f64>, tri: &Triangle) -> Point3<f64> {
    tri.edges()
        .iter()
        .map(|(s, e)| closest_point_on_segment(point, s, e))
        .min_by(|p, q| (p - point).norm_squared().total_cmp(&(q - point).norm_squared()))
        .unwrap_or(tri.v0)
}

/// Ray/triangle intersection (Möller–Trumbore).
///
/// Returns the ray parameter `t` of the intersection if it exists and
/// `t > min_t`. Both faces of the triangle are hit; hits on edges and
/// corners count. Rays parallel to the plane and zero-area triangles never
/// hit.
///
/// # Example
///
/// ```
/// use mesh_query::{Ray, ray_triangle_intersect};
/// use mesh_types::{Point3, Triangle, Vector3};
///
/// let tri = Triangle::new(
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// );
/// let down = Ray::new(Point3::new(0.25, 0.25, 2.0), Vector3::new(0.0, 0.0, -2.0));
/// assert_eq!(ray_triangle_intersect(&down, &tri, 0.0), Some(1.0));
/// ```
#[must_use]
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn ray_triangle_intersect(ray: &Ray, tri: &Triangle, min_t: f64) -> Option<f64> {
    let edge1 = tri.v1 - tri.v0;
    let edge2 = tri.v2 - tri.v0;

    let h = ray.direction.cross(&edge2);
    let det = edge1.dot(&h);
    let scale = edge1.norm() * edge2.norm() * ray.direction.norm();
    // Written so NaN falls through to `None` as well.
    if !(det.abs() > PARALLEL_TOLERANCE * scale) {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = ray.origin - tri.v0;
    let u = inv_det * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv_det * ray.direction.dot(&q);
    if !(v >= 0.0 && u + v <= 1.0) {
        return None;
    }

    let t = inv_det * edge2.dot(&q);
    (t > min_t).then_some(t)
}
