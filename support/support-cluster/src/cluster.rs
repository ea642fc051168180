//! Connected-component clustering with a size cap.

use crate::grid::PointGrid;
use mesh_types::{PointSet, point_at};
use nalgebra::Point3;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Indices of the points in one cluster, in input order.
pub type Cluster = Vec<u32>;

/// A partition of the input indices into clusters.
pub type ClusteredPoints = Vec<Cluster>;

/// A point handed to adjacency predicates: its position and the caller's index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPoint {
    /// Position, as returned by the caller's lookup.
    pub position: Point3<f64>,
    /// The caller's index for this point.
    pub index: u32,
}

/// Grid cells are this much wider than the radius so rounding in the cell
/// computation never puts two neighbours two cells apart.
const CELL_MARGIN: f64 = 1e-9;

/// Cluster the points behind `indices` by Euclidean distance.
///
/// Two points are adjacent when their distance is at most `dist`. Clusters
/// are the connected components of that adjacency, grown breadth-first
/// from the first unassigned index in input order. A cluster that reaches
/// `max_points` members is closed, and the rest of its component seeds
/// later clusters; `max_points == 0` means no cap.
///
/// `point_fn` maps an index to its position and is only borrowed for the
/// duration of the call. Repeated indices are treated as one.
///
/// # Example
///
/// ```
/// use nalgebra::Point3;
/// use support_cluster::cluster_by_distance;
///
/// let xs = [0.0, 1.0, 2.0, 10.0, 11.0];
/// let at = |i: u32| Point3::new(xs[i as usize], 0.0, 0.0);
/// let clusters = cluster_by_distance(&[0, 1, 2, 3, 4], at, 1.5, 10);
/// assert_eq!(clusters, vec![vec![0, 1, 2], vec![3, 4]]);
///
/// let capped = cluster_by_distance(&[0, 1, 2, 3, 4], at, 1.5, 2);
/// assert_eq!(capped, vec![vec![0, 1], vec![2], vec![3, 4]]);
/// ```
#[must_use]
pub fn cluster_by_distance<F>(
    indices: &[u32],
    point_fn: F,
    dist: f64,
    max_points: usize,
) -> ClusteredPoints
where
    F: Fn(u32) -> Point3<f64>,
{
    let elements = collect_elements(indices, point_fn);
    let clusters = cluster_within(&elements, dist, max_points);
    debug!(
        points = elements.len(),
        clusters = clusters.len(),
        dist,
        max_points,
        "Clustered points by distance"
    );
    clusters
}

/// Cluster the rows of a point set by distance; indices are row numbers.
///
/// Same rules as [`cluster_by_distance`]. Indices are `u32`, so only the
/// first `u32::MAX` rows are clustered; a warning is logged when a larger
/// set is truncated.
#[must_use]
pub fn cluster_point_set(points: &PointSet, dist: f64, max_points: usize) -> ClusteredPoints {
    let rows = addressable_rows(points.nrows());
    let indices: Vec<u32> = (0..rows).collect();
    cluster_by_distance(&indices, |row| point_at(points, row as usize), dist, max_points)
}

/// Number of leading rows a `u32` index can reach.
fn addressable_rows(nrows: usize) -> u32 {
    u32::try_from(nrows).unwrap_or_else(|_| {
        warn!(
            rows = nrows,
            kept = u32::MAX,
            "Point set exceeds u32 indexing; clustering leading rows only"
        );
        u32::MAX
    })
}

/// Cluster the points behind `indices` with a caller-defined adjacency.
///
/// `predicate(current, candidate)` decides whether `candidate` joins the
/// cluster being grown from `current`; it need not be symmetric. The seed
/// of every cluster is always part of it. Otherwise the same rules as
/// [`cluster_by_distance`] apply.
///
/// Each expansion scans all unassigned points, so this is quadratic in the
/// worst case; prefer the distance variants when they fit.
///
/// # Example
///
/// ```
/// use nalgebra::Point3;
/// use support_cluster::cluster_by_predicate;
///
/// // Same height (within 0.1) counts as adjacent.
/// let zs = [0.0, 5.0, 0.05, 5.02];
/// let clusters = cluster_by_predicate(
///     &[0, 1, 2, 3],
///     |i| Point3::new(i as f64, 0.0, zs[i as usize]),
///     |a, b| (a.position.z - b.position.z).abs() <= 0.1,
///     0,
/// );
/// assert_eq!(clusters, vec![vec![0, 2], vec![1, 3]]);
/// ```
#[must_use]
pub fn cluster_by_predicate<F, P>(
    indices: &[u32],
    point_fn: F,
    predicate: P,
    max_points: usize,
) -> ClusteredPoints
where
    F: Fn(u32) -> Point3<f64>,
    P: Fn(&IndexedPoint, &IndexedPoint) -> bool,
{
    let elements = collect_elements(indices, point_fn);
    let clusters = grow_clusters(&elements, max_points, |current, assigned, out| {
        let from = &elements[current];
        out.extend(
            elements
                .iter()
                .enumerate()
                .filter(|&(slot, to)| !assigned[slot] && predicate(from, to))
                .map(|(slot, _)| slot),
        );
    });
    debug!(
        points = elements.len(),
        clusters = clusters.len(),
        max_points,
        "Clustered points by predicate"
    );
    clusters
}

/// Resolve positions once, dropping repeated indices.
fn collect_elements<F>(indices: &[u32], point_fn: F) -> Vec<IndexedPoint>
where
    F: Fn(u32) -> Point3<f64>,
{
    let mut seen = hashbrown::HashSet::with_capacity(indices.len());
    indices
        .iter()
        .filter(|&&index| seen.insert(index))
        .map(|&index| IndexedPoint {
            position: point_fn(index),
            index,
        })
        .collect()
}

fn cluster_within(elements: &[IndexedPoint], dist: f64, max_points: usize) -> ClusteredPoints {
    let adjacent = |a: &IndexedPoint, b: &IndexedPoint| {
        dist >= 0.0 && (a.position - b.position).norm_squared() <= dist * dist
    };

    if dist.is_finite() && dist > 0.0 {
        let positions: Vec<Point3<f64>> = elements.iter().map(|e| e.position).collect();
        let grid = PointGrid::new(&positions, dist * (1.0 + CELL_MARGIN));
        let mut candidates = Vec::new();
        grow_clusters(elements, max_points, |current, assigned, out| {
            let from = &elements[current];
            candidates.clear();
            grid.candidates(&from.position, &mut candidates);
            out.extend(
                candidates
                    .iter()
                    .copied()
                    .filter(|&slot| !assigned[slot] && adjacent(from, &elements[slot])),
            );
        })
    } else {
        // Zero, negative, infinite or NaN thresholds: no useful cell size.
        grow_clusters(elements, max_points, |current, assigned, out| {
            let from = &elements[current];
            out.extend(
                elements
                    .iter()
                    .enumerate()
                    .filter(|&(slot, to)| !assigned[slot] && adjacent(from, to))
                    .map(|(slot, _)| slot),
            );
        })
    }
}

/// Breadth-first component growth over element slots.
///
/// `neighbours(current, assigned, out)` pushes the unassigned slots adjacent
/// to `current`; order and duplicates do not matter, candidates are taken
/// in input order.
fn grow_clusters<N>(
    elements: &[IndexedPoint],
    max_points: usize,
    mut neighbours: N,
) -> ClusteredPoints
where
    N: FnMut(usize, &[bool], &mut Vec<usize>),
{
    let cap = if max_points == 0 { usize::MAX } else { max_points };
    let mut assigned = vec![false; elements.len()];
    let mut clusters = ClusteredPoints::new();
    let mut queue = VecDeque::new();
    let mut found = Vec::new();

    for seed in 0..elements.len() {
        if assigned[seed] {
            continue;
        }
        assigned[seed] = true;
        let mut members = vec![seed];
        queue.clear();
        queue.push_back(seed);

        'grow: while let Some(current) = queue.pop_front() {
            if members.len() >= cap {
                break;
            }
            found.clear();
            neighbours(current, &assigned, &mut found);
            found.sort_unstable();
            found.dedup();

            for &slot in &found {
                if members.len() >= cap {
                    break 'grow;
                }
                if assigned[slot] {
                    continue;
                }
                assigned[slot] = true;
                members.push(slot);
                queue.push_back(slot);
            }
        }

        members.sort_unstable();
        clusters.push(members.into_iter().map(|slot| elements[slot].index).collect());
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::point_set_from_points;

    fn on_x_axis(xs: &[f64]) -> impl Fn(u32) -> Point3<f64> + '_ {
        move |i| Point3::new(xs[i as usize], 0.0, 0.0)
    }

    #[test]
    fn two_groups_far_apart() {
        let xs = [0.0, 1.0, 2.0, 10.0, 11.0];
        let clusters = cluster_by_distance(&[0, 1, 2, 3, 4], on_x_axis(&xs), 1.5, 10);
        assert_eq!(clusters, vec![vec![0, 1, 2], vec![3, 4]]);
    }

    #[test]
    fn cap_splits_components_in_input_order() {
        let xs = [0.0, 1.0, 2.0, 10.0, 11.0];
        let clusters = cluster_by_distance(&[0, 1, 2, 3, 4], on_x_axis(&xs), 1.5, 2);
        assert_eq!(clusters, vec![vec![0, 1], vec![2], vec![3, 4]]);
    }

    #[test]
    fn cap_of_one_gives_singletons() {
        let xs = [0.0, 0.1, 0.2];
        let clusters = cluster_by_distance(&[0, 1, 2], on_x_axis(&xs), 1.0, 1);
        assert_eq!(clusters, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let xs = [0.0, 1.0];
        assert_eq!(cluster_by_distance(&[0, 1], on_x_axis(&xs), 1.0, 0), vec![vec![0, 1]]);
        assert_eq!(
            cluster_by_distance(&[0, 1], on_x_axis(&xs), 0.999, 0),
            vec![vec![0], vec![1]]
        );
    }

    #[test]
    fn chain_links_through_intermediate_points() {
        let xs: Vec<f64> = (0..50).map(f64::from).collect();
        let indices: Vec<u32> = (0..50).collect();
        let clusters = cluster_by_distance(&indices, on_x_axis(&xs), 1.0, 0);
        assert_eq!(clusters, vec![indices]);
    }

    #[test]
    fn caller_indices_are_reported() {
        let xs = [0.0, 0.0, 0.0, 5.0, 0.0, 5.5, 0.0, 0.0, 9.0];
        let clusters = cluster_by_distance(&[8, 3, 5], on_x_axis(&xs), 1.0, 0);
        assert_eq!(clusters, vec![vec![8], vec![3, 5]]);
    }

    #[test]
    fn repeated_indices_count_once() {
        let xs = [0.0, 0.5];
        let clusters = cluster_by_distance(&[1, 0, 1, 0], on_x_axis(&xs), 1.0, 0);
        assert_eq!(clusters, vec![vec![1, 0]]);
    }

    #[test]
    fn coincident_points_form_one_cluster() {
        let indices: Vec<u32> = (0..1000).collect();
        let clusters = cluster_by_distance(&indices, |_| Point3::new(3.0, 3.0, 3.0), 0.1, 0);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 1000);

        let zero = cluster_by_distance(&indices, |_| Point3::new(3.0, 3.0, 3.0), 0.0, 0);
        assert_eq!(zero.len(), 1);
    }

    #[test]
    fn degenerate_thresholds() {
        let xs = [0.0, 0.0, 1.0];
        let singletons = vec![vec![0], vec![1], vec![2]];
        assert_eq!(cluster_by_distance(&[0, 1, 2], on_x_axis(&xs), -1.0, 0), singletons);
        assert_eq!(cluster_by_distance(&[0, 1, 2], on_x_axis(&xs), f64::NAN, 0), singletons);
        assert_eq!(
            cluster_by_distance(&[0, 1, 2], on_x_axis(&xs), f64::INFINITY, 0),
            vec![vec![0, 1, 2]]
        );
        assert_eq!(
            cluster_by_distance(&[0, 1, 2], on_x_axis(&xs), 0.0, 0),
            vec![vec![0, 1], vec![2]]
        );
    }

    #[test]
    fn empty_input_has_no_clusters() {
        assert!(cluster_by_distance(&[], |_| Point3::origin(), 1.0, 3).is_empty());
        assert!(cluster_point_set(&PointSet::zeros(0), 1.0, 3).is_empty());
        assert!(cluster_by_predicate(&[], |_| Point3::origin(), |_, _| true, 0).is_empty());
    }

    #[test]
    fn point_set_rows_are_indices() {
        let set = point_set_from_points(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(0.0, 0.5, 0.0),
        ]);
        assert_eq!(cluster_point_set(&set, 1.0, 0), vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn addressable_rows_saturates_at_u32_max() {
        assert_eq!(addressable_rows(0), 0);
        assert_eq!(addressable_rows(3), 3);
        assert_eq!(addressable_rows(u32::MAX as usize), u32::MAX);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn addressable_rows_truncates_oversized_sets() {
        assert_eq!(addressable_rows(u32::MAX as usize + 5), u32::MAX);
    }

    #[test]
    fn predicate_seed_is_always_included() {
        let clusters = cluster_by_predicate(&[4, 7], |_| Point3::origin(), |_, _| false, 0);
        assert_eq!(clusters, vec![vec![4], vec![7]]);
    }

    #[test]
    fn predicate_sees_current_then_candidate() {
        // Only points strictly above the current one may join.
        let zs = [0.0, 1.0, 2.0];
        let clusters = cluster_by_predicate(
            &[2, 0, 1],
            |i| Point3::new(0.0, 0.0, zs[i as usize]),
            |current, candidate| candidate.position.z > current.position.z,
            0,
        );
        // Seed 2 (top) attracts nothing, seed 0 grows upward through 1.
        assert_eq!(clusters, vec![vec![2], vec![0, 1]]);
    }

    #[test]
    fn predicate_respects_cap() {
        let indices: Vec<u32> = (0..7).collect();
        let clusters = cluster_by_predicate(&indices, |_| Point3::origin(), |_, _| true, 3);
        assert_eq!(clusters, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
    }
}
