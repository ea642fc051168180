//! Surface normal estimation for support point candidates.

use std::sync::atomic::{AtomicUsize, Ordering};

use mesh_query::{AcceleratedMesh, MeshTopology, QueryError, closest_point_on_segment};
use mesh_types::{PointSet, point_at, set_row};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cancel::Cancellation;
use crate::error::{SupportError, SupportResult};
use crate::params::{EdgePolicy, NormalParams};

/// Two face normals closer than this count as the same direction when
/// averaging around a vertex or edge.
const DISTINCT_NORMAL_TOLERANCE: f64 = 1e-3;

/// Result of [`estimate_normals`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalEstimate {
    /// One unit normal per output row; row `k` belongs to selection entry `k`.
    pub normals: PointSet,
    /// Output rows whose closest point lies on a vertex or edge of the
    /// closest face, ascending.
    pub edge_rows: Vec<usize>,
}

impl NormalEstimate {
    fn empty() -> Self {
        Self {
            normals: PointSet::zeros(0),
            edge_rows: Vec::new(),
        }
    }

    /// Number of estimated normals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.normals.nrows()
    }

    /// True if no rows were estimated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normals.nrows() == 0
    }
}

/// Where the closest point sits on its face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contact {
    Interior,
    Vertex(u32),
    Edge(u32, u32),
}

/// Faces incident to each vertex.
struct VertexFaces {
    faces: Vec<Vec<usize>>,
}

impl VertexFaces {
    fn build(faces: &[[u32; 3]], vertex_count: usize) -> Self {
        let mut vertex_faces = vec![Vec::new(); vertex_count];
        for (face_idx, face) in faces.iter().enumerate() {
            for &v in face {
                if let Some(list) = vertex_faces.get_mut(v as usize) {
                    list.push(face_idx);
                }
            }
        }
        Self {
            faces: vertex_faces,
        }
    }

    fn around_vertex(&self, v: u32) -> &[usize] {
        self.faces.get(v as usize).map_or(&[], Vec::as_slice)
    }
}

/// Estimate the surface normal under each point of `points`.
///
/// For every selected row (all rows when `selected` is `None`) the closest
/// face of `mesh` is found and its unit normal written to the matching
/// output row. Rows whose closest point lies within `params.eps` of a vertex
/// or edge of that face are listed in [`NormalEstimate::edge_rows`]; with
/// [`EdgePolicy::AverageAdjacent`] those rows instead receive the normalized
/// sum of the distinct normals of every face sharing the vertex or edge.
///
/// `cancel` is polled once per point, possibly from several rayon workers,
/// so it must be `Sync`. Use [`estimate_normals_sequential`] for a check
/// holding `Cell` or `RefCell` state. Degenerate faces contribute a zero
/// normal.
///
/// # Errors
///
/// - [`SupportError::InvalidParameter`] if `params.eps` is negative or not finite.
/// - [`SupportError::IndexOutOfRange`] if a selected row does not exist.
/// - [`SupportError::Query`] with [`QueryError::EmptyMesh`] if there are
///   points to estimate but the mesh has no faces.
/// - [`SupportError::Cancelled`] if `cancel` fires; no partial output is kept.
///
/// # Example
///
/// ```
/// use mesh_query::AcceleratedMesh;
/// use mesh_types::{Point3, point_set_from_points, unit_cube};
/// use support_points::{NeverCancel, NormalParams, estimate_normals};
///
/// let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
/// let points = point_set_from_points(&[Point3::new(0.25, 0.5, 1.2)]);
///
/// let estimate =
///     estimate_normals(&points, &mesh, &NormalParams::default(), &NeverCancel, None).unwrap();
/// assert!((estimate.normals[(0, 2)] - 1.0).abs() < 1e-12);
/// assert!(estimate.edge_rows.is_empty());
/// ```
pub fn estimate_normals<C>(
    points: &PointSet,
    mesh: &AcceleratedMesh,
    params: &NormalParams,
    cancel: &C,
    selected: Option<&[u32]>,
) -> SupportResult<NormalEstimate>
where
    C: Cancellation + Sync + ?Sized,
{
    let Some(job) = EstimateJob::prepare(points, mesh, params, selected)? else {
        return Ok(NormalEstimate::empty());
    };

    let processed = AtomicUsize::new(0);
    let estimated: SupportResult<Vec<_>> = if params.parallel {
        job.rows
            .par_iter()
            .map(|&row| job.estimate_row(row, cancel, &processed))
            .collect()
    } else {
        job.rows
            .iter()
            .map(|&row| job.estimate_row(row, cancel, &processed))
            .collect()
    };
    job.finish(estimated)
}

/// [`estimate_normals`] on the calling thread only.
///
/// `cancel` need not be `Sync`, so a check built on `Cell` or `RefCell`
/// state is accepted. `params.parallel` is ignored.
///
/// # Errors
///
/// Same as [`estimate_normals`].
///
/// # Example
///
/// ```
/// use std::cell::Cell;
///
/// use mesh_query::AcceleratedMesh;
/// use mesh_types::{Point3, point_set_from_points, unit_cube};
/// use support_points::{NormalParams, estimate_normals_sequential};
///
/// let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
/// let points = point_set_from_points(&[Point3::new(0.25, 0.5, 1.2)]);
/// let polls = Cell::new(0);
/// let cancel = || {
///     polls.set(polls.get() + 1);
///     false
/// };
///
/// let estimate =
///     estimate_normals_sequential(&points, &mesh, &NormalParams::default(), &cancel, None)
///         .unwrap();
/// assert_eq!(estimate.len(), 1);
/// assert_eq!(polls.get(), 1);
/// ```
pub fn estimate_normals_sequential<C>(
    points: &PointSet,
    mesh: &AcceleratedMesh,
    params: &NormalParams,
    cancel: &C,
    selected: Option<&[u32]>,
) -> SupportResult<NormalEstimate>
where
    C: Cancellation + ?Sized,
{
    let Some(job) = EstimateJob::prepare(points, mesh, params, selected)? else {
        return Ok(NormalEstimate::empty());
    };

    let processed = AtomicUsize::new(0);
    let estimated: SupportResult<Vec<_>> = job
        .rows
        .iter()
        .map(|&row| job.estimate_row(row, cancel, &processed))
        .collect();
    job.finish(estimated)
}

/// Unit normals under `points`, with the default policy and tolerance `eps`.
///
/// Shorthand for [`estimate_normals`] keeping only the matrix.
///
/// # Errors
///
/// Same as [`estimate_normals`].
pub fn normals<C>(
    points: &PointSet,
    mesh: &AcceleratedMesh,
    eps: f64,
    cancel: &C,
    selected: Option<&[u32]>,
) -> SupportResult<PointSet>
where
    C: Cancellation + Sync + ?Sized,
{
    let params = NormalParams::default().eps(eps);
    estimate_normals(points, mesh, &params, cancel, selected).map(|estimate| estimate.normals)
}

/// Validated inputs shared by the parallel and sequential drivers.
struct EstimateJob<'a> {
    points: &'a PointSet,
    mesh: &'a AcceleratedMesh,
    eps: f64,
    adjacency: Option<VertexFaces>,
    rows: Vec<usize>,
}

impl<'a> EstimateJob<'a> {
    /// `None` when there is nothing to estimate.
    fn prepare(
        points: &'a PointSet,
        mesh: &'a AcceleratedMesh,
        params: &NormalParams,
        selected: Option<&[u32]>,
    ) -> SupportResult<Option<Self>> {
        params
            .validate()
            .map_err(|reason| SupportError::InvalidParameter { reason })?;

        let rows = selected_rows(points.nrows(), selected)?;
        if rows.is_empty() {
            return Ok(None);
        }
        if mesh.face_count() == 0 {
            return Err(QueryError::EmptyMesh {
                query: "estimate_normals",
            }
            .into());
        }

        info!(
            points = rows.len(),
            faces = mesh.face_count(),
            eps = params.eps,
            policy = ?params.edge_policy,
            "Estimating support point normals"
        );

        let adjacency = match params.edge_policy {
            EdgePolicy::AverageAdjacent => {
                Some(VertexFaces::build(mesh.faces(), mesh.vertex_count()))
            }
            EdgePolicy::NearestFace => None,
        };

        Ok(Some(Self {
            points,
            mesh,
            eps: params.eps,
            adjacency,
            rows,
        }))
    }

    fn estimate_row<C>(
        &self,
        row: usize,
        cancel: &C,
        processed: &AtomicUsize,
    ) -> SupportResult<(Vector3<f64>, bool)>
    where
        C: Cancellation + ?Sized,
    {
        cancel.check(processed.load(Ordering::Relaxed))?;
        let point = point_at(self.points, row);
        let result = estimate_one(&point, self.mesh, self.eps, self.adjacency.as_ref())?;
        processed.fetch_add(1, Ordering::Relaxed);
        Ok(result)
    }

    fn finish(
        &self,
        estimated: SupportResult<Vec<(Vector3<f64>, bool)>>,
    ) -> SupportResult<NormalEstimate> {
        let estimated = match estimated {
            Ok(estimated) => estimated,
            Err(err) => {
                if let SupportError::Cancelled { processed } = err {
                    warn!(processed, total = self.rows.len(), "Normal estimation cancelled");
                }
                return Err(err);
            }
        };

        let mut normals = PointSet::zeros(estimated.len());
        let mut edge_rows = Vec::new();
        for (out_row, (normal, on_edge)) in estimated.iter().enumerate() {
            set_row(&mut normals, out_row, normal);
            if *on_edge {
                edge_rows.push(out_row);
            }
        }

        debug!(
            points = normals.nrows(),
            edge_contacts = edge_rows.len(),
            "Normal estimation complete"
        );

        Ok(NormalEstimate { normals, edge_rows })
    }
}

fn selected_rows(len: usize, selected: Option<&[u32]>) -> SupportResult<Vec<usize>> {
    match selected {
        None => Ok((0..len).collect()),
        Some(indices) => indices
            .iter()
            .map(|&index| {
                let row = index as usize;
                if row < len {
                    Ok(row)
                } else {
                    Err(SupportError::IndexOutOfRange { index, len })
                }
            })
            .collect(),
    }
}

fn estimate_one(
    point: &Point3<f64>,
    mesh: &AcceleratedMesh,
    eps: f64,
    adjacency: Option<&VertexFaces>,
) -> SupportResult<(Vector3<f64>, bool)> {
    let closest = mesh.squared_distance(point)?;
    let face = closest.face();
    let face_normal = face_normal(mesh, face);
    let contact = classify(mesh, face, &closest.point_on_mesh(), eps);

    let normal = match (contact, adjacency) {
        (Contact::Interior, _) | (_, None) => face_normal,
        (Contact::Vertex(v), Some(adjacency)) => {
            average_normal(mesh, adjacency.around_vertex(v).iter().copied())
                .unwrap_or(face_normal)
        }
        (Contact::Edge(a, b), Some(adjacency)) => {
            let sharing = adjacency
                .around_vertex(a)
                .iter()
                .copied()
                .filter(|&f| mesh.faces().get(f).is_some_and(|face| face.contains(&b)));
            average_normal(mesh, sharing).unwrap_or(face_normal)
        }
    };

    Ok((normal, contact != Contact::Interior))
}

fn face_normal(mesh: &AcceleratedMesh, face: usize) -> Vector3<f64> {
    mesh.triangle(face)
        .and_then(|tri| tri.normal())
        .unwrap_or_else(Vector3::zeros)
}

/// Nearest vertex within `eps`, else nearest edge within `eps`.
fn classify(mesh: &AcceleratedMesh, face: usize, on_mesh: &Point3<f64>, eps: f64) -> Contact {
    let (Some(indices), Some(tri)) = (mesh.face(face), mesh.triangle(face)) else {
        return Contact::Interior;
    };
    let corners = tri.vertices();

    let nearest_vertex = (0..3)
        .map(|i| (i, (corners[i] - on_mesh).norm()))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((i, d)) = nearest_vertex {
        if d < eps {
            return Contact::Vertex(indices[i]);
        }
    }

    let nearest_edge = (0..3)
        .map(|i| {
            let j = (i + 1) % 3;
            let on_edge = closest_point_on_segment(on_mesh, &corners[i], &corners[j]);
            (i, j, (on_edge - on_mesh).norm())
        })
        .min_by(|a, b| a.2.total_cmp(&b.2));
    if let Some((i, j, d)) = nearest_edge {
        if d < eps {
            return Contact::Edge(indices[i], indices[j]);
        }
    }

    Contact::Interior
}

/// Normalized sum of the distinct normals of `faces`, or `None` if they
/// cancel out.
fn average_normal(
    mesh: &AcceleratedMesh,
    faces: impl Iterator<Item = usize>,
) -> Option<Vector3<f64>> {
    let mut distinct: Vec<Vector3<f64>> = Vec::new();
    for normal in faces.filter_map(|f| mesh.triangle(f).and_then(|tri| tri.normal())) {
        if distinct
            .iter()
            .all(|seen| (seen - normal).norm() >= DISTINCT_NORMAL_TOLERANCE)
        {
            distinct.push(normal);
        }
    }
    distinct
        .iter()
        .sum::<Vector3<f64>>()
        .try_normalize(f64::EPSILON)
}
