//! The accelerated mesh.

use crate::bvh::Bvh;
use crate::geometry::Ray;
use crate::{GroundLevel, Hit, HitResult, QueryError, QueryParams, QueryResult, SquaredDistance};
use mesh_contour::Contour;
use mesh_types::{Aabb, MeshBounds, MeshTopology, Triangle, TriangleMesh};
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// Direction of the inside/outside parity ray; off every axis and diagonal.
const PARITY_DIRECTION: [f64; 3] = [0.577_215_664_9, 0.318_309_886_2, 0.751_988_341_7];

/// Relative gap under which two hits on the parity ray count as one
/// (the ray passing exactly through a shared edge).
const PARITY_MERGE_TOLERANCE: f64 = 1e-9;

/// An immutable triangle mesh with a spatial index for ray and distance queries.
///
/// Owns copies of the vertex and face tables and a bounding volume
/// hierarchy built once at construction. All queries take `&self` and may
/// run concurrently from any number of threads. The only mutable state is
/// the [`GroundLevel`], which is independent of the geometry.
///
/// # Example
///
/// ```
/// use mesh_query::AcceleratedMesh;
/// use mesh_types::{Point3, Vector3, unit_cube};
///
/// let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
///
/// let hit = mesh.query_ray_hit(&Point3::new(0.5, 0.5, 5.0), &Vector3::new(0.0, 0.0, -1.0));
/// assert!((hit.distance() - 4.0).abs() < 1e-12);
///
/// let d = mesh.squared_distance(&Point3::new(0.5, 0.5, 3.0)).unwrap();
/// assert!((d.value() - 4.0).abs() < 1e-12);
/// assert_eq!(mesh.ground_level(), 0.0);
/// ```
#[derive(Debug)]
pub struct AcceleratedMesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
    bvh: Bvh,
    ground: GroundLevel,
    params: QueryParams,
}

impl AcceleratedMesh {
    /// Index a copy of `mesh` with default parameters.
    ///
    /// # Errors
    ///
    /// [`QueryError::FaceIndexOutOfRange`] if a face references a missing vertex.
    pub fn new(mesh: &TriangleMesh) -> QueryResult<Self> {
        Self::with_params(mesh, QueryParams::default())
    }

    /// Index a copy of `mesh`.
    ///
    /// # Errors
    ///
    /// [`QueryError::FaceIndexOutOfRange`] if a face references a missing vertex.
    pub fn with_params(mesh: &TriangleMesh, params: QueryParams) -> QueryResult<Self> {
        Self::from_parts(mesh.vertices.clone(), mesh.faces.clone(), params)
    }

    /// Index a container, splitting every quad into two triangles.
    ///
    /// # Errors
    ///
    /// [`QueryError::FaceIndexOutOfRange`] if a face references a missing point.
    pub fn from_contour(contour: &Contour) -> QueryResult<Self> {
        Self::from_parts(
            contour.points.clone(),
            contour.triangulated_faces(),
            QueryParams::default(),
        )
    }

    /// Take ownership of vertex and face tables and index them.
    ///
    /// An empty mesh is allowed; ray queries on it miss and distance
    /// queries fail with [`QueryError::EmptyMesh`].
    ///
    /// # Errors
    ///
    /// [`QueryError::FaceIndexOutOfRange`] if a face references a missing vertex.
    pub fn from_parts(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[u32; 3]>,
        params: QueryParams,
    ) -> QueryResult<Self> {
        let mesh = TriangleMesh::from_parts(vertices, faces);
        if let Some((face, index)) = mesh.first_invalid_face() {
            return Err(QueryError::FaceIndexOutOfRange {
                face,
                index,
                vertex_count: mesh.vertices.len(),
            });
        }

        let ground = GroundLevel::new(mesh.min_z().unwrap_or(0.0));
        Ok(Self::index(mesh.vertices, mesh.faces, params, ground))
    }

    /// Build the hierarchy over already validated tables.
    fn index(
        vertices: Vec<Point3<f64>>,
        faces: Vec<[u32; 3]>,
        params: QueryParams,
        ground: GroundLevel,
    ) -> Self {
        let triangles = faces
            .iter()
            .map(|&[a, b, c]| {
                Triangle::new(
                    vertices[a as usize],
                    vertices[b as usize],
                    vertices[c as usize],
                )
            })
            .collect();
        let bvh = Bvh::build(triangles, &params);
        debug!(
            vertices = vertices.len(),
            faces = faces.len(),
            ground_level = ground.level(),
            "Indexed mesh"
        );

        Self {
            vertices,
            faces,
            bvh,
            ground,
            params,
        }
    }

    /// Vertex table.
    #[must_use]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Face table.
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Parameters the index was built with.
    #[must_use]
    pub const fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Effective ground level: base level plus offset.
    #[must_use]
    pub fn ground_level(&self) -> f64 {
        self.ground.effective()
    }

    /// Base ground level, without the offset.
    #[must_use]
    pub fn base_ground_level(&self) -> f64 {
        self.ground.level()
    }

    /// Replace the base ground level.
    pub fn set_ground_level(&self, level: f64) {
        self.ground.set_level(level);
    }

    /// Current ground level offset.
    #[must_use]
    pub fn ground_level_offset(&self) -> f64 {
        self.ground.offset()
    }

    /// Replace the ground level offset. Geometry is unaffected.
    pub fn set_ground_level_offset(&self, offset: f64) {
        self.ground.set_offset(offset);
    }

    /// The ground level record itself.
    #[must_use]
    pub const fn ground(&self) -> &GroundLevel {
        &self.ground
    }

    /// Nearest intersection of the ray `origin + t * direction`, `t > 0`.
    ///
    /// `direction` need not be normalized; the reported distance is the ray
    /// parameter `t`. Intersections within
    /// [`QueryParams::min_hit_distance`] of `origin`, measured in world
    /// units, are ignored so rays cast from the surface do not report their
    /// own face. When several faces are hit at exactly the same distance the
    /// lowest face index wins.
    ///
    /// A zero or non-finite direction never hits.
    #[must_use]
    pub fn query_ray_hit(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> HitResult {
        let ray = Ray::new(*origin, *direction);
        let first = self
            .min_ray_parameter(direction)
            .and_then(|min_t| self.bvh.first_hit(&ray, min_t));
        match first {
            Some((t, face)) => {
                HitResult::Hit(Hit::new(&ray, t, face as usize, self.bvh.triangle(face)))
            }
            None => HitResult::Miss {
                source: *origin,
                direction: *direction,
            },
        }
    }

    /// Every intersection of the ray, nearest first (ties by face index).
    ///
    /// Empty if the ray misses. Same distance rules as
    /// [`AcceleratedMesh::query_ray_hit`].
    #[must_use]
    pub fn query_ray_hits(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Vec<Hit> {
        let Some(min_t) = self.min_ray_parameter(direction) else {
            return Vec::new();
        };
        let ray = Ray::new(*origin, *direction);
        self.bvh
            .all_hits(&ray, min_t)
            .into_iter()
            .map(|(t, face)| Hit::new(&ray, t, face as usize, self.bvh.triangle(face)))
            .collect()
    }

    /// The self-hit guard converted to the ray parameter of `direction`;
    /// `None` for directions that cannot hit anything.
    fn min_ray_parameter(&self, direction: &Vector3<f64>) -> Option<f64> {
        let length = direction.norm();
        if length > 0.0 && length.is_finite() {
            Some(self.params.min_hit_distance / length)
        } else {
            None
        }
    }

    /// Squared distance from `point` to the closest point of the surface.
    ///
    /// Exact: the closest point may be inside a face, on an edge or at a
    /// vertex. Equal distances resolve to the lowest face index.
    ///
    /// # Errors
    ///
    /// [`QueryError::EmptyMesh`] if the mesh has no faces.
    pub fn squared_distance(&self, point: &Point3<f64>) -> QueryResult<SquaredDistance> {
        self.bvh
            .closest_point(point)
            .map(|(value, face, on_mesh)| SquaredDistance {
                value,
                face: face as usize,
                point: on_mesh,
            })
            .ok_or(QueryError::EmptyMesh {
                query: "squared_distance",
            })
    }

    /// Whether `point` lies inside the solid, by counting surface crossings
    /// along a fixed ray. Meaningful for closed meshes only.
    ///
    /// # Errors
    ///
    /// [`QueryError::EmptyMesh`] if the mesh has no faces.
    pub fn is_inside(&self, point: &Point3<f64>) -> QueryResult<bool> {
        if self.faces.is_empty() {
            return Err(QueryError::EmptyMesh { query: "is_inside" });
        }

        let direction = Vector3::from(PARITY_DIRECTION);
        let hits = self.query_ray_hits(point, &direction);
        let mut crossings = 0_usize;
        let mut last = f64::NEG_INFINITY;
        for hit in &hits {
            let t = hit.distance();
            if t - last > PARITY_MERGE_TOLERANCE * (1.0 + t.abs()) {
                crossings += 1;
            }
            last = t;
        }
        Ok(crossings % 2 == 1)
    }

    /// Distance to the surface, negative inside the solid.
    ///
    /// # Errors
    ///
    /// [`QueryError::EmptyMesh`] if the mesh has no faces.
    pub fn signed_distance(&self, point: &Point3<f64>) -> QueryResult<f64> {
        let distance = self.squared_distance(point)?.distance();
        Ok(if self.is_inside(point)? { -distance } else { distance })
    }
}

impl Clone for AcceleratedMesh {
    /// Deep copy; the index is rebuilt for the copy.
    fn clone(&self) -> Self {
        Self::index(
            self.vertices.clone(),
            self.faces.clone(),
            self.params,
            self.ground.clone(),
        )
    }
}

impl MeshTopology for AcceleratedMesh {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<Point3<f64>> {
        self.vertices.get(index).copied()
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn triangle(&self, face_index: usize) -> Option<Triangle> {
        (face_index < self.faces.len()).then(|| *self.bvh.triangle(face_index as u32))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn triangles(&self) -> impl Iterator<Item = Triangle> {
        (0..self.faces.len()).map(|i| *self.bvh.triangle(i as u32))
    }
}

impl MeshBounds for AcceleratedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }
}

impl TryFrom<&TriangleMesh> for AcceleratedMesh {
    type Error = QueryError;

    fn try_from(mesh: &TriangleMesh) -> QueryResult<Self> {
        Self::new(mesh)
    }
}

impl TryFrom<TriangleMesh> for AcceleratedMesh {
    type Error = QueryError;

    fn try_from(mesh: TriangleMesh) -> QueryResult<Self> {
        Self::from_parts(mesh.vertices, mesh.faces, QueryParams::default())
    }
}

impl TryFrom<&Contour> for AcceleratedMesh {
    type Error = QueryError;

    fn try_from(contour: &Contour) -> QueryResult<Self> {
        Self::from_contour(contour)
    }
}

impl From<&AcceleratedMesh> for Contour {
    fn from(mesh: &AcceleratedMesh) -> Self {
        Self {
            points: mesh.vertices.clone(),
            faces3: mesh.faces.clone(),
            faces4: Vec::new(),
        }
    }
}

impl From<&AcceleratedMesh> for TriangleMesh {
    fn from(mesh: &AcceleratedMesh) -> Self {
        Self::from_parts(mesh.vertices.clone(), mesh.faces.clone())
    }
}
