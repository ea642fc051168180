//! Bounding volume hierarchy over the faces of an [`AcceleratedMesh`].
//!
//! Median split along the longest axis of each node's box, with subtrees
//! above the parallel threshold built through `rayon::join`. The tree is
//! private to the crate; callers only see query results in face indices.
//!
//! [`AcceleratedMesh`]: crate::AcceleratedMesh

use crate::geometry::{Ray, closest_point_on_triangle, ray_triangle_intersect};
use crate::QueryParams;
use mesh_types::{Aabb, Triangle};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;
use tracing::debug;

/// Node boxes are padded by this fraction of the scene size so rays that
/// graze a face on the box boundary are not lost to rounding.
const RELATIVE_PADDING: f64 = 1e-9;

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bbox: Aabb,
        faces: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    const fn bbox(&self) -> &Aabb {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

/// Shape of a built hierarchy, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BvhStats {
    pub node_count: usize,
    pub leaf_count: usize,
    pub max_depth: usize,
    pub max_leaf_size: usize,
}

/// The hierarchy plus the resolved triangles it indexes.
#[derive(Debug)]
pub(crate) struct Bvh {
    root: Option<BvhNode>,
    triangles: Vec<Triangle>,
}

/// Nearest-so-far record; ties on distance go to the lower face index.
fn improves(candidate: (f64, u32), best: Option<(f64, u32)>) -> bool {
    best.is_none_or(|(d, face)| candidate.0 < d || (candidate.0 == d && candidate.1 < face))
}

impl Bvh {
    /// Build the hierarchy. Faces are numbered by their position in `triangles`.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn build(triangles: Vec<Triangle>, params: &QueryParams) -> Self {
        if triangles.is_empty() {
            return Self {
                root: None,
                triangles,
            };
        }

        let bounds: Vec<Aabb> = triangles.iter().map(Triangle::bounds).collect();
        let scene = bounds.iter().fold(Aabb::empty(), |acc, b| acc.union(b));
        let scale = scene.size().amax();
        let padding = RELATIVE_PADDING * (1.0 + if scale.is_finite() { scale } else { 0.0 });

        let mut order: Vec<u32> = (0..triangles.len() as u32).collect();
        let builder = Builder {
            bounds: &bounds,
            max_leaf_size: params.max_leaf_size.max(1),
            parallel_threshold: params.parallel_threshold,
            padding,
        };
        let root = builder.build(&mut order);

        let bvh = Self {
            root: Some(root),
            triangles,
        };
        let stats = bvh.stats();
        debug!(
            faces = bvh.triangles.len(),
            nodes = stats.node_count,
            leaves = stats.leaf_count,
            depth = stats.max_depth,
            "Built mesh BVH"
        );
        bvh
    }

    /// Triangle for a face index.
    pub(crate) fn triangle(&self, face: u32) -> &Triangle {
        &self.triangles[face as usize]
    }

    /// Nearest hit with `t > min_t`, as `(t, face)`.
    pub(crate) fn first_hit(&self, ray: &Ray, min_t: f64) -> Option<(f64, u32)> {
        let root = self.root.as_ref()?;
        let inv = ray.inverse_direction();
        ray.box_interval(root.bbox(), &inv)?;

        let mut best = None;
        self.first_hit_node(root, ray, &inv, min_t, &mut best);
        best
    }

    fn first_hit_node(
        &self,
        node: &BvhNode,
        ray: &Ray,
        inv: &Vector3<f64>,
        min_t: f64,
        best: &mut Option<(f64, u32)>,
    ) {
        match node {
            BvhNode::Leaf { faces, .. } => {
                for &face in faces {
                    if let Some(t) = ray_triangle_intersect(ray, self.triangle(face), min_t) {
                        if improves((t, face), *best) {
                            *best = Some((t, face));
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                let mut children: SmallVec<[(f64, &BvhNode); 2]> = [left, right]
                    .into_iter()
                    .filter_map(|child| {
                        ray.box_interval(child.bbox(), inv)
                            .map(|(t_near, _)| (t_near, child.as_ref()))
                    })
                    .collect();
                children.sort_by(|a, b| a.0.total_cmp(&b.0));

                for (t_near, child) in children {
                    // `<=` keeps equally distant faces in play for the tie-break.
                    if best.is_none_or(|(t, _)| t_near <= t) {
                        self.first_hit_node(child, ray, inv, min_t, best);
                    }
                }
            }
        }
    }

    /// Every hit with `t > min_t`, sorted by `(t, face)`.
    pub(crate) fn all_hits(&self, ray: &Ray, min_t: f64) -> Vec<(f64, u32)> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            let inv = ray.inverse_direction();
            self.all_hits_node(root, ray, &inv, min_t, &mut hits);
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits
    }

    fn all_hits_node(
        &self,
        node: &BvhNode,
        ray: &Ray,
        inv: &Vector3<f64>,
        min_t: f64,
        hits: &mut Vec<(f64, u32)>,
    ) {
        if ray.box_interval(node.bbox(), inv).is_none() {
            return;
        }
        match node {
            BvhNode::Leaf { faces, .. } => {
                hits.extend(faces.iter().filter_map(|&face| {
                    ray_triangle_intersect(ray, self.triangle(face), min_t).map(|t| (t, face))
                }));
            }
            BvhNode::Internal { left, right, .. } => {
                self.all_hits_node(left, ray, inv, min_t, hits);
                self.all_hits_node(right, ray, inv, min_t, hits);
            }
        }
    }

    /// Closest surface point to `point`, as `(squared distance, face, point)`.
    pub(crate) fn closest_point(&self, point: &Point3<f64>) -> Option<(f64, u32, Point3<f64>)> {
        let root = self.root.as_ref()?;
        let mut best: Option<(f64, u32, Point3<f64>)> = None;
        self.closest_node(root, point, &mut best);
        best
    }

    fn closest_node(
        &self,
        node: &BvhNode,
        point: &Point3<f64>,
        best: &mut Option<(f64, u32, Point3<f64>)>,
    ) {
        match node {
            BvhNode::Leaf { faces, .. } => {
                for &face in faces {
                    let on_face = closest_point_on_triangle(point, self.triangle(face));
                    let d2 = (on_face - point).norm_squared();
                    if improves((d2, face), best.map(|(d, f, _)| (d, f))) {
                        *best = Some((d2, face, on_face));
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                let dl = left.bbox().distance_squared_to(point);
                let dr = right.bbox().distance_squared_to(point);
                let (near, d_near, far, d_far) = if dr < dl {
                    (right, dr, left, dl)
                } else {
                    (left, dl, right, dr)
                };

                for (child, d_box) in [(near, d_near), (far, d_far)] {
                    if best.is_none_or(|(d, _, _)| d_box <= d) {
                        self.closest_node(child, point, best);
                    }
                }
            }
        }
    }

    pub(crate) fn stats(&self) -> BvhStats {
        let mut stats = BvhStats::default();
        if let Some(root) = &self.root {
            collect_stats(root, 1, &mut stats);
        }
        stats
    }
}

fn collect_stats(node: &BvhNode, depth: usize, stats: &mut BvhStats) {
    stats.node_count += 1;
    stats.max_depth = stats.max_depth.max(depth);
    match node {
        BvhNode::Leaf { faces, .. } => {
            stats.leaf_count += 1;
            stats.max_leaf_size = stats.max_leaf_size.max(faces.len());
        }
        BvhNode::Internal { left, right, .. } => {
            collect_stats(left, depth + 1, stats);
            collect_stats(right, depth + 1, stats);
        }
    }
}

struct Builder<'a> {
    bounds: &'a [Aabb],
    max_leaf_size: usize,
    parallel_threshold: usize,
    padding: f64,
}

impl Builder<'_> {
    fn build(&self, faces: &mut [u32]) -> BvhNode {
        let bbox = faces
            .iter()
            .fold(Aabb::empty(), |acc, &f| acc.union(&self.bounds[f as usize]))
            .expanded(self.padding);

        if faces.len() <= self.max_leaf_size {
            return BvhNode::Leaf {
                bbox,
                faces: faces.iter().copied().collect(),
            };
        }

        let axis = bbox.longest_axis();
        let key = |f: u32| self.bounds[f as usize].center()[axis];
        let mid = faces.len() / 2;
        faces.select_nth_unstable_by(mid, |&a, &b| key(a).total_cmp(&key(b)).then(a.cmp(&b)));

        let parallel = faces.len() >= self.parallel_threshold;
        let (lower, upper) = faces.split_at_mut(mid);
        let (left, right) = if parallel {
            rayon::join(|| self.build(lower), || self.build(upper))
        } else {
            (self.build(lower), self.build(upper))
        };

        BvhNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
