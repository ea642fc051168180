//! Property-based tests for mesh queries.
//!
//! Every accelerated answer is checked against a brute-force scan over all
//! faces.
//!
//! Run with: cargo test -p mesh-query -- proptest

use mesh_query::{
    AcceleratedMesh, MeshTopology, QueryParams, Ray, closest_point_on_triangle,
    ray_triangle_intersect,
};
use mesh_types::{Point3, TriangleMesh, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point(range: f64) -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-range..range).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_direction() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-1.0..1.0f64)
        .prop_map(|[x, y, z]| Vector3::new(x, y, z))
        .prop_filter("direction must not vanish", |d| d.norm() > 1e-3)
}

/// A triangle soup with valid indices.
fn arb_mesh(max_faces: usize) -> impl Strategy<Value = TriangleMesh> {
    prop::collection::vec(prop::array::uniform3(arb_point(10.0)), 1..=max_faces).prop_map(
        |tris| {
            let mut mesh = TriangleMesh::new();
            for corners in tris {
                let base = mesh.vertices.len() as u32;
                mesh.vertices.extend_from_slice(&corners);
                mesh.faces.push([base, base + 1, base + 2]);
            }
            mesh
        },
    )
}

fn arb_params() -> impl Strategy<Value = QueryParams> {
    (0usize..6, prop::bool::ANY).prop_map(|(leaf, seq)| {
        let base = if seq {
            QueryParams::sequential()
        } else {
            QueryParams::default().parallel_threshold(2)
        };
        base.max_leaf_size(leaf)
    })
}

// =============================================================================
// Property Tests: Rays
// =============================================================================

proptest! {
    /// The nearest hit agrees with the first of all hits, and with a scan.
    #[test]
    fn nearest_hit_is_first_of_all_hits(
        mesh in arb_mesh(40),
        params in arb_params(),
        origin in arb_point(15.0),
        dir in arb_direction(),
    ) {
        let accel = AcceleratedMesh::with_params(&mesh, params).unwrap();
        let hit = accel.query_ray_hit(&origin, &dir);
        let hits = accel.query_ray_hits(&origin, &dir);

        let ray = Ray::new(origin, dir);
        let min_t = params.min_hit_distance / dir.norm();
        let brute: Vec<f64> = mesh
            .triangles()
            .filter_map(|t| ray_triangle_intersect(&ray, &t, min_t))
            .collect();

        prop_assert_eq!(hits.len(), brute.len());
        match hits.first() {
            Some(first) => {
                prop_assert!(hit.is_valid());
                prop_assert_eq!(hit.distance(), first.distance());
                let min = brute.iter().copied().fold(f64::INFINITY, f64::min);
                prop_assert_eq!(hit.distance(), min);
            }
            None => prop_assert!(!hit.is_valid()),
        }
    }

    /// All hits come back in non-decreasing distance order.
    #[test]
    fn all_hits_sorted(mesh in arb_mesh(40), origin in arb_point(15.0), dir in arb_direction()) {
        let accel = AcceleratedMesh::new(&mesh).unwrap();
        let hits = accel.query_ray_hits(&origin, &dir);
        for pair in hits.windows(2) {
            prop_assert!(pair[0].distance() <= pair[1].distance());
        }
        for h in &hits {
            prop_assert!(h.distance() > 0.0);
            prop_assert!(h.face() < accel.face_count());
        }
    }
}

// =============================================================================
// Property Tests: Distance
// =============================================================================

proptest! {
    /// The reported value is exact, non-negative and realized on the reported face.
    #[test]
    fn squared_distance_matches_scan(
        mesh in arb_mesh(40),
        params in arb_params(),
        p in arb_point(20.0),
    ) {
        let accel = AcceleratedMesh::with_params(&mesh, params).unwrap();
        let result = accel.squared_distance(&p).unwrap();

        prop_assert!(result.value() >= 0.0);

        let on_face = result.point_on_mesh();
        prop_assert_eq!((on_face - p).norm_squared(), result.value());

        let face_tri = accel.triangle(result.face()).unwrap();
        let reprojected = closest_point_on_triangle(&p, &face_tri);
        prop_assert_eq!(reprojected, on_face);

        let brute = mesh
            .triangles()
            .map(|t| (closest_point_on_triangle(&p, &t) - p).norm_squared())
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!(result.value(), brute);
    }

    /// Ground level is the lowest vertex until an offset is applied.
    #[test]
    fn ground_level_tracks_lowest_vertex(mesh in arb_mesh(20), offset in -5.0..5.0f64) {
        let accel = AcceleratedMesh::new(&mesh).unwrap();
        let lowest = mesh.vertices.iter().map(|v| v.z).fold(f64::INFINITY, f64::min);
        prop_assert_eq!(accel.ground_level(), lowest);

        accel.set_ground_level_offset(offset);
        prop_assert_eq!(accel.ground_level(), lowest + offset);
    }
}
