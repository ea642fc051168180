//! API Regression Tests for the SLA support crates
//!
//! These tests pin the public API and the documented behaviour of the
//! support geometry core. They are organized in 5 tiers:
//!
//! - Tier 1: Foundation (mesh-types)
//! - Tier 2: Container (mesh-contour)
//! - Tier 3: Queries (mesh-query)
//! - Tier 4: Normals and records (support-points)
//! - Tier 5: Clustering (support-cluster) and a small end-to-end pipeline
//!
//! If any of these tests fail after API changes, it indicates a breaking change
//! that needs a version bump.

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::cast_lossless)]

use approx::assert_relative_eq;
use sla_support::{cluster, contour, points, prelude::*, query, types};

fn unit_triangle() -> TriangleMesh {
    TriangleMesh::from_raw(
        &[
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ],
        &[0, 1, 2],
    )
}

fn points_on_x(xs: &[f64]) -> PointSet {
    let pts: Vec<_> = xs.iter().map(|&x| Point3::new(x, 0.0, 0.0)).collect();
    point_set_from_points(&pts)
}

// =============================================================================
// TIER 1: Foundation - Input Mesh and Point Sets
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn triangle_mesh_construction() {
        let mesh = TriangleMesh::new();
        assert!(mesh.is_empty());

        let mesh = unit_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.face(0), Some([0, 1, 2]));
    }

    #[test]
    fn ragged_raw_input_is_empty() {
        let mesh = TriangleMesh::from_raw(&[0.0, 1.0], &[0, 1, 2]);
        assert!(mesh.is_empty());
    }

    #[test]
    fn unit_cube_bounds() {
        let cube = unit_cube();
        assert_eq!(cube.face_count(), 12);
        let bounds = cube.bounds();
        assert_relative_eq!(bounds.min, Point3::origin());
        assert_relative_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn triangle_normal_follows_winding() {
        let tri = unit_triangle().triangle(0).unwrap();
        assert_relative_eq!(tri.normal().unwrap(), Vector3::z());
        assert_relative_eq!(tri.area(), 0.5);
    }

    #[test]
    fn point_set_rows() {
        let set = points_on_x(&[0.0, 1.0, 2.0]);
        assert_eq!(set.nrows(), 3);
        assert_eq!(point_at(&set, 2), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(types::points_of(&set).len(), 3);
    }
}

// =============================================================================
// TIER 2: Container - Merge and Text Dump
// =============================================================================

mod tier2_container {
    use super::*;

    #[test]
    fn merge_offsets_indices() {
        let piece = Contour::from(&unit_triangle());
        let mut merged = Contour::new();
        merged.merge(&piece).merge(&piece);

        assert_eq!(merged.point_count(), 6);
        assert_eq!(merged.faces3, vec![[0, 1, 2], [3, 4, 5]]);
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let piece = Contour::from(&unit_cube());
        let mut merged = piece.clone();
        merged.merge(&Contour::new());
        assert_eq!(merged, piece);
    }

    #[test]
    fn quads_split_into_two_triangles() {
        let mut quad = Contour::new();
        quad.points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        quad.faces4.push([0, 1, 2, 3]);

        assert_eq!(quad.triangle_count(), 2);
        let mesh = TriangleMesh::from(&quad);
        assert_eq!(mesh.face_count(), 2);
        assert_relative_eq!(mesh.surface_area(), 1.0);
    }

    #[test]
    fn obj_dump_round_trip() {
        let cube = Contour::from(&unit_cube());
        let mut text = Vec::new();
        cube.to_obj(&mut text).unwrap();

        let dump = String::from_utf8(text.clone()).unwrap();
        assert_eq!(dump.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert_eq!(dump.lines().filter(|l| l.starts_with("f ")).count(), 12);

        let back = Contour::from_obj(text.as_slice()).unwrap();
        assert_eq!(back.point_count(), 8);
        assert_eq!(back.faces3, cube.faces3);
    }

    #[test]
    fn obj_bad_index_is_an_error() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        let err = Contour::from_obj(text.as_bytes()).unwrap_err();
        assert!(matches!(err, contour::ContourError::IndexOutOfRange { .. }));
    }
}

// =============================================================================
// TIER 3: Queries - Ray Hits, Distance, Ground Level
// =============================================================================

mod tier3_queries {
    use super::*;

    #[test]
    fn unit_triangle_ray_scenario() {
        let mesh = AcceleratedMesh::new(&unit_triangle()).unwrap();
        let hit = mesh.query_ray_hit(&Point3::new(0.25, 0.25, 1.0), &Vector3::new(0.0, 0.0, -1.0));

        assert!(hit.is_valid());
        assert_relative_eq!(hit.distance(), 1.0);
        assert_eq!(hit.face(), Some(0));
        assert_relative_eq!(hit.normal().unwrap(), Vector3::z());
        assert!(!hit.is_inside());
        assert_relative_eq!(hit.position().unwrap(), Point3::new(0.25, 0.25, 0.0));
    }

    #[test]
    fn miss_is_not_valid() {
        let mesh = AcceleratedMesh::new(&unit_triangle()).unwrap();
        let miss = mesh.query_ray_hit(&Point3::new(5.0, 5.0, 1.0), &Vector3::new(0.0, 0.0, -1.0));
        assert!(!miss.is_valid());
        assert!(miss.face().is_none());
        assert!(matches!(miss, HitResult::Miss { .. }));
    }

    #[test]
    fn all_hits_through_cube() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
        let origin = Point3::new(0.25, 0.5, 3.0);
        let direction = Vector3::new(0.0, 0.0, -1.0);

        let hits = mesh.query_ray_hits(&origin, &direction);
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].distance(), 2.0);
        assert_relative_eq!(hits[1].distance(), 3.0);
        assert!(!hits[0].is_inside());
        assert!(hits[1].is_inside());

        let nearest = mesh.query_ray_hit(&origin, &direction);
        assert_relative_eq!(nearest.distance(), hits[0].distance());
    }

    #[test]
    fn squared_distance_scenarios() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
        let d = mesh.squared_distance(&Point3::new(0.25, 0.5, 3.0)).unwrap();
        assert_relative_eq!(d.value(), 4.0);
        assert_relative_eq!(d.point_on_mesh(), Point3::new(0.25, 0.5, 1.0));

        let empty = AcceleratedMesh::new(&TriangleMesh::new()).unwrap();
        assert!(matches!(
            empty.squared_distance(&Point3::origin()),
            Err(query::QueryError::EmptyMesh { .. })
        ));
    }

    #[test]
    fn inside_outside() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
        assert!(mesh.is_inside(&Point3::new(0.5, 0.5, 0.5)).unwrap());
        assert!(!mesh.is_inside(&Point3::new(2.0, 0.5, 0.5)).unwrap());
        assert!(mesh.signed_distance(&Point3::new(0.5, 0.5, 0.5)).unwrap() < 0.0);
    }

    #[test]
    fn ground_level_tracks_offset() {
        let mut cube = unit_cube();
        cube.translate(Vector3::new(0.0, 0.0, 2.5));
        let mesh = AcceleratedMesh::new(&cube).unwrap();

        assert_relative_eq!(mesh.ground_level(), 2.5);
        mesh.set_ground_level_offset(1.0);
        assert_relative_eq!(mesh.ground_level(), 3.5);
        assert_relative_eq!(mesh.base_ground_level(), 2.5);
        mesh.set_ground_level(0.0);
        assert_relative_eq!(mesh.ground_level(), 1.0);
    }

    #[test]
    fn invalid_face_is_rejected() {
        let bad = TriangleMesh::from_parts(vec![Point3::origin(); 3], vec![[0, 1, 5]]);
        assert!(matches!(
            AcceleratedMesh::new(&bad),
            Err(query::QueryError::FaceIndexOutOfRange { face: 0, index: 5, .. })
        ));
    }

    #[test]
    fn container_conversions() {
        let mesh = AcceleratedMesh::from_contour(&Contour::from(&unit_cube())).unwrap();
        assert_eq!(mesh.face_count(), 12);
        let back = Contour::from(&mesh);
        assert_eq!(back.point_count(), 8);
    }
}

// =============================================================================
// TIER 4: Normals and Support Records
// =============================================================================

mod tier4_normals {
    use super::*;

    #[test]
    fn cube_normals() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
        let pts = point_set_from_points(&[
            Point3::new(0.25, 0.5, 1.5),
            Point3::new(0.5, 1.5, 0.25),
        ]);
        let n = normals(&pts, &mesh, 0.05, &NeverCancel, None).unwrap();
        assert_relative_eq!(point_at(&n, 0).coords, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(point_at(&n, 1).coords, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn averaged_corner_normal() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
        let pts = point_set_from_points(&[Point3::new(-1.0, -1.0, -1.0)]);
        let estimate = estimate_normals(
            &pts,
            &mesh,
            &NormalParams::averaging(),
            &NeverCancel,
            None,
        )
        .unwrap();
        let expected = -Vector3::new(1.0, 1.0, 1.0).normalize();
        assert_relative_eq!(point_at(&estimate.normals, 0).coords, expected, epsilon = 1e-9);
        assert_eq!(estimate.edge_rows, vec![0]);
    }

    #[test]
    fn cancellation_discards_output() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
        let pts = point_set_from_points(&[Point3::new(0.25, 0.5, 1.5); 8]);
        let token = CancelToken::new();
        token.cancel();
        assert!(matches!(
            normals(&pts, &mesh, 0.05, &token, None),
            Err(points::SupportError::Cancelled { .. })
        ));
    }

    #[test]
    fn closure_cancellation() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();
        let pts = point_set_from_points(&[Point3::new(0.25, 0.5, 1.5)]);
        let stop = || false;
        assert!(normals(&pts, &mesh, 0.05, &stop, None).is_ok());
    }

    #[test]
    fn support_point_records() {
        let p = SupportPoint::from_row([1.0, 2.0, 3.0, 0.4, 0.0]);
        assert_eq!(p, SupportPoint::new(Point3::new(1.0, 2.0, 3.0), 0.400_01, false));
        assert_eq!(points::PointsStatus::default(), points::PointsStatus::NoPoints);

        let hole = points::DrainHole::default();
        assert_relative_eq!(hole.radius, 5.0);
        assert_relative_eq!(hole.height, 10.0);
    }
}

// =============================================================================
// TIER 5: Clustering and Pipeline
// =============================================================================

mod tier5_clustering {
    use super::*;

    #[test]
    fn five_points_cap_ten() {
        let pts = points_on_x(&[0.0, 1.0, 2.0, 10.0, 11.0]);
        let clusters = cluster_point_set(&pts, 1.5, 10);
        assert_eq!(clusters, vec![vec![0, 1, 2], vec![3, 4]]);
    }

    #[test]
    fn five_points_cap_two() {
        let pts = points_on_x(&[0.0, 1.0, 2.0, 10.0, 11.0]);
        let clusters = cluster_point_set(&pts, 1.5, 2);

        assert!(clusters.len() >= 3);
        assert!(clusters.iter().all(|c| c.len() <= 2));
        let mut all: Vec<u32> = clusters.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
        assert_eq!(clusters, vec![vec![0, 1], vec![2], vec![3, 4]]);
    }

    #[test]
    fn caller_indices() {
        let positions = [Point3::new(0.0, 0.0, 0.0), Point3::new(0.5, 0.0, 0.0)];
        let clusters = cluster_by_distance(&[7, 3], |i| positions[(i % 2) as usize], 1.0, 0);
        assert_eq!(clusters, vec![vec![7, 3]]);
    }

    #[test]
    fn predicate_clustering() {
        let pts = points_on_x(&[0.0, 0.1, 5.0, 5.1]);
        let same_side = |a: &cluster::IndexedPoint, b: &cluster::IndexedPoint| {
            (a.position.x < 1.0) == (b.position.x < 1.0)
        };
        let at = |i: u32| point_at(&pts, i as usize);
        let clusters = cluster::cluster_by_predicate(&[0, 1, 2, 3], at, same_side, 0);
        assert_eq!(clusters, vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn drop_normals_cluster_pipeline() {
        let mesh = AcceleratedMesh::new(&unit_cube()).unwrap();

        // Drop candidates from above onto the top face.
        let mut candidates = Vec::new();
        for (x, y) in [(0.1, 0.3), (0.15, 0.35), (0.8, 0.6), (0.85, 0.65)] {
            let hit = mesh.query_ray_hit(&Point3::new(x, y, 5.0), &Vector3::new(0.0, 0.0, -1.0));
            candidates.push(hit.position().unwrap());
        }
        let candidates = point_set_from_points(&candidates);

        let n = normals(&candidates, &mesh, 0.01, &NeverCancel, None).unwrap();
        for row in 0..n.nrows() {
            assert_relative_eq!(point_at(&n, row).coords, Vector3::z(), epsilon = 1e-12);
        }

        let clusters = cluster_point_set(&candidates, 0.2, 0);
        assert_eq!(clusters, vec![vec![0, 1], vec![2, 3]]);
    }
}
