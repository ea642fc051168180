//! Grouping of support point candidates into clusters.
//!
//! Candidate anchor points that lie close together are served by one
//! pillar. This crate partitions a point set into clusters: connected
//! components of a "close enough" relation, with an optional cap on the
//! number of points per cluster so no pillar has to carry too many heads.
//!
//! Three entry points share one breadth-first growth procedure:
//!
//! - [`cluster_by_distance`] - points behind caller indices, Euclidean threshold
//! - [`cluster_point_set`] - rows of an N×3 [`PointSet`](mesh_types::PointSet)
//! - [`cluster_by_predicate`] - caller-defined adjacency
//!
//! Results are deterministic: clusters appear in the order of their first
//! member in the input, members are listed in input order, and every input
//! index appears in exactly one cluster.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod cluster;
mod grid;

pub use cluster::{
    Cluster, ClusteredPoints, IndexedPoint, cluster_by_distance, cluster_by_predicate,
    cluster_point_set,
};
