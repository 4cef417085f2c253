//! Test utilities and fixture types for Thicket development.
//!
//! Provides ready-made agent types ([`GridAgent`], [`Particle`] and the
//! closed-sum [`Animal`]) and one-line builders for every space backend.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{Animal, GridAgent, Particle};

use thicket_core::{Coord, Point};
use thicket_space::{
    ContinuousExtent, ContinuousSpace, GridExtent, GridSpace, GridSpaceSingle, Metric,
};

/// Build a coordinate from a slice.
pub fn coord(v: &[i32]) -> Coord {
    v.iter().copied().collect()
}

/// Build a point from a slice.
pub fn point(v: &[f64]) -> Point {
    v.iter().copied().collect()
}

/// Multi-occupancy grid with the same periodicity on every axis.
pub fn grid(dims: &[u32], periodic: bool, metric: Metric) -> GridSpace {
    let extent = GridExtent::new(dims, &[periodic]).expect("fixture grid dims are valid");
    GridSpace::new(extent, metric)
}

/// Single-occupancy grid with the same periodicity on every axis.
pub fn single_grid(dims: &[u32], periodic: bool, metric: Metric) -> GridSpaceSingle {
    let extent = GridExtent::new(dims, &[periodic]).expect("fixture grid dims are valid");
    GridSpaceSingle::new(extent, metric)
}

/// Euclidean continuous space with the same periodicity on every axis.
pub fn plane(lengths: &[f64], periodic: bool, bucket_size: f64) -> ContinuousSpace {
    let extent =
        ContinuousExtent::new(lengths, &[periodic]).expect("fixture extent lengths are valid");
    ContinuousSpace::new(extent, bucket_size, Metric::Euclidean)
        .expect("fixture bucket size is valid")
}
