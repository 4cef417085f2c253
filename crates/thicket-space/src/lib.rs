//! Spatial indices for Thicket agent-based models.
//!
//! This crate defines the [`Space`] trait, the occupancy-index contract
//! shared by every backend, along with the discrete and continuous
//! implementations and their neighbour queries.
//!
//! # Backends
//!
//! - [`GridSpace`]: D-dimensional lattice, any number of agents per cell
//! - [`GridSpaceSingle`]: D-dimensional lattice, at most one agent per cell
//! - [`ContinuousSpace`]: real-valued box with a bucket index
//!
//! Each backend classifies itself into the closed [`SpaceKind`] enum.
//! Axes are independently bounded or periodic; distances honour the
//! configured [`Metric`] and wrap-around.
//!
//! # Iteration
//!
//! Radius queries come in two forms: [`Space::nearby_ids`] borrows the
//! index and is lazy, while [`Space::cursor`] returns a detached
//! [`NearbyCursor`] that reads live state and tolerates mutation between
//! steps.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod continuous;
pub mod cursor;
pub mod error;
pub mod extent;
pub(crate) mod grid;
pub mod grid_multi;
pub mod grid_single;
pub mod metric;
pub mod space;

#[cfg(test)]
pub(crate) mod compliance;

pub use continuous::ContinuousSpace;
pub use cursor::NearbyCursor;
pub use error::SpaceError;
pub use extent::{ContinuousExtent, GridExtent};
pub use grid_multi::GridSpace;
pub use grid_single::GridSpaceSingle;
pub use metric::Metric;
pub use space::{DiscreteSpace, Space, SpaceKind};
