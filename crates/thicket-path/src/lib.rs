//! A* pathfinding for Thicket grid models.
//!
//! A [`Pathfinder`] is bound to one [`GridExtent`](thicket_space::GridExtent)
//! and carries the movement rules: diagonal moves, heuristic inflation,
//! step pricing ([`CostMetric`]), a [`WalkMask`] and a [`PenaltyMap`].
//! Searches produce a [`SearchOutcome`]; an unreachable goal is a normal
//! outcome with an empty [`Route`], never an error.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod astar;
pub mod cost;
pub mod error;
pub mod mask;
pub mod route;

pub use astar::{BestRoute, PathConfig, PathRequest, Pathfinder, PathfinderBuilder, SearchOutcome};
pub use cost::CostMetric;
pub use error::PathError;
pub use mask::{PenaltyMap, WalkMask};
pub use route::Route;
