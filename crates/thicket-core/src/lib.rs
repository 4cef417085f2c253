//! Core types and traits for the Thicket agent-based modelling framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers and position types shared by every spatial index, the
//! pathfinder, and the model container.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod traits;

pub use id::{AgentId, Coord, Point};
pub use traits::{Agent, Kinematic};
