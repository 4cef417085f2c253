//! Agent container, neighbour queries and route bookkeeping for Thicket.
//!
//! [`Model`] binds a population of agents to one spatial index and keeps
//! the two consistent: every add, move and removal goes through the index
//! first, and the agent's cached position is written only once the index
//! has accepted the change.
//!
//! The query methods (`nearby_ids`, `nearest_neighbor`, ...) work the same
//! over every backend and never yield the querying agent itself.
//! [`RoutePlanner`] keeps one A* route per agent and moves agents along
//! them a waypoint at a time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod model;
pub mod movement;
pub mod query;
pub mod routing;

pub use config::{ConfigError, ContinuousConfig, GridConfig, ModelConfig};
pub use error::ModelError;
pub use model::Model;
pub use query::NeighborCursor;
pub use routing::{RoutePlanner, RouteStep};
