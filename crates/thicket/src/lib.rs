//! Thicket: spatial indexing, neighbour queries and A* pathfinding for
//! agent-based models.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Thicket sub-crates. For most users, adding `thicket` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use thicket::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Walker {
//!     id: AgentId,
//!     pos: Coord,
//! }
//!
//! impl Agent for Walker {
//!     type Pos = Coord;
//!     fn id(&self) -> AgentId { self.id }
//!     fn pos(&self) -> &Coord { &self.pos }
//!     fn set_pos(&mut self, pos: Coord) { self.pos = pos }
//! }
//!
//! // A bounded 10×10 grid with Chebyshev neighbourhoods.
//! let config = GridConfig { dims: vec![10, 10], periodic: vec![false], ..Default::default() };
//! let mut model = Model::new(config.build_multi().unwrap(), &ModelConfig { seed: 42 });
//! model.add_agent_pos(Walker { id: AgentId(1), pos: [1, 1].into_iter().collect() }).unwrap();
//! model.add_agent_pos(Walker { id: AgentId(2), pos: [2, 2].into_iter().collect() }).unwrap();
//!
//! let near: Vec<_> = model.nearby_ids(AgentId(1), 1.0).unwrap().collect();
//! assert_eq!(near, vec![AgentId(2)]);
//!
//! // Walk agent 1 to the far corner along an A* route.
//! let mut planner = RoutePlanner::new(config.pathfinder(PathConfig::default()).unwrap());
//! planner.plan_route(&model, AgentId(1), &[10, 10].into_iter().collect()).unwrap();
//! while let RouteStep::Advanced(_) = planner.move_along_route(&mut model, AgentId(1)).unwrap() {}
//! assert!(planner.is_stationary(AgentId(1)));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `thicket-core` | Agent IDs, positions, the `Agent` traits |
//! | [`space`] | `thicket-space` | Extents, metrics, grid and continuous indices |
//! | [`path`] | `thicket-path` | A* pathfinder, masks, routes |
//! | [`model`] | `thicket-model` | Agent container, queries, route bookkeeping |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Agent IDs, position types and agent traits (`thicket-core`).
pub use thicket_core as types;

/// Spatial indices (`thicket-space`).
///
/// Provides the [`space::Space`] and [`space::DiscreteSpace`] traits and
/// the backends [`space::GridSpace`], [`space::GridSpaceSingle`] and
/// [`space::ContinuousSpace`].
pub use thicket_space as space;

/// A* pathfinding over grids (`thicket-path`).
///
/// [`path::Pathfinder`] searches; [`path::Route`] holds the result.
pub use thicket_path as path;

/// Agent container and neighbour query facade (`thicket-model`).
///
/// [`model::Model`] binds agents to a space; [`model::RoutePlanner`]
/// keeps per-agent routes.
pub use thicket_model as model;

/// Common imports for typical Thicket usage.
///
/// ```rust
/// use thicket::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use thicket_core::{Agent, AgentId, Coord, Kinematic, Point};

    // Space
    pub use thicket_space::{
        ContinuousExtent, ContinuousSpace, DiscreteSpace, GridExtent, GridSpace, GridSpaceSingle,
        Metric, Space, SpaceError, SpaceKind,
    };

    // Pathfinding
    pub use thicket_path::{
        BestRoute, CostMetric, PathConfig, PathError, Pathfinder, PenaltyMap, Route, WalkMask,
    };

    // Model
    pub use thicket_model::{
        ContinuousConfig, GridConfig, Model, ModelConfig, ModelError, NeighborCursor,
        RoutePlanner, RouteStep,
    };
}
