//! Traits the agent-definition layer implements so the spatial core can
//! stay agnostic of concrete agent types.

use crate::id::{AgentId, Point};

/// An entity with a stable ID and a position.
///
/// The position returned by [`pos`](Agent::pos) is a cached copy of the
/// authoritative entry held by the model's spatial index. Only the model
/// calls [`set_pos`](Agent::set_pos); writing it from user code bypasses
/// the index and leaves the two out of sync.
///
/// Heterogeneous populations are expressed as a closed enum over the
/// agent variants that implements this trait by delegating to each arm.
pub trait Agent {
    /// Position type: `Coord` for grids, `Point` for continuous space.
    type Pos: Clone;

    /// Stable identifier.
    fn id(&self) -> AgentId;

    /// Current (cached) position.
    fn pos(&self) -> &Self::Pos;

    /// Overwrite the cached position. Called by the model after the index
    /// has accepted a move.
    fn set_pos(&mut self, pos: Self::Pos);
}

/// An agent in continuous space that carries a velocity.
///
/// Used by `Model::move_by_velocity`, which displaces the agent by
/// `vel * dt`.
pub trait Kinematic: Agent<Pos = Point> {
    /// Velocity, one component per spatial axis.
    fn vel(&self) -> &Point;
}
