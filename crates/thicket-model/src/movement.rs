//! Movement helpers built on top of [`Model::move_agent`].

use rand::seq::IndexedRandom;
use thicket_core::{Agent, AgentId, Coord, Kinematic, Point};
use thicket_space::{DiscreteSpace, GridSpaceSingle, Space};

use crate::error::ModelError;
use crate::model::Model;

// ── Grids ───────────────────────────────────────────────────────

impl<A, S> Model<A, S>
where
    S: DiscreteSpace,
    A: Agent<Pos = Coord>,
{
    /// Walk `id` by `delta` unless the destination cell cannot take it.
    ///
    /// Returns `Ok(None)` and leaves the agent in place when the target
    /// cell is occupied on a single-occupancy grid.
    pub fn walk_if_empty(&mut self, id: AgentId, delta: &Coord) -> Result<Option<Coord>, ModelError> {
        let from = self.position_or_err(id)?;
        let to = self.space().displace(from, delta);
        if !self.space().can_enter(id, &to) {
            return Ok(None);
        }
        self.move_agent(id, &to).map(Some)
    }

    /// Move `id` to a uniformly chosen cell within `r` of its own.
    ///
    /// With `ifempty` set only cells the agent can enter are candidates.
    /// Returns `Ok(None)` when there is no candidate.
    pub fn randomwalk(
        &mut self,
        id: AgentId,
        r: f64,
        ifempty: bool,
    ) -> Result<Option<Coord>, ModelError> {
        let from = self.position_or_err(id)?;
        let candidates: Vec<Coord> = self
            .space()
            .nearby_positions(from, r)
            .filter(|c| !ifempty || self.space().can_enter(id, c))
            .collect();
        let Some(to) = candidates.choose(self.rng()).cloned() else {
            return Ok(None);
        };
        self.move_agent(id, &to).map(Some)
    }

    /// Add `agent` on a uniformly random empty cell.
    ///
    /// Returns `Ok(None)` when the grid has no empty cell; the agent is
    /// dropped in that case.
    pub fn add_agent_single(&mut self, mut agent: A) -> Result<Option<AgentId>, ModelError> {
        let Some(pos) = self.random_empty() else {
            tracing::trace!(id = %agent.id(), "no empty cell to add agent");
            return Ok(None);
        };
        agent.set_pos(pos);
        self.add_agent_pos(agent).map(Some)
    }

    /// Move `id` to a uniformly random empty cell.
    ///
    /// Returns `Ok(None)` and leaves the agent in place when the grid has
    /// no empty cell.
    pub fn move_agent_single(&mut self, id: AgentId) -> Result<Option<Coord>, ModelError> {
        self.agent_or_err(id)?;
        let Some(to) = self.random_empty() else {
            return Ok(None);
        };
        self.move_agent(id, &to).map(Some)
    }
}

impl<A> Model<A, GridSpaceSingle>
where
    A: Agent<Pos = Coord>,
{
    /// Move `id` to a uniformly chosen empty cell among `candidates`.
    /// Repeated candidates, including ones that wrap onto the same cell,
    /// count once.
    ///
    /// Returns `Ok(None)` and leaves the agent in place when none of them
    /// is empty.
    pub fn move_to_empty<I>(&mut self, id: AgentId, candidates: I) -> Result<Option<Coord>, ModelError>
    where
        I: IntoIterator<Item = Coord>,
    {
        self.agent_or_err(id)?;
        let (space, rng) = self.space_mut_and_rng();
        let Some(to) = space.move_to_empty(id, candidates, rng)? else {
            return Ok(None);
        };
        tracing::trace!(%id, pos = ?to, "moved agent to empty cell");
        if let Some(agent) = self.agents_mut().get_mut(&id) {
            agent.set_pos(to.clone());
        }
        Ok(Some(to))
    }
}

// ── Continuous space ────────────────────────────────────────────

impl<A, S> Model<A, S>
where
    S: Space<Position = Point>,
    A: Kinematic,
{
    /// Displace `id` by its velocity times `dt`. Periodic axes wrap; on a
    /// bounded axis the agent stops at the wall.
    pub fn move_by_velocity(&mut self, id: AgentId, dt: f64) -> Result<Point, ModelError> {
        let delta: Point = self
            .agent_or_err(id)?
            .vel()
            .iter()
            .map(|v| v * dt)
            .collect();
        self.walk(id, &delta)
    }
}
