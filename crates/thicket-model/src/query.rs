//! Neighbour queries over the model, independent of the space backend.
//!
//! Queries keyed by an agent never yield that agent. Queries keyed by a
//! position yield everything in range.
//!
//! Iterators returned here are lazy and borrow the model. For a stable
//! list, `collect()` first; for a scan that tolerates mutation between
//! steps, use [`NeighborCursor`].

use rand::seq::IteratorRandom;
use std::collections::HashSet;
use thicket_core::{Agent, AgentId, Coord};
use thicket_space::{DiscreteSpace, NearbyCursor, Space};

use crate::error::ModelError;
use crate::model::Model;

// ── NeighborCursor ──────────────────────────────────────────────

/// A detached neighbour scan that reads the model's live state on every
/// step and may skip its own agent.
///
/// Removing an agent the cursor has already yielded shifts the later
/// occupants of the same cell down one slot, so one of them is skipped:
/// the scan reflects the population as it is now, not as it was when the
/// cursor was created.
///
/// ```
/// # use thicket_model::{Model, ModelConfig};
/// # use thicket_space::{GridExtent, GridSpace, Metric};
/// # use thicket_core::{Agent, AgentId, Coord};
/// # #[derive(Clone)] struct Cell { id: AgentId, pos: Coord }
/// # impl Agent for Cell {
/// #     type Pos = Coord;
/// #     fn id(&self) -> AgentId { self.id }
/// #     fn pos(&self) -> &Coord { &self.pos }
/// #     fn set_pos(&mut self, pos: Coord) { self.pos = pos }
/// # }
/// let extent = GridExtent::new(&[3, 3], &[false]).unwrap();
/// let mut model = Model::new(GridSpace::new(extent, Metric::Chebyshev), &ModelConfig::default());
/// for id in 1..=3 {
///     model.add_agent_pos(Cell { id: AgentId(id), pos: [2, 2].into_iter().collect() }).unwrap();
/// }
///
/// let mut cursor = model.nearby_cursor_at(&[2, 2].into_iter().collect(), 0.0);
/// let mut removed = 0;
/// while let Some(id) = cursor.advance(&model) {
///     model.remove_agent(id).unwrap();
///     removed += 1;
/// }
/// assert!(removed < 3);
/// ```
#[derive(Clone, Debug)]
pub struct NeighborCursor<P> {
    inner: NearbyCursor<P>,
    exclude: Option<AgentId>,
}

impl<P> NeighborCursor<P> {
    /// Yield the next neighbour, reading the model as it is now.
    pub fn advance<A, S>(&mut self, model: &Model<A, S>) -> Option<AgentId>
    where
        S: Space<Position = P>,
    {
        loop {
            let id = self.inner.advance(model.space())?;
            if Some(id) != self.exclude {
                return Some(id);
            }
        }
    }
}

// ── Queries on any space ────────────────────────────────────────

impl<A, S> Model<A, S>
where
    S: Space,
    A: Agent<Pos = S::Position>,
{
    /// IDs within `r` of agent `id`, excluding `id` itself.
    pub fn nearby_ids(
        &self,
        id: AgentId,
        r: f64,
    ) -> Result<Box<dyn Iterator<Item = AgentId> + '_>, ModelError> {
        let pos = self.position_or_err(id)?;
        Ok(Box::new(
            self.space()
                .nearby_ids(pos, r)
                .filter(move |&other| other != id),
        ))
    }

    /// IDs within `r` of `pos`, including any agent standing on it.
    pub fn nearby_ids_at(
        &self,
        pos: &S::Position,
        r: f64,
    ) -> Box<dyn Iterator<Item = AgentId> + '_> {
        self.space().nearby_ids(pos, r)
    }

    /// Agents within `r` of agent `id`, excluding `id` itself.
    pub fn nearby_agents(
        &self,
        id: AgentId,
        r: f64,
    ) -> Result<impl Iterator<Item = &A> + '_, ModelError> {
        Ok(self.nearby_ids(id, r)?.map(move |other| self.indexed(other)))
    }

    /// A detached cursor over the neighbours of agent `id`, excluding it.
    pub fn nearby_cursor(
        &self,
        id: AgentId,
        r: f64,
    ) -> Result<NeighborCursor<S::Position>, ModelError> {
        let pos = self.position_or_err(id)?;
        Ok(NeighborCursor {
            inner: self.space().cursor(pos, r),
            exclude: Some(id),
        })
    }

    /// A detached cursor over everything within `r` of `pos`.
    pub fn nearby_cursor_at(&self, pos: &S::Position, r: f64) -> NeighborCursor<S::Position> {
        NeighborCursor {
            inner: self.space().cursor(pos, r),
            exclude: None,
        }
    }

    /// A uniformly random neighbour of `id` within `r`, or `None` if it
    /// has none.
    pub fn random_nearby_id(&mut self, id: AgentId, r: f64) -> Result<Option<AgentId>, ModelError> {
        let (space, rng) = self.space_and_rng();
        let pos = space
            .position_of(id)
            .ok_or(ModelError::UnknownAgent { id })?;
        Ok(space
            .nearby_ids(pos, r)
            .filter(|&other| other != id)
            .choose(rng))
    }

    /// A uniformly random neighbouring agent of `id` within `r`.
    pub fn random_nearby_agent(&mut self, id: AgentId, r: f64) -> Result<Option<&A>, ModelError> {
        let picked = self.random_nearby_id(id, r)?;
        Ok(picked.map(|other| self.indexed(other)))
    }

    /// The closest other agent to `id`, optionally within `max_radius`.
    ///
    /// Ties keep the first candidate the search meets.
    pub fn nearest_neighbor(
        &self,
        id: AgentId,
        max_radius: Option<f64>,
    ) -> Result<Option<AgentId>, ModelError> {
        let pos = self.position_or_err(id)?;
        Ok(self.space().nearest_neighbor(pos, Some(id), max_radius))
    }

    /// The closest agent to `pos`, optionally within `max_radius`.
    pub fn nearest_neighbor_at(&self, pos: &S::Position, max_radius: Option<f64>) -> Option<AgentId> {
        self.space().nearest_neighbor(pos, None, max_radius)
    }

    /// Pair every agent with its nearest still-unpaired neighbour within
    /// `r`.
    ///
    /// Agents are visited in model order. Each agent appears in at most
    /// one pair, and each pair is listed once with the visiting agent
    /// first.
    pub fn interacting_pairs(&self, r: f64) -> Vec<(AgentId, AgentId)> {
        let mut paired: HashSet<AgentId> = HashSet::new();
        let mut pairs = Vec::new();
        for id in self.ids() {
            if paired.contains(&id) {
                continue;
            }
            let Some(pos) = self.position(id) else {
                continue;
            };
            let mut best: Option<(f64, AgentId)> = None;
            for other in self.space().nearby_ids(pos, r) {
                if other == id || paired.contains(&other) {
                    continue;
                }
                let Some(other_pos) = self.position(other) else {
                    continue;
                };
                let d = self.distance(pos, other_pos);
                if d <= r && best.is_none_or(|(b, _)| d < b) {
                    best = Some((d, other));
                }
            }
            if let Some((_, other)) = best {
                paired.insert(id);
                paired.insert(other);
                pairs.push((id, other));
            }
        }
        tracing::trace!(radius = r, pairs = pairs.len(), "interacting pairs");
        pairs
    }

    /// IDs located exactly at `pos`.
    pub fn ids_in_position(&self, pos: &S::Position) -> Box<dyn Iterator<Item = AgentId> + '_> {
        self.space().ids_in_position(pos)
    }

    /// Agents located exactly at `pos`.
    pub fn agents_in_position(&self, pos: &S::Position) -> impl Iterator<Item = &A> + '_ {
        self.space()
            .ids_in_position(pos)
            .map(move |id| self.indexed(id))
    }

    fn indexed(&self, id: AgentId) -> &A {
        self.agent(id)
            .unwrap_or_else(|| panic!("agent {id} is in the space but not in the model"))
    }
}

// ── Queries on grids ────────────────────────────────────────────

impl<A, S> Model<A, S>
where
    S: DiscreteSpace,
    A: Agent<Pos = Coord>,
{
    /// Cells within `r` of agent `id`, excluding its own cell.
    pub fn nearby_positions(
        &self,
        id: AgentId,
        r: f64,
    ) -> Result<Box<dyn Iterator<Item = Coord> + '_>, ModelError> {
        let pos = self.position_or_err(id)?;
        Ok(self.space().nearby_positions(pos, r))
    }

    /// Cells within `r` of `pos`, excluding `pos` itself.
    pub fn nearby_positions_at(&self, pos: &Coord, r: f64) -> Box<dyn Iterator<Item = Coord> + '_> {
        self.space().nearby_positions(pos, r)
    }

    /// Whether no agent stands on `pos`.
    pub fn is_empty_at(&self, pos: &Coord) -> bool {
        self.space().is_empty_at(pos)
    }

    /// All unoccupied cells, in row-major order.
    pub fn empty_positions(&self) -> Box<dyn Iterator<Item = Coord> + '_> {
        self.space().empty_positions()
    }

    /// A uniformly random unoccupied cell, or `None` when the grid is full.
    pub fn random_empty(&mut self) -> Option<Coord> {
        let (space, rng) = self.space_and_rng();
        space.random_empty(rng)
    }
}
