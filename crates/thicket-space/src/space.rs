//! The core [`Space`] trait, its discrete refinement [`DiscreteSpace`],
//! and the closed [`SpaceKind`] classification.

use crate::cursor::NearbyCursor;
use crate::error::SpaceError;
use crate::extent::GridExtent;
use crate::metric::Metric;
use rand::Rng;
use std::fmt;
use thicket_core::{AgentId, Coord};

/// Closed classification of every space backend.
///
/// An extent counts as periodic when at least one axis wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpaceKind {
    /// Integer lattice with at least one wrapping axis.
    DiscretePeriodic,
    /// Integer lattice with hard walls on every axis.
    DiscreteBounded,
    /// Real-valued box with at least one wrapping axis.
    ContinuousPeriodic,
    /// Real-valued box with hard walls on every axis.
    ContinuousBounded,
}

impl SpaceKind {
    /// Whether positions are integer lattice coordinates.
    pub fn is_discrete(self) -> bool {
        matches!(self, Self::DiscretePeriodic | Self::DiscreteBounded)
    }

    /// Whether at least one axis wraps.
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::DiscretePeriodic | Self::ContinuousPeriodic)
    }
}

/// An occupancy index mapping agent IDs to positions and back.
///
/// The index is the single source of truth for where an agent is. Agent
/// structs carry a cached copy that the model writes after every
/// successful mutation here.
///
/// Positions passed in are normalized first: periodic axes wrap,
/// out-of-range bounded axes are rejected with a `SpaceError` and the
/// index is left unchanged. Mutating methods are the only way occupancy
/// changes.
///
/// # Iteration
///
/// [`nearby_ids`](Self::nearby_ids) is lazy and borrows the index, so the
/// borrow checker rules out mutation while it is alive. For the dynamic
/// "remove while iterating" pattern use [`cursor`](Self::cursor), which
/// reads live state on every step and observes intervening mutation.
pub trait Space {
    /// Position type: `Coord` for grids, `Point` for continuous space.
    type Position: Clone + PartialEq + fmt::Debug;

    /// Which of the four backend variants this instance is.
    fn kind(&self) -> SpaceKind;

    /// Number of spatial dimensions.
    fn ndim(&self) -> usize;

    /// Per-axis size: cell counts for grids, lengths for continuous space.
    fn spacesize(&self) -> Self::Position;

    /// Metric used by [`distance`](Self::distance) and radius queries.
    fn metric(&self) -> Metric;

    /// Number of agents currently indexed.
    fn len(&self) -> usize;

    /// Whether no agent is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Authoritative position of `id`, if indexed.
    fn position_of(&self, id: AgentId) -> Option<&Self::Position>;

    /// Whether `id` is indexed.
    fn contains(&self, id: AgentId) -> bool {
        self.position_of(id).is_some()
    }

    /// All indexed IDs, in a deterministic order.
    fn ids(&self) -> Box<dyn Iterator<Item = AgentId> + '_>;

    /// Wrap periodic axes and validate bounded ones.
    fn normalize(&self, pos: &Self::Position) -> Result<Self::Position, SpaceError>;

    /// Periodicity-aware distance between two normalized positions.
    fn distance(&self, a: &Self::Position, b: &Self::Position) -> f64;

    /// Shortest displacement from `from` to `to`, honouring wrap.
    fn direction(&self, from: &Self::Position, to: &Self::Position) -> Self::Position;

    /// Position reached by displacing `pos` by `delta`: periodic axes
    /// wrap, bounded axes stop at the wall.
    fn displace(&self, pos: &Self::Position, delta: &Self::Position) -> Self::Position;

    /// Add `id` at `pos`. Returns the normalized position stored.
    fn insert(&mut self, id: AgentId, pos: &Self::Position) -> Result<Self::Position, SpaceError>;

    /// Remove `id`, returning its last position, or `None` if absent.
    fn remove(&mut self, id: AgentId) -> Option<Self::Position>;

    /// Move `id` from `from` to `to`. Returns the normalized destination.
    ///
    /// # Panics
    ///
    /// Panics if `from` is not the position the index holds for `id`: the
    /// caller's cached copy has diverged from the index.
    fn relocate(
        &mut self,
        id: AgentId,
        from: &Self::Position,
        to: &Self::Position,
    ) -> Result<Self::Position, SpaceError>;

    /// IDs located exactly at `pos` (the cell, for grids).
    fn ids_in_position(&self, pos: &Self::Position) -> Box<dyn Iterator<Item = AgentId> + '_>;

    /// Lazily enumerate IDs within `radius` of `pos`, including any at
    /// `pos` itself.
    fn nearby_ids(&self, pos: &Self::Position, radius: f64)
        -> Box<dyn Iterator<Item = AgentId> + '_>;

    /// Detached cursor over the same candidates as
    /// [`nearby_ids`](Self::nearby_ids).
    fn cursor(&self, pos: &Self::Position, radius: f64) -> NearbyCursor<Self::Position>;

    /// The `slot`-th occupant of storage cell `cell`, read live.
    ///
    /// Storage cells are grid cells for lattices and buckets for
    /// continuous space. Used by [`NearbyCursor`].
    fn cell_occupant(&self, cell: usize, slot: usize) -> Option<AgentId>;

    /// Closest indexed agent to `pos`, skipping `exclude`, optionally
    /// limited to `max_radius`. Ties keep the first candidate found.
    fn nearest_neighbor(
        &self,
        pos: &Self::Position,
        exclude: Option<AgentId>,
        max_radius: Option<f64>,
    ) -> Option<AgentId>;

    /// Uniformly random valid position.
    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Position;
}

/// A [`Space`] over an integer lattice.
pub trait DiscreteSpace: Space<Position = Coord> {
    /// Lattice extent.
    fn extent(&self) -> &GridExtent;

    /// Flat cell index of a normalized coordinate.
    fn linear_index(&self, pos: &Coord) -> Option<usize> {
        self.extent().linear_index(pos)
    }

    /// IDs in the cell at `pos`; empty for an invalid position.
    fn occupants(&self, pos: &Coord) -> &[AgentId];

    /// Whether the cell at `pos` holds no agent.
    fn is_empty_at(&self, pos: &Coord) -> bool {
        self.occupants(pos).is_empty()
    }

    /// Whether `id` could be placed at `pos` without violating occupancy.
    fn can_enter(&self, id: AgentId, pos: &Coord) -> bool;

    /// Lazily enumerate valid positions within `radius` of `pos` under the
    /// space metric, excluding `pos` itself, each at most once.
    fn nearby_positions(&self, pos: &Coord, radius: f64) -> Box<dyn Iterator<Item = Coord> + '_>;

    /// All unoccupied positions, in flat-index order.
    fn empty_positions(&self) -> Box<dyn Iterator<Item = Coord> + '_> {
        Box::new(
            self.extent()
                .positions()
                .filter(move |c| self.is_empty_at(c)),
        )
    }

    /// A uniformly random unoccupied position, or `None` if the grid is full.
    fn random_empty<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord> {
        let cells = self.extent().cell_count();
        // Rejection sampling is cheap while the grid is sparse.
        if self.len() * 2 < cells {
            for _ in 0..16 {
                let pos = self.random_position(rng);
                if self.is_empty_at(&pos) {
                    return Some(pos);
                }
            }
        }
        let empties: Vec<Coord> = self.empty_positions().collect();
        if empties.is_empty() {
            return None;
        }
        let pick = rng.random_range(0..empties.len());
        empties.into_iter().nth(pick)
    }
}
