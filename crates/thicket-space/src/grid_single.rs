//! Single-occupancy grid index: at most one agent per cell.

use crate::cursor::NearbyCursor;
use crate::error::SpaceError;
use crate::extent::GridExtent;
use crate::grid::{self, CellWalk};
use crate::metric::Metric;
use crate::space::{DiscreteSpace, Space, SpaceKind};
use indexmap::{IndexMap, IndexSet};
use rand::Rng;
use thicket_core::{AgentId, Coord};

/// A D-dimensional lattice where each cell holds at most one agent.
///
/// Placing an agent on a cell held by another fails with
/// [`SpaceError::CellOccupied`]; the existing occupant is never
/// overwritten. Within a tick, whichever agent moves first claims a cell.
#[derive(Clone, Debug)]
pub struct GridSpaceSingle {
    extent: GridExtent,
    metric: Metric,
    cells: Vec<Option<AgentId>>,
    positions: IndexMap<AgentId, Coord>,
}

impl GridSpaceSingle {
    /// Create an empty single-occupancy grid over `extent`.
    pub fn new(extent: GridExtent, metric: Metric) -> Self {
        tracing::debug!(
            dims = ?extent.dims(),
            periodic = ?extent.periodicity(),
            ?metric,
            "created single-occupancy grid"
        );
        let cells = vec![None; extent.cell_count()];
        Self {
            extent,
            metric,
            cells,
            positions: IndexMap::new(),
        }
    }

    /// The agent at `pos`, if any.
    pub fn occupant(&self, pos: &Coord) -> Option<AgentId> {
        let (_, index) = self.index_of(pos).ok()?;
        self.cells[index]
    }

    /// Move `id` to a uniformly chosen unoccupied cell among `candidates`.
    ///
    /// Candidates are normalized first; invalid ones are ignored, and a
    /// cell listed more than once (directly or through wrapping) counts
    /// once. Returns the destination, or `Ok(None)` when no candidate is
    /// empty, in which case the agent stays where it is.
    pub fn move_to_empty<I, R>(
        &mut self,
        id: AgentId,
        candidates: I,
        rng: &mut R,
    ) -> Result<Option<Coord>, SpaceError>
    where
        I: IntoIterator<Item = Coord>,
        R: Rng + ?Sized,
    {
        let from = self
            .positions
            .get(&id)
            .cloned()
            .ok_or(SpaceError::UnknownAgent { id })?;
        let empties: IndexSet<Coord> = candidates
            .into_iter()
            .filter_map(|c| self.extent.normalize(&c).ok())
            .filter(|c| self.occupant(c).is_none())
            .collect();
        if empties.is_empty() {
            return Ok(None);
        }
        let to = empties[rng.random_range(0..empties.len())].clone();
        self.relocate(id, &from, &to).map(Some)
    }

    fn index_of(&self, pos: &Coord) -> Result<(Coord, usize), SpaceError> {
        let pos = self.extent.normalize(pos)?;
        let index = self
            .extent
            .linear_index(&pos)
            .expect("normalized coordinates are always in range");
        Ok((pos, index))
    }

    fn claim(&self, id: AgentId, pos: &Coord, index: usize) -> Result<(), SpaceError> {
        match self.cells[index] {
            Some(occupant) if occupant != id => Err(SpaceError::CellOccupied {
                coord: pos.clone(),
                occupant,
            }),
            _ => Ok(()),
        }
    }
}

impl Space for GridSpaceSingle {
    type Position = Coord;

    fn kind(&self) -> SpaceKind {
        if self.extent.any_periodic() {
            SpaceKind::DiscretePeriodic
        } else {
            SpaceKind::DiscreteBounded
        }
    }

    fn ndim(&self) -> usize {
        self.extent.ndim()
    }

    fn spacesize(&self) -> Coord {
        self.extent.dims().iter().map(|&d| d as i32).collect()
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn position_of(&self, id: AgentId) -> Option<&Coord> {
        self.positions.get(&id)
    }

    fn ids(&self) -> Box<dyn Iterator<Item = AgentId> + '_> {
        Box::new(self.positions.keys().copied())
    }

    fn normalize(&self, pos: &Coord) -> Result<Coord, SpaceError> {
        self.extent.normalize(pos)
    }

    fn distance(&self, a: &Coord, b: &Coord) -> f64 {
        self.extent.distance(a, b, self.metric)
    }

    fn direction(&self, from: &Coord, to: &Coord) -> Coord {
        self.extent.direction(from, to)
    }

    fn displace(&self, pos: &Coord, delta: &Coord) -> Coord {
        self.extent.displace(pos, delta)
    }

    fn insert(&mut self, id: AgentId, pos: &Coord) -> Result<Coord, SpaceError> {
        if self.positions.contains_key(&id) {
            return Err(SpaceError::DuplicateAgent { id });
        }
        let (pos, index) = self.index_of(pos)?;
        self.claim(id, &pos, index)?;
        self.cells[index] = Some(id);
        self.positions.insert(id, pos.clone());
        Ok(pos)
    }

    fn remove(&mut self, id: AgentId) -> Option<Coord> {
        let pos = self.positions.swap_remove(&id)?;
        let index = self
            .extent
            .linear_index(&pos)
            .expect("stored grid positions are always normalized");
        let slot = self.cells[index].take();
        assert_eq!(
            slot,
            Some(id),
            "grid index corrupted: {id} missing from its recorded cell"
        );
        Some(pos)
    }

    fn relocate(&mut self, id: AgentId, from: &Coord, to: &Coord) -> Result<Coord, SpaceError> {
        let (to, to_index) = self.index_of(to)?;
        let current = self
            .positions
            .get(&id)
            .ok_or(SpaceError::UnknownAgent { id })?;
        assert_eq!(
            current, from,
            "cached position of {id} diverged from the grid index"
        );
        if *current == to {
            return Ok(to);
        }
        self.claim(id, &to, to_index)?;
        let from_index = self
            .extent
            .linear_index(current)
            .expect("stored grid positions are always normalized");
        self.cells[from_index] = None;
        self.cells[to_index] = Some(id);
        self.positions.insert(id, to.clone());
        Ok(to)
    }

    fn ids_in_position(&self, pos: &Coord) -> Box<dyn Iterator<Item = AgentId> + '_> {
        Box::new(self.occupant(pos).into_iter())
    }

    fn nearby_ids(&self, pos: &Coord, radius: f64) -> Box<dyn Iterator<Item = AgentId> + '_> {
        let Ok(center) = self.extent.normalize(pos) else {
            return Box::new(std::iter::empty());
        };
        Box::new(
            CellWalk::ball(&self.extent, center, radius, self.metric, true)
                .filter_map(move |(index, _)| self.cells[index]),
        )
    }

    fn cursor(&self, pos: &Coord, radius: f64) -> NearbyCursor<Coord> {
        match self.extent.normalize(pos) {
            Ok(center) => {
                let cells = CellWalk::ball(&self.extent, center.clone(), radius, self.metric, true)
                    .filter(|(index, _)| self.cells[*index].is_some())
                    .map(|(index, _)| index)
                    .collect();
                NearbyCursor::new(cells, center, radius, false)
            }
            Err(_) => NearbyCursor::new(Vec::new(), pos.clone(), radius, false),
        }
    }

    fn cell_occupant(&self, cell: usize, slot: usize) -> Option<AgentId> {
        if slot == 0 {
            *self.cells.get(cell)?
        } else {
            None
        }
    }

    fn nearest_neighbor(
        &self,
        pos: &Coord,
        exclude: Option<AgentId>,
        max_radius: Option<f64>,
    ) -> Option<AgentId> {
        let center = self.extent.normalize(pos).ok()?;
        if self.positions.is_empty() {
            return None;
        }
        grid::expanding_search(
            &self.extent,
            &center,
            max_radius,
            |k| f64::from(k + 1),
            |index, best| {
                let Some(id) = self.cells[index] else {
                    return;
                };
                if Some(id) == exclude {
                    return;
                }
                let d = self.extent.distance(&center, &self.positions[&id], self.metric);
                if max_radius.is_some_and(|m| d > m) {
                    return;
                }
                grid::offer(best, d, id);
            },
        )
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Coord {
        grid::random_coord(&self.extent, rng)
    }
}

impl DiscreteSpace for GridSpaceSingle {
    fn extent(&self) -> &GridExtent {
        &self.extent
    }

    fn occupants(&self, pos: &Coord) -> &[AgentId] {
        match self.index_of(pos) {
            Ok((_, index)) => self.cells[index].as_slice(),
            Err(_) => &[],
        }
    }

    fn can_enter(&self, id: AgentId, pos: &Coord) -> bool {
        self.occupant(pos).map_or(self.extent.normalize(pos).is_ok(), |o| o == id)
    }

    fn nearby_positions(&self, pos: &Coord, radius: f64) -> Box<dyn Iterator<Item = Coord> + '_> {
        let Ok(center) = self.extent.normalize(pos) else {
            return Box::new(std::iter::empty());
        };
        Box::new(
            CellWalk::ball(&self.extent, center, radius, self.metric, false).map(|(_, coord)| coord),
        )
    }
}
