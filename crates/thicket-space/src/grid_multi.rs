//! Multi-occupancy grid index: any number of agents per cell.

use crate::cursor::NearbyCursor;
use crate::error::SpaceError;
use crate::extent::GridExtent;
use crate::grid::{self, CellWalk};
use crate::metric::Metric;
use crate::space::{DiscreteSpace, Space, SpaceKind};
use indexmap::IndexMap;
use rand::Rng;
use smallvec::SmallVec;
use thicket_core::{AgentId, Coord};

/// Occupants of one cell, in insertion order.
type Cell = SmallVec<[AgentId; 2]>;

/// A D-dimensional lattice where each cell holds a list of agent IDs.
///
/// Coordinates are 1-based. Removal from a cell preserves the relative
/// order of the remaining occupants.
///
/// # Examples
///
/// ```
/// use thicket_space::{GridExtent, GridSpace, Metric, Space};
/// use thicket_core::AgentId;
///
/// let extent = GridExtent::new(&[5, 5], &[false]).unwrap();
/// let mut space = GridSpace::new(extent, Metric::Chebyshev);
/// space.insert(AgentId(1), &[1, 1].into_iter().collect()).unwrap();
/// space.insert(AgentId(2), &[2, 2].into_iter().collect()).unwrap();
///
/// let near: Vec<_> = space.nearby_ids(&[1, 1].into_iter().collect(), 1.0).collect();
/// assert_eq!(near, vec![AgentId(1), AgentId(2)]);
/// ```
#[derive(Clone, Debug)]
pub struct GridSpace {
    extent: GridExtent,
    metric: Metric,
    cells: Vec<Cell>,
    positions: IndexMap<AgentId, Coord>,
}

impl GridSpace {
    /// Create an empty multi-occupancy grid over `extent`.
    pub fn new(extent: GridExtent, metric: Metric) -> Self {
        tracing::debug!(
            dims = ?extent.dims(),
            periodic = ?extent.periodicity(),
            ?metric,
            "created multi-occupancy grid"
        );
        let cells = vec![Cell::new(); extent.cell_count()];
        Self {
            extent,
            metric,
            cells,
            positions: IndexMap::new(),
        }
    }

    fn index_of(&self, pos: &Coord) -> Result<(Coord, usize), SpaceError> {
        let pos = self.extent.normalize(pos)?;
        let index = self
            .extent
            .linear_index(&pos)
            .ok_or_else(|| SpaceError::CoordOutOfBounds {
                coord: pos.clone(),
                bounds: format!("{:?}", self.extent.dims()),
            })?;
        Ok((pos, index))
    }

    fn detach(&mut self, id: AgentId, index: usize) {
        let cell = &mut self.cells[index];
        let before = cell.len();
        cell.retain(|other| *other != id);
        assert_eq!(
            cell.len() + 1,
            before,
            "grid index corrupted: {id} missing from its recorded cell"
        );
    }
}

impl Space for GridSpace {
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
        self.cells[index].push(id);
        self.positions.insert(id, pos.clone());
        Ok(pos)
    }

    fn remove(&mut self, id: AgentId) -> Option<Coord> {
        let pos = self.positions.swap_remove(&id)?;
        let index = self
            .extent
            .linear_index(&pos)
            .expect("stored grid positions are always normalized");
        self.detach(id, index);
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
        let from_index = self
            .extent
            .linear_index(current)
            .expect("stored grid positions are always normalized");
        self.detach(id, from_index);
        self.cells[to_index].push(id);
        self.positions.insert(id, to.clone());
        Ok(to)
    }

    fn ids_in_position(&self, pos: &Coord) -> Box<dyn Iterator<Item = AgentId> + '_> {
        Box::new(self.occupants(pos).iter().copied())
    }

    fn nearby_ids(&self, pos: &Coord, radius: f64) -> Box<dyn Iterator<Item = AgentId> + '_> {
        let Ok(center) = self.extent.normalize(pos) else {
            return Box::new(std::iter::empty());
        };
        Box::new(
            CellWalk::ball(&self.extent, center, radius, self.metric, true)
                .flat_map(move |(index, _)| self.cells[index].iter().copied()),
        )
    }

    fn cursor(&self, pos: &Coord, radius: f64) -> NearbyCursor<Coord> {
        match self.extent.normalize(pos) {
            Ok(center) => {
                let cells = CellWalk::ball(&self.extent, center.clone(), radius, self.metric, true)
                    .map(|(index, _)| index)
                    .collect();
                NearbyCursor::new(cells, center, radius, false)
            }
            Err(_) => NearbyCursor::new(Vec::new(), pos.clone(), radius, false),
        }
    }

    fn cell_occupant(&self, cell: usize, slot: usize) -> Option<AgentId> {
        self.cells.get(cell)?.get(slot).copied()
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
                for &id in &self.cells[index] {
                    if Some(id) == exclude {
                        continue;
                    }
                    let d = self.extent.distance(&center, &self.positions[&id], self.metric);
                    if max_radius.is_some_and(|m| d > m) {
                        continue;
                    }
                    grid::offer(best, d, id);
                }
            },
        )
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Coord {
        grid::random_coord(&self.extent, rng)
    }
}

impl DiscreteSpace for GridSpace {
    fn extent(&self) -> &GridExtent {
        &self.extent
    }

    fn occupants(&self, pos: &Coord) -> &[AgentId] {
        match self.index_of(pos) {
            Ok((_, index)) => &self.cells[index],
            Err(_) => &[],
        }
    }

    fn can_enter(&self, _id: AgentId, pos: &Coord) -> bool {
        self.extent.normalize(pos).is_ok()
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
