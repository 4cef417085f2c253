//! A* search over a grid extent.
//!
//! A request moves through `Requested -> Searching -> {Found, Unreachable}`:
//! [`Pathfinder::request`] validates start and goal eagerly and yields a
//! [`PathRequest`]; [`Pathfinder::search`] runs to completion and reports
//! a [`SearchOutcome`]. The open set is finite, so every search terminates.
//!
//! With `admissibility = ε > 0` the heuristic is inflated by `1 + ε`,
//! bounding the returned cost by `(1 + ε)` times the optimum while
//! expanding fewer nodes.

use crate::cost::{min_steps, CostMetric};
use crate::error::PathError;
use crate::mask::{PenaltyMap, WalkMask};
use crate::route::Route;
use rand::seq::IndexedRandom;
use rand::Rng;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thicket_core::Coord;
use thicket_space::GridExtent;

/// Construction-time options for a [`Pathfinder`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathConfig {
    /// Allow moves along several axes at once (default: true).
    pub diagonal_movement: bool,
    /// Heuristic inflation `ε >= 0` (default: 0, optimal routes).
    pub admissibility: f64,
    /// Step pricing and heuristic (default: [`CostMetric::Direct`]).
    pub cost_metric: CostMetric,
    /// Walkable cells; `None` means every cell.
    pub walkable: Option<WalkMask>,
    /// Extra cost for entering each cell; `None` means zero.
    pub penalty: Option<PenaltyMap>,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            diagonal_movement: true,
            admissibility: 0.0,
            cost_metric: CostMetric::Direct,
            walkable: None,
            penalty: None,
        }
    }
}

impl PathConfig {
    /// Check every option against `extent`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `admissibility` is negative or not finite
    /// - the walkability mask or penalty map has a different shape
    pub fn validate(&self, extent: &GridExtent) -> Result<(), PathError> {
        if !self.admissibility.is_finite() || self.admissibility < 0.0 {
            return Err(PathError::InvalidAdmissibility {
                value: self.admissibility,
            });
        }
        if let Some(mask) = &self.walkable {
            mask.check_shape(extent)?;
        }
        if let Some(penalty) = &self.penalty {
            penalty.check_shape(extent)?;
        }
        Ok(())
    }
}

/// Which route [`Pathfinder::best_route`] prefers among several goals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BestRoute {
    /// Lowest total cost.
    Shortest,
    /// Highest total cost.
    Longest,
}

/// A validated route request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathRequest {
    start: Coord,
    goal: Coord,
    start_index: usize,
    goal_index: usize,
}

impl PathRequest {
    /// Normalized start cell.
    pub fn start(&self) -> &Coord {
        &self.start
    }

    /// Normalized goal cell.
    pub fn goal(&self) -> &Coord {
        &self.goal
    }
}

/// Result of a completed search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
    /// The goal was popped from the open set.
    Found {
        /// Waypoints after the start, ending at the goal.
        route: Route,
        /// Total step and penalty cost.
        cost: f64,
        /// Nodes expanded.
        expanded: usize,
    },
    /// The open set ran dry.
    Unreachable {
        /// Nodes expanded.
        expanded: usize,
    },
}

impl SearchOutcome {
    /// Whether the goal was reached.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Route cost, if found.
    pub fn cost(&self) -> Option<f64> {
        match self {
            Self::Found { cost, .. } => Some(*cost),
            Self::Unreachable { .. } => None,
        }
    }

    /// Nodes expanded during the search.
    pub fn expanded(&self) -> usize {
        match self {
            Self::Found { expanded, .. } | Self::Unreachable { expanded } => *expanded,
        }
    }

    /// The route; empty when unreachable.
    pub fn into_route(self) -> Route {
        match self {
            Self::Found { route, .. } => route,
            Self::Unreachable { .. } => Route::empty(),
        }
    }
}

/// A unit move: offset plus the number of axes it changes.
#[derive(Clone, Debug)]
struct Move {
    offset: SmallVec<[i32; 4]>,
    axes: usize,
}

fn moves(ndim: usize, diagonal: bool) -> Vec<Move> {
    let mut out = Vec::new();
    if diagonal {
        let total = 3usize.pow(ndim as u32);
        for code in 0..total {
            let mut c = code;
            let offset: SmallVec<[i32; 4]> = (0..ndim)
                .map(|_| {
                    let digit = (c % 3) as i32 - 1;
                    c /= 3;
                    digit
                })
                .collect();
            let axes = offset.iter().filter(|&&o| o != 0).count();
            if axes > 0 {
                out.push(Move { offset, axes });
            }
        }
    } else {
        for axis in 0..ndim {
            for step in [-1, 1] {
                let mut offset = SmallVec::from_elem(0, ndim);
                offset[axis] = step;
                out.push(Move { offset, axes: 1 });
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    g: f64,
    seq: u64,
    index: usize,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // Reversed: BinaryHeap is a max-heap, we pop lowest (f, g, seq).
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

const NO_PARENT: usize = usize::MAX;

/// A* pathfinder bound to one grid extent.
///
/// Constructed via [`Pathfinder::builder`] or [`Pathfinder::new`].
#[derive(Clone, Debug)]
pub struct Pathfinder {
    extent: GridExtent,
    diagonal_movement: bool,
    admissibility: f64,
    cost_metric: CostMetric,
    walkable: Option<WalkMask>,
    penalty: Option<PenaltyMap>,
    moves: Vec<Move>,
}

/// Builder for [`Pathfinder`].
#[derive(Clone, Debug)]
pub struct PathfinderBuilder {
    extent: GridExtent,
    config: PathConfig,
}

impl PathfinderBuilder {
    /// Allow multi-axis moves (default: true).
    pub fn diagonal_movement(mut self, diagonal: bool) -> Self {
        self.config.diagonal_movement = diagonal;
        self
    }

    /// Heuristic inflation factor (default: 0). Must be finite and >= 0.
    pub fn admissibility(mut self, admissibility: f64) -> Self {
        self.config.admissibility = admissibility;
        self
    }

    /// Step pricing and heuristic (default: Direct).
    pub fn cost_metric(mut self, cost_metric: CostMetric) -> Self {
        self.config.cost_metric = cost_metric;
        self
    }

    /// Restrict movement to walkable cells.
    pub fn walkable(mut self, mask: WalkMask) -> Self {
        self.config.walkable = Some(mask);
        self
    }

    /// Add a per-cell entry penalty.
    pub fn penalty(mut self, penalty: PenaltyMap) -> Self {
        self.config.penalty = Some(penalty);
        self
    }

    /// Build the pathfinder, validating all configuration.
    pub fn build(self) -> Result<Pathfinder, PathError> {
        Pathfinder::new(self.extent, self.config)
    }
}

impl Pathfinder {
    /// Create a new builder for a pathfinder over `extent`.
    pub fn builder(extent: GridExtent) -> PathfinderBuilder {
        PathfinderBuilder {
            extent,
            config: PathConfig::default(),
        }
    }

    /// Create a pathfinder from a full configuration.
    pub fn new(extent: GridExtent, config: PathConfig) -> Result<Self, PathError> {
        config.validate(&extent)?;
        let moves = moves(extent.ndim(), config.diagonal_movement);
        tracing::debug!(
            dims = ?extent.dims(),
            diagonal = config.diagonal_movement,
            admissibility = config.admissibility,
            cost_metric = ?config.cost_metric,
            masked = config.walkable.is_some(),
            penalized = config.penalty.is_some(),
            "created pathfinder"
        );
        Ok(Self {
            extent,
            diagonal_movement: config.diagonal_movement,
            admissibility: config.admissibility,
            cost_metric: config.cost_metric,
            walkable: config.walkable,
            penalty: config.penalty,
            moves,
        })
    }

    /// Grid the pathfinder searches.
    pub fn extent(&self) -> &GridExtent {
        &self.extent
    }

    /// Whether multi-axis moves are allowed.
    pub fn diagonal_movement(&self) -> bool {
        self.diagonal_movement
    }

    /// Heuristic inflation factor.
    pub fn admissibility(&self) -> f64 {
        self.admissibility
    }

    /// Step pricing and heuristic.
    pub fn cost_metric(&self) -> CostMetric {
        self.cost_metric
    }

    /// Walkability mask, if any.
    pub fn walkable_mask(&self) -> Option<&WalkMask> {
        self.walkable.as_ref()
    }

    /// Penalty map, if any.
    pub fn penalty_map(&self) -> Option<&PenaltyMap> {
        self.penalty.as_ref()
    }

    fn cell(&self, pos: &Coord) -> Result<(Coord, usize), PathError> {
        let pos = self
            .extent
            .normalize(pos)
            .map_err(|_| PathError::OutOfBounds { coord: pos.clone() })?;
        let index = self
            .extent
            .linear_index(&pos)
            .expect("normalized coordinates are always in range");
        Ok((pos, index))
    }

    fn walkable_at(&self, index: usize) -> bool {
        self.walkable.as_ref().map_or(true, |m| m.is_walkable(index))
    }

    /// Whether `pos` is inside the grid and walkable.
    pub fn is_walkable(&self, pos: &Coord) -> bool {
        self.cell(pos).is_ok_and(|(_, i)| self.walkable_at(i))
    }

    /// Mark `pos` walkable or blocked.
    pub fn set_walkable(&mut self, pos: &Coord, walkable: bool) -> Result<(), PathError> {
        let (_, index) = self.cell(pos)?;
        let extent = &self.extent;
        self.walkable
            .get_or_insert_with(|| WalkMask::all_walkable(extent))
            .set(index, walkable);
        Ok(())
    }

    /// A uniformly random walkable cell, or `None` if there is none.
    pub fn random_walkable<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord> {
        let cells: Vec<usize> = (0..self.extent.cell_count())
            .filter(|&i| self.walkable_at(i))
            .collect();
        cells.choose(rng).map(|&i| self.extent.coord_of(i))
    }

    /// Check that `extent` is the grid this pathfinder searches, axis
    /// sizes and periodicity alike.
    pub fn check_extent(&self, extent: &GridExtent) -> Result<(), PathError> {
        if &self.extent == extent {
            Ok(())
        } else {
            Err(PathError::GridMismatch {
                expected: self.extent.clone(),
                got: extent.clone(),
            })
        }
    }

    /// Validate a request from `start` to `goal`.
    ///
    /// Only the goal has to be walkable. A start on a blocked cell is
    /// accepted so an agent standing on a cell that was blocked after it
    /// arrived can still leave; its first step lands on a walkable cell.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either cell is outside the grid or the goal is
    /// not walkable.
    pub fn request(&self, start: &Coord, goal: &Coord) -> Result<PathRequest, PathError> {
        let (start, start_index) = self.cell(start)?;
        let (goal, goal_index) = self.cell(goal)?;
        if !self.walkable_at(goal_index) {
            return Err(PathError::GoalNotWalkable { goal });
        }
        Ok(PathRequest {
            start,
            goal,
            start_index,
            goal_index,
        })
    }

    /// Validate and run a search in one call.
    ///
    /// As with [`request`](Self::request), a blocked start is allowed
    /// while a blocked goal is rejected.
    pub fn find_path(&self, start: &Coord, goal: &Coord) -> Result<SearchOutcome, PathError> {
        let request = self.request(start, goal)?;
        Ok(self.search(&request))
    }

    /// Plan to each of `goals` and keep the best found route.
    ///
    /// Returns the chosen goal and its route, or `None` when no goal is
    /// reachable. Ties keep the earlier goal.
    pub fn best_route<I>(
        &self,
        start: &Coord,
        goals: I,
        which: BestRoute,
    ) -> Result<Option<(Coord, Route)>, PathError>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut best: Option<(f64, Coord, Route)> = None;
        for goal in goals {
            let request = self.request(start, &goal)?;
            let SearchOutcome::Found { route, cost, .. } = self.search(&request) else {
                continue;
            };
            let better = best.as_ref().map_or(true, |(b, _, _)| match which {
                BestRoute::Shortest => cost < *b,
                BestRoute::Longest => cost > *b,
            });
            if better {
                best = Some((cost, request.goal, route));
            }
        }
        Ok(best.map(|(_, goal, route)| (goal, route)))
    }

    fn heuristic(&self, from: &[i32], goal: &[i32]) -> f64 {
        let mut h = self.cost_metric.estimate(&self.extent, from, goal);
        if let Some(penalty) = &self.penalty {
            h += penalty.min_penalty()
                * min_steps(&self.extent, from, goal, self.diagonal_movement);
        }
        h * (1.0 + self.admissibility)
    }

    fn shifted(&self, from: &[i32], offset: &[i32]) -> Option<Coord> {
        from.iter()
            .zip(offset)
            .enumerate()
            .map(|(axis, (&c, &o))| self.extent.resolve_axis(axis, c + o))
            .collect()
    }

    /// Multi-axis moves may not cut a blocked corner: every single-axis
    /// component of the move must land on a walkable cell.
    fn corner_clear(&self, from: &[i32], mv: &Move) -> bool {
        if mv.axes < 2 || self.walkable.is_none() {
            return true;
        }
        mv.offset
            .iter()
            .enumerate()
            .filter(|&(_, &o)| o != 0)
            .all(|(axis, &o)| {
                let mut step: SmallVec<[i32; 4]> = SmallVec::from_elem(0, from.len());
                step[axis] = o;
                self.shifted(from, &step)
                    .and_then(|c| self.extent.linear_index(&c))
                    .is_some_and(|i| self.walkable_at(i))
            })
    }

    /// Run A* to completion.
    pub fn search(&self, request: &PathRequest) -> SearchOutcome {
        if request.start_index == request.goal_index {
            return SearchOutcome::Found {
                route: Route::empty(),
                cost: 0.0,
                expanded: 0,
            };
        }
        let cells = self.extent.cell_count();
        let mut g_score = vec![f64::INFINITY; cells];
        let mut came_from = vec![NO_PARENT; cells];
        let mut closed = vec![false; cells];
        let mut open = BinaryHeap::new();
        let mut seq = 0u64;

        g_score[request.start_index] = 0.0;
        open.push(OpenNode {
            f: self.heuristic(&request.start, &request.goal),
            g: 0.0,
            seq,
            index: request.start_index,
        });

        let mut expanded = 0usize;
        while let Some(node) = open.pop() {
            if closed[node.index] {
                continue;
            }
            closed[node.index] = true;
            if node.index == request.goal_index {
                let route = self.reconstruct(&came_from, request.start_index, node.index);
                tracing::debug!(
                    start = ?request.start,
                    goal = ?request.goal,
                    expanded,
                    cost = node.g,
                    steps = route.len(),
                    "route found"
                );
                return SearchOutcome::Found {
                    route,
                    cost: node.g,
                    expanded,
                };
            }
            expanded += 1;

            let here = self.extent.coord_of(node.index);
            for mv in &self.moves {
                let Some(next) = self.shifted(&here, &mv.offset) else {
                    continue;
                };
                let Some(index) = self.extent.linear_index(&next) else {
                    continue;
                };
                if closed[index] || !self.walkable_at(index) || !self.corner_clear(&here, mv) {
                    continue;
                }
                let mut step = self.cost_metric.step_cost(mv.axes);
                if let Some(penalty) = &self.penalty {
                    step += penalty.get(index);
                }
                let tentative = node.g + step;
                if tentative >= g_score[index] {
                    continue;
                }
                g_score[index] = tentative;
                came_from[index] = node.index;
                seq += 1;
                open.push(OpenNode {
                    f: tentative + self.heuristic(&next, &request.goal),
                    g: tentative,
                    seq,
                    index,
                });
            }
        }

        tracing::debug!(
            start = ?request.start,
            goal = ?request.goal,
            expanded,
            "goal unreachable"
        );
        SearchOutcome::Unreachable { expanded }
    }

    fn reconstruct(&self, came_from: &[usize], start: usize, goal: usize) -> Route {
        let mut chain = Vec::new();
        let mut at = goal;
        while at != start {
            chain.push(self.extent.coord_of(at));
            at = came_from[at];
            assert_ne!(at, NO_PARENT, "A* parent chain broken before reaching start");
        }
        chain.into_iter().rev().collect()
    }
}
