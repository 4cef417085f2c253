//! Detached neighbour cursor with live, mutation-observing reads.

use crate::space::Space;
use thicket_core::AgentId;

/// A neighbour query that does not borrow the space between steps.
///
/// The candidate storage cells are fixed when the cursor is created; the
/// occupants of each cell are read afresh on every
/// [`advance`](Self::advance). Mutating the space between calls is
/// allowed and changes what later calls yield: removing an already
/// yielded agent shifts the remaining occupants of its cell down one
/// slot, so the next one is skipped.
///
/// That is intended. When every candidate must be visited regardless of
/// mutation, collect the IDs first (`space.nearby_ids(..).collect()`).
#[derive(Clone, Debug)]
pub struct NearbyCursor<P> {
    cells: Vec<usize>,
    at: usize,
    slot: usize,
    center: P,
    radius: f64,
    exact: bool,
}

impl<P> NearbyCursor<P> {
    /// Create a cursor over `cells`.
    ///
    /// With `exact` set, each candidate's live position is checked against
    /// `radius` around `center` before it is yielded.
    pub fn new(cells: Vec<usize>, center: P, radius: f64, exact: bool) -> Self {
        Self {
            cells,
            at: 0,
            slot: 0,
            center,
            radius,
            exact,
        }
    }

    /// Number of storage cells still to visit, including the current one.
    pub fn remaining_cells(&self) -> usize {
        self.cells.len() - self.at.min(self.cells.len())
    }

    /// Yield the next candidate, reading the space's current state.
    pub fn advance<S>(&mut self, space: &S) -> Option<AgentId>
    where
        S: Space<Position = P>,
    {
        while self.at < self.cells.len() {
            match space.cell_occupant(self.cells[self.at], self.slot) {
                Some(id) => {
                    self.slot += 1;
                    if !self.exact {
                        return Some(id);
                    }
                    let inside = space
                        .position_of(id)
                        .is_some_and(|p| space.distance(p, &self.center) <= self.radius);
                    if inside {
                        return Some(id);
                    }
                }
                None => {
                    self.at += 1;
                    self.slot = 0;
                }
            }
        }
        None
    }
}
