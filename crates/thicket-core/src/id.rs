//! Strongly-typed agent identifiers and the [`Coord`] / [`Point`] aliases.

use smallvec::SmallVec;
use std::fmt;

/// Stable identifier of an agent within one model.
///
/// IDs are never reused while the agent is alive. The model hands out
/// sequential IDs through `Model::next_id`, but any unique `u64` is valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AgentId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A position on a discrete grid.
///
/// Coordinates are 1-based: on an axis of `n` cells the valid values are
/// `1..=n`. Uses `SmallVec<[i32; 4]>` to avoid heap allocation for grids
/// up to 4 dimensions; higher-dimensional grids spill to the heap.
pub type Coord = SmallVec<[i32; 4]>;

/// A position in continuous space.
///
/// Each component lies in `[0, extent_d)` once normalized by the space.
/// `f64` has no total `Eq`/`Hash`, so continuous positions are never
/// used as map keys; the bucket index keys on floored bucket coordinates
/// instead.
pub type Point = SmallVec<[f64; 4]>;
