//! Error types for pathfinder construction and route requests.

use std::fmt;
use thicket_core::Coord;
use thicket_space::GridExtent;

/// Errors detected before any search work begins.
///
/// An unreachable goal is not an error: it is reported as
/// [`SearchOutcome::Unreachable`](crate::SearchOutcome::Unreachable).
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// The requested goal cell is not walkable.
    GoalNotWalkable {
        /// The rejected goal.
        goal: Coord,
    },
    /// A start, goal or edited cell lies outside a bounded axis, or has
    /// the wrong number of components.
    OutOfBounds {
        /// The offending coordinate.
        coord: Coord,
    },
    /// A walkability mask or penalty map does not match the grid shape.
    ShapeMismatch {
        /// Which map was rejected.
        what: &'static str,
        /// Shape of the grid.
        expected: Vec<u32>,
        /// Shape of the supplied map.
        got: Vec<u32>,
    },
    /// The pathfinder was built for a different grid than the space it
    /// is asked to plan in.
    GridMismatch {
        /// Grid of the pathfinder.
        expected: GridExtent,
        /// Grid of the space.
        got: GridExtent,
    },
    /// The admissibility factor is negative or not finite.
    InvalidAdmissibility {
        /// The rejected value.
        value: f64,
    },
    /// A penalty is negative or not finite.
    InvalidPenalty {
        /// Flat index of the cell.
        index: usize,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoalNotWalkable { goal } => write!(f, "goal {goal:?} is not walkable"),
            Self::OutOfBounds { coord } => write!(f, "coordinate {coord:?} is outside the grid"),
            Self::ShapeMismatch {
                what,
                expected,
                got,
            } => write!(f, "{what} shape {got:?} does not match grid {expected:?}"),
            Self::GridMismatch { expected, got } => write!(
                f,
                "space grid {:?} (periodic {:?}) does not match pathfinder grid {:?} (periodic {:?})",
                got.dims(),
                got.periodicity(),
                expected.dims(),
                expected.periodicity()
            ),
            Self::InvalidAdmissibility { value } => {
                write!(f, "admissibility must be finite and >= 0, got {value}")
            }
            Self::InvalidPenalty { index, value } => {
                write!(f, "penalty at cell {index} must be finite and >= 0, got {value}")
            }
        }
    }
}

impl std::error::Error for PathError {}
