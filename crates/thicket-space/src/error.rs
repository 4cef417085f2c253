//! Error types for space construction and index mutation.

use std::fmt;
use thicket_core::{AgentId, Coord, Point};

/// Errors arising from space construction, position validation, or
/// occupancy updates.
///
/// Every variant describes a caller mistake that left the index
/// untouched. Corruption of the index itself is not reported here: it
/// panics, since the shared state cannot be trusted afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// A grid coordinate lies outside a bounded axis.
    CoordOutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// Human-readable description of the valid range.
        bounds: String,
    },
    /// A continuous position lies outside a bounded axis (or is not finite).
    PointOutOfBounds {
        /// The offending position.
        point: Point,
        /// Human-readable description of the valid range.
        bounds: String,
    },
    /// A position has the wrong number of components.
    DimensionMismatch {
        /// Dimensionality of the space.
        expected: usize,
        /// Dimensionality of the supplied position.
        got: usize,
    },
    /// Attempted to construct a space with zero cells or zero axes.
    EmptySpace,
    /// A grid axis is too large for `i32` coordinates.
    DimensionTooLarge {
        /// Axis index.
        axis: usize,
        /// The configured size.
        value: u32,
        /// Maximum allowed size.
        max: u32,
    },
    /// A continuous extent or periodicity vector is malformed.
    InvalidExtent {
        /// What went wrong.
        reason: String,
    },
    /// Bucket size for a continuous index is not finite and positive.
    InvalidBucketSize {
        /// The rejected value.
        value: f64,
    },
    /// Single-occupancy cell already holds another agent.
    CellOccupied {
        /// The contested cell.
        coord: Coord,
        /// The agent already there.
        occupant: AgentId,
    },
    /// The agent is already present in the index.
    DuplicateAgent {
        /// The duplicated ID.
        id: AgentId,
    },
    /// The agent is not present in the index.
    UnknownAgent {
        /// The missing ID.
        id: AgentId,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CoordOutOfBounds { coord, bounds } => {
                write!(f, "coordinate {coord:?} out of bounds: {bounds}")
            }
            Self::PointOutOfBounds { point, bounds } => {
                write!(f, "position {point:?} out of bounds: {bounds}")
            }
            Self::DimensionMismatch { expected, got } => {
                write!(f, "expected {expected}D position, got {got}D")
            }
            Self::EmptySpace => write!(f, "space must have at least one cell"),
            Self::DimensionTooLarge { axis, value, max } => {
                write!(f, "axis {axis} size {value} exceeds maximum {max}")
            }
            Self::InvalidExtent { reason } => write!(f, "invalid extent: {reason}"),
            Self::InvalidBucketSize { value } => {
                write!(f, "bucket size must be finite and positive, got {value}")
            }
            Self::CellOccupied { coord, occupant } => {
                write!(f, "cell {coord:?} already occupied by agent {occupant}")
            }
            Self::DuplicateAgent { id } => write!(f, "agent {id} is already in the space"),
            Self::UnknownAgent { id } => write!(f, "agent {id} is not in the space"),
        }
    }
}

impl std::error::Error for SpaceError {}
