//! Error type for model-level operations.

use std::error::Error;
use std::fmt;
use thicket_core::AgentId;
use thicket_path::PathError;
use thicket_space::SpaceError;

/// Errors from adding, moving, querying or routing agents.
///
/// Expected simulation outcomes are not errors: a full grid yields
/// `None` from the "empty cell" helpers, and an unreachable goal yields
/// an empty route.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// The spatial index rejected the operation; the model is unchanged.
    Space(SpaceError),
    /// The pathfinder rejected a request.
    Path(PathError),
    /// No agent with this ID is in the model.
    UnknownAgent {
        /// The missing ID.
        id: AgentId,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Path(e) => write!(f, "path: {e}"),
            Self::UnknownAgent { id } => write!(f, "no agent with id {id}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            Self::Path(e) => Some(e),
            Self::UnknownAgent { .. } => None,
        }
    }
}

impl From<SpaceError> for ModelError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<PathError> for ModelError {
    fn from(e: PathError) -> Self {
        Self::Path(e)
    }
}
