//! Model and space configuration, validation, and error types.
//!
//! Each config is a plain struct with a [`Default`]; `validate()` checks
//! it before anything is allocated and the `build*` methods construct the
//! space.

use std::error::Error;
use std::fmt;

use thicket_path::{PathConfig, PathError, Pathfinder};
use thicket_space::{
    ContinuousExtent, ContinuousSpace, GridExtent, GridSpace, GridSpaceSingle, Metric, SpaceError,
};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The space rejected the extent or bucket size.
    Space(SpaceError),
    /// The pathfinder rejected its options.
    Path(PathError),
    /// No axes were given.
    EmptyExtent,
    /// The periodicity vector has neither one entry nor one per axis.
    PeriodicityMismatch {
        /// Number of axes.
        axes: usize,
        /// Number of periodicity flags.
        flags: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Path(e) => write!(f, "path: {e}"),
            Self::EmptyExtent => write!(f, "extent has no axes"),
            Self::PeriodicityMismatch { axes, flags } => write!(
                f,
                "{flags} periodicity flags for {axes} axes (expected 1 or {axes})"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Space(e) => Some(e),
            Self::Path(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<PathError> for ConfigError {
    fn from(e: PathError) -> Self {
        Self::Path(e)
    }
}

fn check_axes(axes: usize, flags: usize) -> Result<(), ConfigError> {
    if axes == 0 {
        return Err(ConfigError::EmptyExtent);
    }
    if flags != 1 && flags != axes {
        return Err(ConfigError::PeriodicityMismatch { axes, flags });
    }
    Ok(())
}

// ── GridConfig ─────────────────────────────────────────────────────

/// Configuration for a discrete grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// Cells per axis. Default: `[10, 10]`.
    pub dims: Vec<u32>,
    /// One flag per axis, or a single flag for all. Default: `[true]`.
    pub periodic: Vec<bool>,
    /// Distance metric. Default: Chebyshev.
    pub metric: Metric,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            dims: vec![10, 10],
            periodic: vec![true],
            metric: Metric::Chebyshev,
        }
    }
}

impl GridConfig {
    /// Check the configuration without allocating cells.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_axes(self.dims.len(), self.periodic.len())?;
        self.extent().map(|_| ())
    }

    /// The validated extent.
    pub fn extent(&self) -> Result<GridExtent, ConfigError> {
        check_axes(self.dims.len(), self.periodic.len())?;
        Ok(GridExtent::new(&self.dims, &self.periodic)?)
    }

    /// Build a multi-occupancy grid.
    pub fn build_multi(&self) -> Result<GridSpace, ConfigError> {
        Ok(GridSpace::new(self.extent()?, self.metric))
    }

    /// Build a single-occupancy grid.
    pub fn build_single(&self) -> Result<GridSpaceSingle, ConfigError> {
        Ok(GridSpaceSingle::new(self.extent()?, self.metric))
    }

    /// Build a pathfinder over this grid.
    pub fn pathfinder(&self, config: PathConfig) -> Result<Pathfinder, ConfigError> {
        Ok(Pathfinder::new(self.extent()?, config)?)
    }
}

// ── ContinuousConfig ───────────────────────────────────────────────

/// Configuration for a continuous space.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousConfig {
    /// Length per axis. Default: `[1.0, 1.0]`.
    pub extent: Vec<f64>,
    /// One flag per axis, or a single flag for all. Default: `[true]`.
    pub periodic: Vec<bool>,
    /// Bucket size of the proximity index. Set it to the radius you query
    /// with most; it is fixed for the lifetime of the space. Default: 0.1.
    pub bucket_size: f64,
    /// Distance metric. Default: Euclidean.
    pub metric: Metric,
}

impl Default for ContinuousConfig {
    fn default() -> Self {
        Self {
            extent: vec![1.0, 1.0],
            periodic: vec![true],
            bucket_size: 0.1,
            metric: Metric::Euclidean,
        }
    }
}

impl ContinuousConfig {
    /// Check the configuration without allocating buckets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_axes(self.extent.len(), self.periodic.len())?;
        ContinuousExtent::new(&self.extent, &self.periodic)?;
        if !self.bucket_size.is_finite() || self.bucket_size <= 0.0 {
            return Err(SpaceError::InvalidBucketSize {
                value: self.bucket_size,
            }
            .into());
        }
        Ok(())
    }

    /// Build the continuous space.
    pub fn build(&self) -> Result<ContinuousSpace, ConfigError> {
        self.validate()?;
        let extent = ContinuousExtent::new(&self.extent, &self.periodic)?;
        Ok(ContinuousSpace::new(extent, self.bucket_size, self.metric)?)
    }
}

// ── ModelConfig ────────────────────────────────────────────────────

/// Configuration for a [`Model`](crate::Model).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelConfig {
    /// Seed of the model's ChaCha8 RNG. Default: 0.
    pub seed: u64,
}
