//! Per-cell walkability and traversal penalties.
//!
//! Both maps are dense and share the row-major flat indexing of
//! [`GridExtent`](thicket_space::GridExtent).

use crate::error::PathError;
use smallvec::SmallVec;
use thicket_core::Coord;
use thicket_space::GridExtent;

fn check_dims(what: &'static str, dims: &[u32], extent: &GridExtent) -> Result<(), PathError> {
    if dims != extent.dims() {
        return Err(PathError::ShapeMismatch {
            what,
            expected: extent.dims().to_vec(),
            got: dims.to_vec(),
        });
    }
    Ok(())
}

fn cell_count(what: &'static str, dims: &[u32], len: usize) -> Result<(), PathError> {
    let expected: usize = dims.iter().map(|&d| d as usize).product();
    if expected != len {
        return Err(PathError::ShapeMismatch {
            what,
            expected: dims.to_vec(),
            got: vec![len as u32],
        });
    }
    Ok(())
}

/// Boolean map of cells an agent may stand on or traverse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkMask {
    dims: SmallVec<[u32; 4]>,
    cells: Vec<bool>,
}

impl WalkMask {
    /// Every cell walkable.
    pub fn all_walkable(extent: &GridExtent) -> Self {
        Self {
            dims: SmallVec::from_slice(extent.dims()),
            cells: vec![true; extent.cell_count()],
        }
    }

    /// Build from a flat row-major vector.
    ///
    /// Returns `Err(PathError::ShapeMismatch)` if `cells.len()` is not the
    /// product of `dims`.
    pub fn from_vec(dims: &[u32], cells: Vec<bool>) -> Result<Self, PathError> {
        cell_count("walkability mask", dims, cells.len())?;
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            cells,
        })
    }

    /// Build by evaluating `f` on every coordinate of `extent`.
    pub fn from_fn<F>(extent: &GridExtent, mut f: F) -> Self
    where
        F: FnMut(&Coord) -> bool,
    {
        Self {
            dims: SmallVec::from_slice(extent.dims()),
            cells: extent.positions().map(|c| f(&c)).collect(),
        }
    }

    /// Grid shape.
    pub fn dims(&self) -> &[u32] {
        &self.dims
    }

    /// Whether the cell at flat index `index` is walkable.
    pub fn is_walkable(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    /// Mark one cell.
    pub fn set(&mut self, index: usize, walkable: bool) {
        self.cells[index] = walkable;
    }

    /// Number of walkable cells.
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&w| w).count()
    }

    pub(crate) fn check_shape(&self, extent: &GridExtent) -> Result<(), PathError> {
        check_dims("walkability mask", &self.dims, extent)
    }
}

/// Non-negative extra cost for entering each cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PenaltyMap {
    dims: SmallVec<[u32; 4]>,
    values: Vec<f64>,
    min: f64,
}

impl PenaltyMap {
    /// Build from a flat row-major vector.
    ///
    /// Returns `Err(PathError::ShapeMismatch)` on a length mismatch and
    /// `Err(PathError::InvalidPenalty)` for a negative or non-finite entry.
    pub fn from_vec(dims: &[u32], values: Vec<f64>) -> Result<Self, PathError> {
        cell_count("penalty map", dims, values.len())?;
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(PathError::InvalidPenalty { index, value });
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        Ok(Self {
            dims: SmallVec::from_slice(dims),
            values,
            min: if min.is_finite() { min } else { 0.0 },
        })
    }

    /// Build by evaluating `f` on every coordinate of `extent`.
    pub fn from_fn<F>(extent: &GridExtent, mut f: F) -> Result<Self, PathError>
    where
        F: FnMut(&Coord) -> f64,
    {
        Self::from_vec(extent.dims(), extent.positions().map(|c| f(&c)).collect())
    }

    /// Grid shape.
    pub fn dims(&self) -> &[u32] {
        &self.dims
    }

    /// Penalty of the cell at flat index `index`.
    pub fn get(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(0.0)
    }

    /// Smallest penalty on the map.
    pub fn min_penalty(&self) -> f64 {
        self.min
    }

    pub(crate) fn check_shape(&self, extent: &GridExtent) -> Result<(), PathError> {
        check_dims("penalty map", &self.dims, extent)
    }
}
