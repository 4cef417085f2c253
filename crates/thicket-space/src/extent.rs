//! Per-axis size and periodicity of a space.
//!
//! [`GridExtent`] describes a D-dimensional integer lattice and owns the
//! coordinate arithmetic shared by every grid index (normalization, flat
//! indexing, wrapped deltas). [`ContinuousExtent`] does the same for
//! real-valued space.

use crate::error::SpaceError;
use crate::metric::{axis_delta, axis_delta_f64, axis_direction, axis_direction_f64, Metric};
use smallvec::SmallVec;
use thicket_core::{Coord, Point};

/// Expand a periodicity vector: a single flag applies to every axis.
fn expand_periodic(periodic: &[bool], ndim: usize) -> Result<SmallVec<[bool; 4]>, SpaceError> {
    match periodic.len() {
        1 => Ok(SmallVec::from_elem(periodic[0], ndim)),
        n if n == ndim => Ok(SmallVec::from_slice(periodic)),
        n => Err(SpaceError::InvalidExtent {
            reason: format!("periodicity has {n} entries for a {ndim}D extent"),
        }),
    }
}

/// Size and wrap behaviour of a D-dimensional integer lattice.
///
/// Coordinates are 1-based: axis `d` holds `1..=dims[d]`. Flat indices
/// are row-major with the last axis fastest.
///
/// # Examples
///
/// ```
/// use thicket_space::GridExtent;
/// use smallvec::smallvec;
///
/// let torus = GridExtent::new(&[10, 10], &[true]).unwrap();
/// let wrapped = torus.normalize(&smallvec![0, 11]).unwrap();
/// assert_eq!(wrapped.as_slice(), &[10, 1]);
///
/// let bounded = GridExtent::new(&[10, 10], &[false]).unwrap();
/// assert!(bounded.normalize(&smallvec![0, 11]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridExtent {
    dims: SmallVec<[u32; 4]>,
    periodic: SmallVec<[bool; 4]>,
    strides: SmallVec<[usize; 4]>,
    cell_count: usize,
}

impl GridExtent {
    /// Maximum axis size: coordinates use `i32`, so each axis must fit.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Create an extent from per-axis sizes and periodicity flags.
    ///
    /// `periodic` holds either one flag per axis or a single flag applied
    /// to all axes.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if there are no axes or any
    /// axis is 0, `Err(SpaceError::DimensionTooLarge)` if an axis exceeds
    /// `i32::MAX`, or `Err(SpaceError::InvalidExtent)` if the cell count
    /// overflows or the periodicity vector has the wrong length.
    pub fn new(dims: &[u32], periodic: &[bool]) -> Result<Self, SpaceError> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(SpaceError::EmptySpace);
        }
        for (axis, &value) in dims.iter().enumerate() {
            if value > Self::MAX_DIM {
                return Err(SpaceError::DimensionTooLarge {
                    axis,
                    value,
                    max: Self::MAX_DIM,
                });
            }
        }
        let periodic = expand_periodic(periodic, dims.len())?;

        let mut cell_count: usize = 1;
        for &d in dims {
            cell_count =
                cell_count
                    .checked_mul(d as usize)
                    .ok_or_else(|| SpaceError::InvalidExtent {
                        reason: "total cell count overflows usize".to_string(),
                    })?;
        }

        // strides[d] = product(dims[j] for j > d)
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, dims.len());
        for d in (0..dims.len().saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * dims[d + 1] as usize;
        }

        Ok(Self {
            dims: SmallVec::from_slice(dims),
            periodic,
            strides,
            cell_count,
        })
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Per-axis cell counts.
    pub fn dims(&self) -> &[u32] {
        &self.dims
    }

    /// Per-axis periodicity flags.
    pub fn periodicity(&self) -> &[bool] {
        &self.periodic
    }

    /// Whether axis `axis` wraps.
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// Whether at least one axis wraps.
    pub fn any_periodic(&self) -> bool {
        self.periodic.iter().any(|&p| p)
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Resolve a single axis value: identity in range, wrapped on a
    /// periodic axis, `None` on a bounded axis when out of range.
    pub fn resolve_axis(&self, axis: usize, val: i32) -> Option<i32> {
        let n = self.dims[axis] as i32;
        if (1..=n).contains(&val) {
            return Some(val);
        }
        if self.periodic[axis] {
            Some((val - 1).rem_euclid(n) + 1)
        } else {
            None
        }
    }

    fn check_ndim(&self, got: usize) -> Result<(), SpaceError> {
        if got != self.ndim() {
            return Err(SpaceError::DimensionMismatch {
                expected: self.ndim(),
                got,
            });
        }
        Ok(())
    }

    fn bounds_string(&self) -> String {
        self.dims
            .iter()
            .map(|d| format!("[1, {d}]"))
            .collect::<Vec<_>>()
            .join(" x ")
    }

    /// Wrap periodic axes into range; reject out-of-range bounded axes.
    pub fn normalize(&self, coord: &Coord) -> Result<Coord, SpaceError> {
        self.check_ndim(coord.len())?;
        let mut out = Coord::with_capacity(coord.len());
        for (axis, &v) in coord.iter().enumerate() {
            match self.resolve_axis(axis, v) {
                Some(v) => out.push(v),
                None => {
                    return Err(SpaceError::CoordOutOfBounds {
                        coord: coord.clone(),
                        bounds: self.bounds_string(),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Whether `coord` is already a valid, normalized coordinate.
    pub fn contains(&self, coord: &[i32]) -> bool {
        coord.len() == self.ndim()
            && coord
                .iter()
                .zip(self.dims.iter())
                .all(|(&v, &d)| v >= 1 && v <= d as i32)
    }

    /// Flat index of a normalized coordinate, or `None` if it is not one.
    pub fn linear_index(&self, coord: &[i32]) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        Some(
            coord
                .iter()
                .zip(self.strides.iter())
                .map(|(&v, &s)| (v - 1) as usize * s)
                .sum(),
        )
    }

    /// Inverse of [`linear_index`](Self::linear_index).
    pub fn coord_of(&self, mut index: usize) -> Coord {
        let mut out = Coord::with_capacity(self.ndim());
        for &s in &self.strides {
            out.push((index / s) as i32 + 1);
            index %= s;
        }
        out
    }

    /// All coordinates in flat-index order.
    pub fn positions(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.cell_count).map(move |i| self.coord_of(i))
    }

    /// Wrapped per-axis absolute deltas between two normalized coordinates.
    pub fn deltas(&self, a: &[i32], b: &[i32]) -> SmallVec<[u32; 4]> {
        a.iter()
            .zip(b.iter())
            .enumerate()
            .map(|(axis, (&x, &y))| axis_delta(x, y, self.dims[axis], self.periodic[axis]))
            .collect()
    }

    /// Distance between two normalized coordinates under `metric`.
    pub fn distance(&self, a: &[i32], b: &[i32], metric: Metric) -> f64 {
        metric.combine(self.deltas(a, b).into_iter().map(f64::from))
    }

    /// Cell reached by displacing `pos` by `delta`: periodic axes wrap,
    /// bounded axes stop at the wall.
    pub fn displace(&self, pos: &[i32], delta: &[i32]) -> Coord {
        pos.iter()
            .zip(delta.iter())
            .enumerate()
            .map(|(axis, (&p, &d))| {
                let v = p.saturating_add(d);
                self.resolve_axis(axis, v)
                    .unwrap_or_else(|| v.clamp(1, self.dims[axis] as i32))
            })
            .collect()
    }

    /// Shortest signed displacement from `from` to `to`.
    pub fn direction(&self, from: &[i32], to: &[i32]) -> Coord {
        from.iter()
            .zip(to.iter())
            .enumerate()
            .map(|(axis, (&f, &t))| axis_direction(f, t, self.dims[axis], self.periodic[axis]))
            .collect()
    }
}

/// Size and wrap behaviour of a D-dimensional continuous box `[0, L_d)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ContinuousExtent {
    lengths: SmallVec<[f64; 4]>,
    periodic: SmallVec<[bool; 4]>,
}

impl ContinuousExtent {
    /// Create an extent from per-axis lengths and periodicity flags.
    ///
    /// Every length must be finite and positive.
    pub fn new(lengths: &[f64], periodic: &[bool]) -> Result<Self, SpaceError> {
        if lengths.is_empty() {
            return Err(SpaceError::EmptySpace);
        }
        if let Some(bad) = lengths.iter().find(|l| !l.is_finite() || **l <= 0.0) {
            return Err(SpaceError::InvalidExtent {
                reason: format!("axis length must be finite and positive, got {bad}"),
            });
        }
        Ok(Self {
            lengths: SmallVec::from_slice(lengths),
            periodic: expand_periodic(periodic, lengths.len())?,
        })
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.lengths.len()
    }

    /// Per-axis lengths.
    pub fn lengths(&self) -> &[f64] {
        &self.lengths
    }

    /// Per-axis periodicity flags.
    pub fn periodicity(&self) -> &[bool] {
        &self.periodic
    }

    /// Whether at least one axis wraps.
    pub fn any_periodic(&self) -> bool {
        self.periodic.iter().any(|&p| p)
    }

    /// Wrap periodic axes into `[0, L)`; reject out-of-range bounded axes
    /// and non-finite components.
    pub fn normalize(&self, point: &Point) -> Result<Point, SpaceError> {
        if point.len() != self.ndim() {
            return Err(SpaceError::DimensionMismatch {
                expected: self.ndim(),
                got: point.len(),
            });
        }
        let mut out = Point::with_capacity(point.len());
        for (axis, &v) in point.iter().enumerate() {
            let len = self.lengths[axis];
            let ok = if !v.is_finite() {
                None
            } else if (0.0..len).contains(&v) {
                Some(v)
            } else if self.periodic[axis] {
                // rem_euclid can round up to exactly `len` for tiny negatives.
                let w = v.rem_euclid(len);
                Some(if w >= len { 0.0 } else { w })
            } else {
                None
            };
            match ok {
                Some(v) => out.push(v),
                None => {
                    return Err(SpaceError::PointOutOfBounds {
                        point: point.clone(),
                        bounds: self
                            .lengths
                            .iter()
                            .map(|l| format!("[0, {l})"))
                            .collect::<Vec<_>>()
                            .join(" x "),
                    })
                }
            }
        }
        Ok(out)
    }

    /// Distance between two normalized positions under `metric`.
    pub fn distance(&self, a: &[f64], b: &[f64], metric: Metric) -> f64 {
        metric.combine(
            a.iter()
                .zip(b.iter())
                .enumerate()
                .map(|(axis, (&x, &y))| {
                    axis_delta_f64(x, y, self.lengths[axis], self.periodic[axis])
                }),
        )
    }

    /// Position reached by displacing `pos` by `delta`: periodic axes
    /// wrap, bounded axes stop just inside the wall.
    pub fn displace(&self, pos: &[f64], delta: &[f64]) -> Point {
        pos.iter()
            .zip(delta.iter())
            .enumerate()
            .map(|(axis, (&p, &d))| {
                let len = self.lengths[axis];
                let v = p + d;
                if self.periodic[axis] {
                    let w = v.rem_euclid(len);
                    if w >= len {
                        0.0
                    } else {
                        w
                    }
                } else {
                    v.clamp(0.0, len.next_down())
                }
            })
            .collect()
    }

    /// Shortest signed displacement from `from` to `to`.
    pub fn direction(&self, from: &[f64], to: &[f64]) -> Point {
        from.iter()
            .zip(to.iter())
            .enumerate()
            .map(|(axis, (&f, &t))| {
                axis_direction_f64(f, t, self.lengths[axis], self.periodic[axis])
            })
            .collect()
    }
}
