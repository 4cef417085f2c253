//! Shared lattice helpers for the grid and bucket indices.

use crate::extent::GridExtent;
use crate::metric::Metric;
use smallvec::SmallVec;
use rand::Rng;
use std::collections::HashSet;
use thicket_core::{AgentId, Coord};

/// A raw integer displacement, one entry per axis.
pub(crate) type Offset = SmallVec<[i32; 4]>;

/// All offsets in the axis-aligned box `[-half[d], half[d]]`, in odometer
/// order (last axis fastest).
pub(crate) fn box_offsets(half: &[u32]) -> Vec<Offset> {
    let ndim = half.len();
    let total: usize = half.iter().map(|&h| 2 * h as usize + 1).product();
    let mut out = Vec::with_capacity(total);
    let mut cur: Offset = half.iter().map(|&h| -(h as i32)).collect();
    loop {
        out.push(cur.clone());
        let mut axis = ndim;
        loop {
            if axis == 0 {
                return out;
            }
            axis -= 1;
            if cur[axis] < half[axis] as i32 {
                cur[axis] += 1;
                break;
            }
            cur[axis] = -(half[axis] as i32);
        }
    }
}

/// Offsets of the metric ball of `radius`, inside the box `half`.
pub(crate) fn ball_offsets(half: &[u32], radius: f64, metric: Metric) -> Vec<Offset> {
    if radius.is_nan() || radius < 0.0 {
        return Vec::new();
    }
    box_offsets(half)
        .into_iter()
        .filter(|o| metric.offset_within(o, radius))
        .collect()
}

/// Per-axis half-widths covering `radius` on `extent`.
///
/// Offsets of `dims[d]` or more never reach a new cell: they fall off a
/// bounded axis or wrap onto a shorter offset, so each half-width is
/// clamped to `dims[d] - 1`.
pub(crate) fn clamped_half(extent: &GridExtent, reach: f64) -> SmallVec<[u32; 4]> {
    let k = if reach.is_nan() || reach < 0.0 {
        0
    } else {
        reach.floor().min(f64::from(u32::MAX)) as u32
    };
    extent.dims().iter().map(|&d| k.min(d - 1)).collect()
}

/// Offsets whose Chebyshev norm is exactly `k`.
///
/// Built shell-first rather than by filtering the full box: the first
/// axis `i` with `|δ_i| = k` is pinned to `±k`, earlier axes range over
/// `[-(k-1), k-1]`, later axes over `[-k, k]`. Each shell offset is
/// produced exactly once.
pub(crate) fn ring_offsets(ndim: usize, k: u32) -> Vec<Offset> {
    if k == 0 {
        return vec![SmallVec::from_elem(0, ndim)];
    }
    let mut out = Vec::new();
    for i in 0..ndim {
        let half: SmallVec<[u32; 4]> = (0..ndim)
            .map(|a| match a.cmp(&i) {
                std::cmp::Ordering::Less => k - 1,
                std::cmp::Ordering::Equal => 0,
                std::cmp::Ordering::Greater => k,
            })
            .collect();
        for base in box_offsets(&half) {
            for sign in [-1, 1] {
                let mut o = base.clone();
                o[i] = sign * k as i32;
                out.push(o);
            }
        }
    }
    out
}

/// Apply `offset` to `center`, wrapping or rejecting per axis.
pub(crate) fn shift(extent: &GridExtent, center: &[i32], offset: &[i32]) -> Option<Coord> {
    center
        .iter()
        .zip(offset.iter())
        .enumerate()
        .map(|(axis, (&c, &o))| extent.resolve_axis(axis, c + o))
        .collect()
}

/// Whether wrapping can map two offsets of the box onto the same cell.
fn needs_dedup(extent: &GridExtent, half: &[u32]) -> bool {
    extent
        .dims()
        .iter()
        .zip(half.iter())
        .enumerate()
        .any(|(axis, (&d, &h))| extent.is_periodic(axis) && 2 * u64::from(h) + 1 > u64::from(d))
}

/// Lazy walk over the valid cells reached by a set of offsets.
///
/// Yields `(flat_index, coord)`. Cells that fall off a bounded axis are
/// skipped; duplicates introduced by wrapping on a small periodic extent
/// are suppressed; the center cell is yielded only when `include_center`
/// is set (and then exactly once).
pub(crate) struct CellWalk<'a> {
    extent: &'a GridExtent,
    center: Coord,
    center_index: Option<usize>,
    offsets: std::vec::IntoIter<Offset>,
    include_center: bool,
    seen: Option<HashSet<usize>>,
}

impl<'a> CellWalk<'a> {
    pub(crate) fn new(
        extent: &'a GridExtent,
        center: Coord,
        offsets: Vec<Offset>,
        half: &[u32],
        include_center: bool,
    ) -> Self {
        let center_index = extent.linear_index(&center);
        let seen = needs_dedup(extent, half).then(HashSet::new);
        Self {
            extent,
            center,
            center_index,
            offsets: offsets.into_iter(),
            include_center,
            seen,
        }
    }

    /// Walk the metric ball of `radius` around `center`.
    pub(crate) fn ball(
        extent: &'a GridExtent,
        center: Coord,
        radius: f64,
        metric: Metric,
        include_center: bool,
    ) -> Self {
        let half = clamped_half(extent, radius);
        let offsets = ball_offsets(&half, radius, metric);
        Self::new(extent, center, offsets, &half, include_center)
    }
}

impl Iterator for CellWalk<'_> {
    type Item = (usize, Coord);

    fn next(&mut self) -> Option<Self::Item> {
        for offset in self.offsets.by_ref() {
            let Some(coord) = shift(self.extent, &self.center, &offset) else {
                continue;
            };
            let Some(index) = self.extent.linear_index(&coord) else {
                continue;
            };
            if !self.include_center && Some(index) == self.center_index {
                continue;
            }
            if let Some(seen) = self.seen.as_mut() {
                if !seen.insert(index) {
                    continue;
                }
            }
            return Some((index, coord));
        }
        None
    }
}

/// Flat indices of the cells on Chebyshev ring `k` around `center`, minus
/// any already in `visited` (which is updated).
pub(crate) fn ring_cells(
    extent: &GridExtent,
    center: &[i32],
    k: u32,
    visited: &mut HashSet<usize>,
) -> Vec<usize> {
    let mut out = Vec::new();
    for offset in ring_offsets(extent.ndim(), k) {
        let Some(coord) = shift(extent, center, &offset) else {
            continue;
        };
        if let Some(index) = extent.linear_index(&coord) {
            if visited.insert(index) {
                out.push(index);
            }
        }
    }
    out
}

/// Best candidate so far in an expanding-ring search: `(distance, id)`.
pub(crate) type Best = Option<(f64, AgentId)>;

/// Expanding-ring nearest-neighbour search over a lattice of storage cells.
///
/// Visits Chebyshev rings `0, 1, 2, ...` around `center`, calling `scan`
/// on each newly reached cell. After ring `k`, `bound(k)` must be a lower
/// bound on the distance from the query point to anything in ring
/// `k + 1` or beyond; the search stops once the best candidate is no
/// farther than that bound, once the bound exceeds `max_radius`, or once
/// every cell has been visited.
pub(crate) fn expanding_search<S, B>(
    extent: &GridExtent,
    center: &[i32],
    max_radius: Option<f64>,
    bound: B,
    mut scan: S,
) -> Option<AgentId>
where
    S: FnMut(usize, &mut Best),
    B: Fn(u32) -> f64,
{
    let mut best: Best = None;
    let mut visited = HashSet::new();
    let max_ring = extent.dims().iter().copied().max().unwrap_or(0);
    for k in 0..=max_ring {
        for cell in ring_cells(extent, center, k, &mut visited) {
            scan(cell, &mut best);
        }
        let next = bound(k);
        if best.is_some_and(|(d, _)| d <= next) {
            break;
        }
        if max_radius.is_some_and(|m| next > m) {
            break;
        }
        if visited.len() == extent.cell_count() {
            break;
        }
    }
    best.map(|(_, id)| id)
}

/// Offer `id` at distance `d` to the running best, keeping the earlier
/// candidate on ties.
pub(crate) fn offer(best: &mut Best, d: f64, id: AgentId) {
    if best.map_or(true, |(bd, _)| d < bd) {
        *best = Some((d, id));
    }
}

/// Uniformly random coordinate on `extent`.
pub(crate) fn random_coord<R: Rng + ?Sized>(extent: &GridExtent, rng: &mut R) -> Coord {
    extent
        .dims()
        .iter()
        .map(|&d| rng.random_range(1..=d as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_offsets_counts() {
        assert_eq!(box_offsets(&[1, 1]).len(), 9);
        assert_eq!(box_offsets(&[2, 0, 1]).len(), 15);
        assert_eq!(box_offsets(&[0]).len(), 1);
    }

    #[test]
    fn ball_offsets_per_metric() {
        assert_eq!(ball_offsets(&[1, 1], 1.0, Metric::Chebyshev).len(), 9);
        assert_eq!(ball_offsets(&[1, 1], 1.0, Metric::Manhattan).len(), 5);
        assert_eq!(ball_offsets(&[1, 1], 1.0, Metric::Euclidean).len(), 5);
        assert_eq!(ball_offsets(&[2, 2], 2.0, Metric::Euclidean).len(), 13);
        assert!(ball_offsets(&[1, 1], -1.0, Metric::Chebyshev).is_empty());
    }

    #[test]
    fn ring_offsets_are_shells() {
        assert_eq!(ring_offsets(2, 0).len(), 1);
        assert_eq!(ring_offsets(2, 1).len(), 8);
        assert_eq!(ring_offsets(2, 2).len(), 16);
        assert_eq!(ring_offsets(3, 1).len(), 26);
        let shell = ring_offsets(3, 2);
        let unique: HashSet<Offset> = shell.iter().cloned().collect();
        assert_eq!(unique.len(), shell.len());
        assert_eq!(shell.len(), 125 - 27);
    }

    #[test]
    fn cell_walk_suppresses_wrap_duplicates() {
        // 3-wide torus, radius 2: the 5x5 box folds onto the 3x3 grid.
        let e = GridExtent::new(&[3, 3], &[true]).unwrap();
        let center: Coord = [2, 2].into_iter().collect();
        let cells: Vec<_> = CellWalk::ball(&e, center, 2.0, Metric::Chebyshev, false).collect();
        assert_eq!(cells.len(), 8);
        let unique: HashSet<usize> = cells.iter().map(|(i, _)| *i).collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn clamped_half_caps_huge_radius() {
        let e = GridExtent::new(&[4, 7], &[false]).unwrap();
        assert_eq!(clamped_half(&e, 1e12).as_slice(), &[3, 6]);
        assert_eq!(clamped_half(&e, 1.5).as_slice(), &[1, 1]);
    }

    #[test]
    fn cell_walk_clips_bounded_axes() {
        let e = GridExtent::new(&[5, 5], &[false]).unwrap();
        let center: Coord = [1, 1].into_iter().collect();
        let cells: Vec<_> = CellWalk::ball(&e, center, 1.0, Metric::Chebyshev, false).collect();
        assert_eq!(cells.len(), 3);
    }
}
