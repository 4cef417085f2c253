//! Step costs and distance heuristics.

use thicket_space::metric::axis_delta;
use thicket_space::GridExtent;

/// How a move is priced and how remaining distance is estimated.
///
/// Each variant prices a unit move (every axis changing by at most one)
/// with the same norm it uses as heuristic, so the heuristic is
/// consistent on an unpenalized grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CostMetric {
    /// Euclidean: a move along `k` axes costs `sqrt(k)`.
    #[default]
    Direct,
    /// Chebyshev: every move costs 1.
    MaxDistance,
    /// Manhattan: a move along `k` axes costs `k`.
    Manhattan,
}

impl CostMetric {
    /// Cost of a unit move that changes `axes` coordinates.
    pub fn step_cost(self, axes: usize) -> f64 {
        match self {
            Self::Direct => (axes as f64).sqrt(),
            Self::MaxDistance => 1.0,
            Self::Manhattan => axes as f64,
        }
    }

    /// Estimated cost between two normalized cells, honouring wrap.
    pub fn estimate(self, extent: &GridExtent, a: &[i32], b: &[i32]) -> f64 {
        let deltas = wrapped_deltas(extent, a, b);
        match self {
            Self::Direct => deltas.map(|d| d * d).sum::<f64>().sqrt(),
            Self::MaxDistance => deltas.fold(0.0, f64::max),
            Self::Manhattan => deltas.sum(),
        }
    }
}

/// Fewest unit moves between two cells ignoring walls.
pub(crate) fn min_steps(extent: &GridExtent, a: &[i32], b: &[i32], diagonal: bool) -> f64 {
    let deltas = wrapped_deltas(extent, a, b);
    if diagonal {
        deltas.fold(0.0, f64::max)
    } else {
        deltas.sum()
    }
}

fn wrapped_deltas<'a>(
    extent: &'a GridExtent,
    a: &'a [i32],
    b: &'a [i32],
) -> impl Iterator<Item = f64> + 'a {
    a.iter().zip(b).enumerate().map(|(axis, (&x, &y))| {
        f64::from(axis_delta(
            x,
            y,
            extent.dims()[axis],
            extent.is_periodic(axis),
        ))
    })
}
