//! Distance metrics and per-axis wrapped deltas.

/// How per-axis displacements combine into one distance.
///
/// All three metrics are periodicity-aware through the per-axis helpers
/// [`axis_delta`] and [`axis_delta_f64`]: on a wrapping axis the delta is
/// `min(direct, extent - direct)`, so it never exceeds `extent / 2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    /// L-inf: the largest per-axis delta. Matches 8-connected grid moves.
    #[default]
    Chebyshev,
    /// L2: square root of the summed squared deltas.
    Euclidean,
    /// L1: sum of per-axis deltas. Matches 4-connected grid moves.
    Manhattan,
}

impl Metric {
    /// Combine per-axis (already wrapped, non-negative) deltas.
    pub fn combine<I>(self, deltas: I) -> f64
    where
        I: IntoIterator<Item = f64>,
    {
        match self {
            Self::Chebyshev => deltas.into_iter().fold(0.0, f64::max),
            Self::Euclidean => deltas.into_iter().map(|d| d * d).sum::<f64>().sqrt(),
            Self::Manhattan => deltas.into_iter().sum(),
        }
    }

    /// Whether a raw integer offset lies within `radius` under this metric.
    ///
    /// Used to carve the metric ball out of the `(2⌊r⌋+1)^D` hyper-cube.
    pub fn offset_within(self, offset: &[i32], radius: f64) -> bool {
        match self {
            Self::Chebyshev => offset.iter().all(|&d| f64::from(d.abs()) <= radius),
            Self::Manhattan => {
                offset.iter().map(|&d| f64::from(d.abs())).sum::<f64>() <= radius
            }
            Self::Euclidean => {
                let sq: f64 = offset.iter().map(|&d| f64::from(d) * f64::from(d)).sum();
                sq <= radius * radius + 1e-9
            }
        }
    }
}

/// Absolute distance between `a` and `b` on one integer axis of `len` cells.
pub fn axis_delta(a: i32, b: i32, len: u32, periodic: bool) -> u32 {
    let diff = a.abs_diff(b);
    if periodic {
        let diff = diff % len;
        diff.min(len - diff)
    } else {
        diff
    }
}

/// Absolute distance between `a` and `b` on one real axis of length `len`.
pub fn axis_delta_f64(a: f64, b: f64, len: f64, periodic: bool) -> f64 {
    let diff = (a - b).abs();
    if periodic {
        let diff = diff.rem_euclid(len);
        diff.min(len - diff)
    } else {
        diff
    }
}

/// Shortest signed displacement from `from` to `to` on one integer axis.
pub fn axis_direction(from: i32, to: i32, len: u32, periodic: bool) -> i32 {
    let raw = to - from;
    if !periodic {
        return raw;
    }
    let n = len as i32;
    let wrapped = raw.rem_euclid(n);
    if wrapped * 2 > n {
        wrapped - n
    } else {
        wrapped
    }
}

/// Shortest signed displacement from `from` to `to` on one real axis.
pub fn axis_direction_f64(from: f64, to: f64, len: f64, periodic: bool) -> f64 {
    let raw = to - from;
    if !periodic {
        return raw;
    }
    let wrapped = raw.rem_euclid(len);
    if wrapped * 2.0 > len {
        wrapped - len
    } else {
        wrapped
    }
}
