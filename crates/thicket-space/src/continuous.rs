//! Bucketed index over a continuous D-dimensional box.
//!
//! Positions are hashed into a uniform lattice of buckets. A radius query
//! visits the buckets within `ceil(r / w)` of the query's bucket on each
//! axis and filters by exact distance, so cost grows with `(r / w)^D`:
//! pick the bucket size close to the radius you query with most.

use crate::cursor::NearbyCursor;
use crate::error::SpaceError;
use crate::extent::{ContinuousExtent, GridExtent};
use crate::grid::{self, CellWalk};
use crate::metric::Metric;
use crate::space::{Space, SpaceKind};
use indexmap::IndexMap;
use rand::Rng;
use smallvec::SmallVec;
use thicket_core::{AgentId, Coord, Point};

/// Query radius to bucket width ratio beyond which a query is logged as
/// expensive.
const WIDE_QUERY_RATIO: f64 = 4.0;

type Bucket = SmallVec<[AgentId; 4]>;

/// Continuous space with a bucket index for radius queries.
///
/// Bounded axes get `ceil(L / b)` buckets of width `b`. Periodic axes get
/// `max(1, floor(L / b))` buckets of width `L / n`, so every bucket is
/// at least `b` wide and the seam is a bucket boundary.
///
/// # Examples
///
/// ```
/// use thicket_space::{ContinuousExtent, ContinuousSpace, Metric, Space};
/// use thicket_core::AgentId;
/// use smallvec::smallvec;
///
/// let extent = ContinuousExtent::new(&[10.0, 10.0], &[true]).unwrap();
/// let mut space = ContinuousSpace::new(extent, 1.0, Metric::Euclidean).unwrap();
/// space.insert(AgentId(1), &smallvec![0.2, 0.2]).unwrap();
/// space.insert(AgentId(2), &smallvec![9.8, 9.9]).unwrap();
///
/// let near: Vec<_> = space.nearby_ids(&smallvec![0.2, 0.2], 0.6).collect();
/// assert_eq!(near.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct ContinuousSpace {
    extent: ContinuousExtent,
    metric: Metric,
    bucket_size: f64,
    lattice: GridExtent,
    widths: SmallVec<[f64; 4]>,
    buckets: Vec<Bucket>,
    positions: IndexMap<AgentId, Point>,
}

impl ContinuousSpace {
    /// Create an empty space over `extent` with buckets of nominal size
    /// `bucket_size`.
    ///
    /// Returns `Err(SpaceError::InvalidBucketSize)` unless `bucket_size`
    /// is finite and positive, and propagates lattice errors when the
    /// bucket count per axis is too large.
    pub fn new(
        extent: ContinuousExtent,
        bucket_size: f64,
        metric: Metric,
    ) -> Result<Self, SpaceError> {
        if !bucket_size.is_finite() || bucket_size <= 0.0 {
            return Err(SpaceError::InvalidBucketSize { value: bucket_size });
        }
        let mut counts: SmallVec<[u32; 4]> = SmallVec::with_capacity(extent.ndim());
        let mut widths: SmallVec<[f64; 4]> = SmallVec::with_capacity(extent.ndim());
        for (&len, &periodic) in extent.lengths().iter().zip(extent.periodicity()) {
            let raw = len / bucket_size;
            let n = if periodic { raw.floor() } else { raw.ceil() };
            let n = n.clamp(1.0, f64::from(u32::MAX)) as u32;
            counts.push(n);
            widths.push(if periodic { len / f64::from(n) } else { bucket_size });
        }
        let lattice = GridExtent::new(&counts, extent.periodicity())?;
        tracing::debug!(
            lengths = ?extent.lengths(),
            periodic = ?extent.periodicity(),
            bucket_size,
            buckets = ?counts,
            ?metric,
            "created continuous space"
        );
        let buckets = vec![Bucket::new(); lattice.cell_count()];
        Ok(Self {
            extent,
            metric,
            bucket_size,
            lattice,
            widths,
            buckets,
            positions: IndexMap::new(),
        })
    }

    /// The continuous extent.
    pub fn extent(&self) -> &ContinuousExtent {
        &self.extent
    }

    /// Nominal bucket size passed at construction.
    pub fn bucket_size(&self) -> f64 {
        self.bucket_size
    }

    /// Actual per-axis bucket widths.
    pub fn bucket_widths(&self) -> &[f64] {
        &self.widths
    }

    /// Number of buckets along each axis.
    pub fn bucket_dims(&self) -> &[u32] {
        self.lattice.dims()
    }

    /// 1-based lattice coordinate of the bucket holding a normalized point.
    fn bucket_coord(&self, point: &[f64]) -> Coord {
        point
            .iter()
            .zip(self.widths.iter())
            .zip(self.lattice.dims())
            .map(|((&x, &w), &n)| {
                let i = (x / w).floor() as i64;
                i.clamp(0, i64::from(n) - 1) as i32 + 1
            })
            .collect()
    }

    fn bucket_index(&self, point: &[f64]) -> usize {
        self.lattice
            .linear_index(&self.bucket_coord(point))
            .expect("bucket coordinates are clamped into the lattice")
    }

    /// Buckets that can hold a point within `radius` of `center`.
    fn candidate_buckets(&self, center: &Point, radius: f64) -> CellWalk<'_> {
        let half: SmallVec<[u32; 4]> = if radius.is_nan() || radius < 0.0 {
            SmallVec::new()
        } else {
            self.widths
                .iter()
                .zip(self.lattice.dims())
                .map(|(&w, &n)| {
                    let k = (radius / w).ceil().min(f64::from(n - 1));
                    k as u32
                })
                .collect()
        };
        if radius > WIDE_QUERY_RATIO * self.bucket_size {
            tracing::debug!(
                radius,
                bucket_size = self.bucket_size,
                "radius query spans many buckets"
            );
        }
        let offsets = if half.is_empty() {
            Vec::new()
        } else {
            grid::box_offsets(&half)
        };
        CellWalk::new(&self.lattice, self.bucket_coord(center), offsets, &half, true)
    }

    fn detach(&mut self, id: AgentId, index: usize) {
        let bucket = &mut self.buckets[index];
        let before = bucket.len();
        bucket.retain(|other| *other != id);
        assert_eq!(
            bucket.len() + 1,
            before,
            "bucket index corrupted: {id} missing from its recorded bucket"
        );
    }
}

impl Space for ContinuousSpace {
    type Position = Point;

    fn kind(&self) -> SpaceKind {
        if self.extent.any_periodic() {
            SpaceKind::ContinuousPeriodic
        } else {
            SpaceKind::ContinuousBounded
        }
    }

    fn ndim(&self) -> usize {
        self.extent.ndim()
    }

    fn spacesize(&self) -> Point {
        Point::from_slice(self.extent.lengths())
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn position_of(&self, id: AgentId) -> Option<&Point> {
        self.positions.get(&id)
    }

    fn ids(&self) -> Box<dyn Iterator<Item = AgentId> + '_> {
        Box::new(self.positions.keys().copied())
    }

    fn normalize(&self, pos: &Point) -> Result<Point, SpaceError> {
        self.extent.normalize(pos)
    }

    fn distance(&self, a: &Point, b: &Point) -> f64 {
        self.extent.distance(a, b, self.metric)
    }

    fn direction(&self, from: &Point, to: &Point) -> Point {
        self.extent.direction(from, to)
    }

    fn displace(&self, pos: &Point, delta: &Point) -> Point {
        self.extent.displace(pos, delta)
    }

    fn insert(&mut self, id: AgentId, pos: &Point) -> Result<Point, SpaceError> {
        if self.positions.contains_key(&id) {
            return Err(SpaceError::DuplicateAgent { id });
        }
        let pos = self.extent.normalize(pos)?;
        let index = self.bucket_index(&pos);
        self.buckets[index].push(id);
        self.positions.insert(id, pos.clone());
        Ok(pos)
    }

    fn remove(&mut self, id: AgentId) -> Option<Point> {
        let pos = self.positions.swap_remove(&id)?;
        let index = self.bucket_index(&pos);
        self.detach(id, index);
        Some(pos)
    }

    fn relocate(&mut self, id: AgentId, from: &Point, to: &Point) -> Result<Point, SpaceError> {
        let to = self.extent.normalize(to)?;
        let current = self
            .positions
            .get(&id)
            .ok_or(SpaceError::UnknownAgent { id })?;
        assert_eq!(
            current, from,
            "cached position of {id} diverged from the bucket index"
        );
        let from_index = self.bucket_index(current);
        let to_index = self.bucket_index(&to);
        if from_index != to_index {
            self.detach(id, from_index);
            self.buckets[to_index].push(id);
        }
        self.positions.insert(id, to.clone());
        Ok(to)
    }

    fn ids_in_position(&self, pos: &Point) -> Box<dyn Iterator<Item = AgentId> + '_> {
        let Ok(pos) = self.extent.normalize(pos) else {
            return Box::new(std::iter::empty());
        };
        let index = self.bucket_index(&pos);
        Box::new(
            self.buckets[index]
                .iter()
                .copied()
                .filter(move |id| self.positions[id] == pos),
        )
    }

    fn nearby_ids(&self, pos: &Point, radius: f64) -> Box<dyn Iterator<Item = AgentId> + '_> {
        let Ok(center) = self.extent.normalize(pos) else {
            return Box::new(std::iter::empty());
        };
        let walk = self.candidate_buckets(&center, radius);
        Box::new(
            walk.flat_map(move |(index, _)| self.buckets[index].iter().copied())
                .filter(move |id| {
                    self.extent.distance(&center, &self.positions[id], self.metric) <= radius
                }),
        )
    }

    fn cursor(&self, pos: &Point, radius: f64) -> NearbyCursor<Point> {
        match self.extent.normalize(pos) {
            Ok(center) => {
                let cells = self
                    .candidate_buckets(&center, radius)
                    .map(|(index, _)| index)
                    .collect();
                NearbyCursor::new(cells, center, radius, true)
            }
            Err(_) => NearbyCursor::new(Vec::new(), pos.clone(), radius, true),
        }
    }

    fn cell_occupant(&self, cell: usize, slot: usize) -> Option<AgentId> {
        self.buckets.get(cell)?.get(slot).copied()
    }

    fn nearest_neighbor(
        &self,
        pos: &Point,
        exclude: Option<AgentId>,
        max_radius: Option<f64>,
    ) -> Option<AgentId> {
        let center = self.extent.normalize(pos).ok()?;
        if self.positions.is_empty() {
            return None;
        }
        let min_width = self.widths.iter().copied().fold(f64::INFINITY, f64::min);
        let bucket = self.bucket_coord(&center);
        grid::expanding_search(
            &self.lattice,
            &bucket,
            max_radius,
            |k| f64::from(k) * min_width,
            |index, best| {
                for &id in &self.buckets[index] {
                    if Some(id) == exclude {
                        continue;
                    }
                    let d = self.extent.distance(&center, &self.positions[&id], self.metric);
                    if max_radius.is_some_and(|m| d > m) {
                        continue;
                    }
                    grid::offer(best, d, id);
                }
            },
        )
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        self.extent
            .lengths()
            .iter()
            .map(|&len| rng.random_range(0.0..len))
            .collect()
    }
}
