//! Benchmark profiles and utilities for the Thicket framework.
//!
//! Provides pre-built models for benchmarking and examples:
//!
//! - [`schelling_profile`]: single-occupancy grid, two groups, segregation sweep
//! - [`flocking_profile`]: periodic continuous space with velocity-aligning birds
//! - [`maze_pathfinder`]: grid pathfinder with randomly blocked cells

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thicket_core::{Agent, AgentId, Coord, Kinematic, Point};
use thicket_model::{ConfigError, ContinuousConfig, GridConfig, Model, ModelConfig};
use thicket_path::{PathConfig, Pathfinder, WalkMask};
use thicket_space::{ContinuousSpace, GridSpaceSingle, Metric};

// ── Schelling ───────────────────────────────────────────────────

/// A resident of the segregation model.
#[derive(Clone, Debug)]
pub struct Resident {
    /// Identifier.
    pub id: AgentId,
    /// Cached cell.
    pub pos: Coord,
    /// Group label, 0 or 1.
    pub group: u8,
    /// Whether enough neighbours share the group.
    pub happy: bool,
}

impl Agent for Resident {
    type Pos = Coord;

    fn id(&self) -> AgentId {
        self.id
    }

    fn pos(&self) -> &Coord {
        &self.pos
    }

    fn set_pos(&mut self, pos: Coord) {
        self.pos = pos;
    }
}

/// Build a `side`×`side` bounded segregation model filled to `density`.
///
/// Residents are placed on random empty cells, alternating groups.
///
/// # Errors
///
/// Returns `Err` if `side` is zero.
pub fn schelling_profile(
    seed: u64,
    side: u32,
    density: f64,
) -> Result<Model<Resident, GridSpaceSingle>, ConfigError> {
    let config = GridConfig {
        dims: vec![side, side],
        periodic: vec![false],
        metric: Metric::Chebyshev,
    };
    let space = config.build_single()?;
    let mut model = Model::new(space, &ModelConfig { seed });
    let n = (f64::from(side * side) * density).round() as u64;
    for i in 0..n {
        let id = model.next_id();
        let resident = Resident {
            id,
            pos: Coord::new(),
            group: (i % 2) as u8,
            happy: false,
        };
        let placed = model
            .add_agent_single(resident)
            .expect("next_id is never already in the model");
        if placed.is_none() {
            break;
        }
    }
    Ok(model)
}

/// One segregation sweep: each unhappy resident jumps to a random empty
/// cell. Returns how many moved.
pub fn schelling_sweep(model: &mut Model<Resident, GridSpaceSingle>, min_same: usize) -> usize {
    let ids: Vec<AgentId> = model.ids().collect();
    let mut moved = 0;
    for id in ids {
        let Some(group) = model.agent(id).map(|r| r.group) else {
            continue;
        };
        let same = model
            .nearby_agents(id, 1.0)
            .expect("id was just read from the model")
            .filter(|r| r.group == group)
            .count();
        let happy = same >= min_same;
        if let Some(r) = model.agent_mut(id) {
            r.happy = happy;
        }
        let moved_to = if happy {
            None
        } else {
            model
                .move_agent_single(id)
                .expect("id was just read from the model")
        };
        if moved_to.is_some() {
            moved += 1;
        }
    }
    moved
}

// ── Flocking ────────────────────────────────────────────────────

/// A bird with constant speed whose heading follows its neighbours.
#[derive(Clone, Debug)]
pub struct Bird {
    /// Identifier.
    pub id: AgentId,
    /// Cached position.
    pub pos: Point,
    /// Velocity.
    pub vel: Point,
}

impl Agent for Bird {
    type Pos = Point;

    fn id(&self) -> AgentId {
        self.id
    }

    fn pos(&self) -> &Point {
        &self.pos
    }

    fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
    }
}

impl Kinematic for Bird {
    fn vel(&self) -> &Point {
        &self.vel
    }
}

/// Build a periodic 100×100 flocking model with `n` birds.
///
/// The bucket size equals `vision`, the radius [`flocking_step`] queries
/// with.
///
/// # Errors
///
/// Returns `Err` if `vision` is not a valid bucket size.
pub fn flocking_profile(
    seed: u64,
    n: usize,
    vision: f64,
) -> Result<Model<Bird, ContinuousSpace>, ConfigError> {
    let config = ContinuousConfig {
        extent: vec![100.0, 100.0],
        periodic: vec![true],
        bucket_size: vision,
        metric: Metric::Euclidean,
    };
    let mut model = Model::new(config.build()?, &ModelConfig { seed });
    for _ in 0..n {
        let id = model.next_id();
        let angle = model.rng().random_range(0.0..std::f64::consts::TAU);
        let bird = Bird {
            id,
            pos: Point::new(),
            vel: [angle.cos(), angle.sin()].into_iter().collect(),
        };
        model
            .add_agent(bird)
            .expect("fresh id at a position drawn from the space");
    }
    Ok(model)
}

/// One flocking step: every bird aligns its heading with the mean of its
/// neighbours within `vision`, then moves by its velocity.
pub fn flocking_step(model: &mut Model<Bird, ContinuousSpace>, vision: f64, dt: f64) {
    let ids: Vec<AgentId> = model.ids().collect();
    for &id in &ids {
        let mut sum = [0.0f64; 2];
        let mut count = 0usize;
        let neighbours = model
            .nearby_agents(id, vision)
            .expect("ids are collected before any removal");
        for other in neighbours {
            sum[0] += other.vel[0];
            sum[1] += other.vel[1];
            count += 1;
        }
        if count == 0 {
            continue;
        }
        let norm = (sum[0] * sum[0] + sum[1] * sum[1]).sqrt();
        if norm > 0.0 {
            if let Some(bird) = model.agent_mut(id) {
                bird.vel = [sum[0] / norm, sum[1] / norm].into_iter().collect();
            }
        }
    }
    for &id in &ids {
        model
            .move_by_velocity(id, dt)
            .expect("bird ids come from the model and walking never leaves the space");
    }
}

// ── Pathfinding ─────────────────────────────────────────────────

/// A `side`×`side` bounded pathfinder with a fraction `blocked` of cells
/// made unwalkable at random. The corners `(1, 1)` and `(side, side)`
/// stay walkable.
///
/// # Errors
///
/// Returns `Err` if `side` is zero or `admissibility` is negative or not
/// finite.
pub fn maze_pathfinder(
    seed: u64,
    side: u32,
    blocked: f64,
    admissibility: f64,
) -> Result<Pathfinder, ConfigError> {
    let config = GridConfig {
        dims: vec![side, side],
        periodic: vec![false],
        metric: Metric::Chebyshev,
    };
    let extent = config.extent()?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let corner = side as i32;
    let mask = WalkMask::from_fn(&extent, |c| {
        let end = (c[0] == 1 && c[1] == 1) || (c[0] == corner && c[1] == corner);
        end || rng.random::<f64>() >= blocked
    });
    let path = PathConfig {
        admissibility,
        walkable: Some(mask),
        ..PathConfig::default()
    };
    config.pathfinder(path)
}
