//! Reusable agent fixtures.
//!
//! - [`GridAgent`]: a grid dweller with a group label, for segregation
//!   style models.
//! - [`Particle`]: a continuous-space agent with a velocity.
//! - [`Animal`]: a closed sum over two grid species sharing one
//!   population.

use thicket_core::{Agent, AgentId, Coord, Kinematic, Point};

/// Grid agent with a group label and a happiness flag.
#[derive(Clone, Debug, PartialEq)]
pub struct GridAgent {
    pub id: AgentId,
    pub pos: Coord,
    pub group: u8,
    pub happy: bool,
}

impl GridAgent {
    pub fn new(id: u64, pos: Coord, group: u8) -> Self {
        Self {
            id: AgentId(id),
            pos,
            group,
            happy: false,
        }
    }
}

impl Agent for GridAgent {
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

/// Continuous agent moving with constant velocity until told otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub id: AgentId,
    pub pos: Point,
    pub vel: Point,
}

impl Particle {
    pub fn new(id: u64, pos: Point, vel: Point) -> Self {
        Self {
            id: AgentId(id),
            pos,
            vel,
        }
    }
}

impl Agent for Particle {
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

impl Kinematic for Particle {
    fn vel(&self) -> &Point {
        &self.vel
    }
}

/// Prey species.
#[derive(Clone, Debug, PartialEq)]
pub struct Sheep {
    pub id: AgentId,
    pub pos: Coord,
    pub energy: f64,
}

/// Predator species.
#[derive(Clone, Debug, PartialEq)]
pub struct Wolf {
    pub id: AgentId,
    pub pos: Coord,
    pub energy: f64,
}

/// Two species in one population. Index code sees only [`Agent`].
#[derive(Clone, Debug, PartialEq)]
pub enum Animal {
    Sheep(Sheep),
    Wolf(Wolf),
}

impl Animal {
    pub fn sheep(id: u64, pos: Coord, energy: f64) -> Self {
        Self::Sheep(Sheep {
            id: AgentId(id),
            pos,
            energy,
        })
    }

    pub fn wolf(id: u64, pos: Coord, energy: f64) -> Self {
        Self::Wolf(Wolf {
            id: AgentId(id),
            pos,
            energy,
        })
    }

    pub fn is_wolf(&self) -> bool {
        matches!(self, Self::Wolf(_))
    }

    pub fn energy(&self) -> f64 {
        match self {
            Self::Sheep(s) => s.energy,
            Self::Wolf(w) => w.energy,
        }
    }
}

impl Agent for Animal {
    type Pos = Coord;

    fn id(&self) -> AgentId {
        match self {
            Self::Sheep(s) => s.id,
            Self::Wolf(w) => w.id,
        }
    }

    fn pos(&self) -> &Coord {
        match self {
            Self::Sheep(s) => &s.pos,
            Self::Wolf(w) => &w.pos,
        }
    }

    fn set_pos(&mut self, pos: Coord) {
        match self {
            Self::Sheep(s) => s.pos = pos,
            Self::Wolf(w) => w.pos = pos,
        }
    }
}
