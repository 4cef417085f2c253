//! The agent container and its binding to a spatial index.
//!
//! [`Model`] owns the agents, the space they live in, and the model RNG.
//! Every position change goes through the space first; the agent's own
//! position field is written only after the space has accepted it.
//!
//! # Ownership model
//!
//! All mutating methods take `&mut self`. Query iterators borrow the
//! model, so the borrow checker rules out adding, moving or removing
//! agents while one is alive. To mutate during a neighbour scan either
//! collect the IDs first or use a
//! [`NeighborCursor`](crate::NeighborCursor).

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thicket_core::{Agent, AgentId};
use thicket_space::Space;

use crate::config::ModelConfig;
use crate::error::ModelError;

// ── Model ───────────────────────────────────────────────────────

/// A population of agents of type `A` inside a space `S`.
///
/// Heterogeneous populations use a closed enum for `A` that implements
/// [`Agent`] by delegating to each variant.
///
/// Agents are stored in insertion order; removal swaps the last agent
/// into the freed slot, so iteration order is deterministic for a fixed
/// sequence of operations but not stable across removals.
#[derive(Clone, Debug)]
pub struct Model<A, S> {
    agents: IndexMap<AgentId, A>,
    space: S,
    rng: ChaCha8Rng,
    next_id: u64,
}

impl<A, S> Model<A, S> {
    /// The spatial index.
    pub fn space(&self) -> &S {
        &self.space
    }

    /// The model RNG.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// The spatial index and the RNG at once, for calls that need both.
    pub fn space_and_rng(&mut self) -> (&S, &mut ChaCha8Rng) {
        (&self.space, &mut self.rng)
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the model has no agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The agent with `id`, if present.
    pub fn agent(&self, id: AgentId) -> Option<&A> {
        self.agents.get(&id)
    }

    /// Mutable access to the agent with `id`.
    ///
    /// Use it for agent state only. Writing the position through
    /// [`Agent::set_pos`] here bypasses the index; the next move of that
    /// agent will then panic on the diverged cache.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut A> {
        self.agents.get_mut(&id)
    }

    /// Whether an agent with `id` is present.
    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// All agent IDs.
    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.keys().copied()
    }

    /// All agents.
    pub fn agents(&self) -> impl Iterator<Item = &A> + '_ {
        self.agents.values()
    }

    /// Hand out a fresh ID, greater than every ID seen so far.
    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn agent_or_err(&self, id: AgentId) -> Result<&A, ModelError> {
        self.agents.get(&id).ok_or(ModelError::UnknownAgent { id })
    }
}

impl<A, S> Model<A, S>
where
    S: Space,
    A: Agent<Pos = S::Position>,
{
    /// Create an empty model over `space`.
    ///
    /// # Panics
    ///
    /// Panics if `space` already indexes agents: they would have no
    /// matching entry in the model.
    pub fn new(space: S, config: &ModelConfig) -> Self {
        assert!(
            space.is_empty(),
            "a model must start from an empty space, found {} indexed agents",
            space.len()
        );
        tracing::debug!(kind = ?space.kind(), seed = config.seed, "created model");
        Self {
            agents: IndexMap::new(),
            space,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_id: 1,
        }
    }

    /// Authoritative position of `id`, read from the index.
    pub fn position(&self, id: AgentId) -> Option<&S::Position> {
        self.space.position_of(id)
    }

    /// Per-axis size of the space.
    pub fn spacesize(&self) -> S::Position {
        self.space.spacesize()
    }

    /// Distance between two positions under the space metric.
    pub fn distance(&self, a: &S::Position, b: &S::Position) -> f64 {
        self.space.distance(a, b)
    }

    /// Distance between two agents.
    pub fn agent_distance(&self, a: AgentId, b: AgentId) -> Result<f64, ModelError> {
        let pa = self.position_or_err(a)?;
        let pb = self.position_or_err(b)?;
        Ok(self.space.distance(pa, pb))
    }

    /// Shortest displacement from `from` to `to`, across the seam on
    /// periodic axes.
    pub fn get_direction(&self, from: &S::Position, to: &S::Position) -> S::Position {
        self.space.direction(from, to)
    }

    /// Add `agent` at the position it carries.
    ///
    /// The position is normalized and written back to the agent. On error
    /// the model is unchanged.
    pub fn add_agent_pos(&mut self, mut agent: A) -> Result<AgentId, ModelError> {
        let id = agent.id();
        let pos = self.space.insert(id, agent.pos())?;
        tracing::trace!(%id, ?pos, "added agent");
        agent.set_pos(pos);
        self.agents.insert(id, agent);
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        Ok(id)
    }

    /// Add `agent` at a uniformly random position.
    pub fn add_agent(&mut self, mut agent: A) -> Result<AgentId, ModelError> {
        agent.set_pos(self.space.random_position(&mut self.rng));
        self.add_agent_pos(agent)
    }

    /// Remove the agent with `id` and return it.
    pub fn remove_agent(&mut self, id: AgentId) -> Result<A, ModelError> {
        let agent = self
            .agents
            .swap_remove(&id)
            .ok_or(ModelError::UnknownAgent { id })?;
        let pos = self
            .space
            .remove(id)
            .unwrap_or_else(|| panic!("agent {id} was in the model but not in its space"));
        tracing::trace!(%id, ?pos, "removed agent");
        Ok(agent)
    }

    /// Remove every agent matching `pred`. Returns how many were removed.
    pub fn remove_all<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&A) -> bool,
    {
        let doomed: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|&(_, a)| pred(a))
            .map(|(&id, _)| id)
            .collect();
        for &id in &doomed {
            self.remove_agent(id)
                .unwrap_or_else(|_| panic!("agent {id} vanished during remove_all"));
        }
        doomed.len()
    }

    /// Move agent `id` to `to`. Returns the normalized destination.
    ///
    /// On error (out of bounds, occupied cell) the agent stays put.
    ///
    /// # Panics
    ///
    /// Panics if the agent's cached position no longer matches the index.
    pub fn move_agent(&mut self, id: AgentId, to: &S::Position) -> Result<S::Position, ModelError> {
        let agent = self
            .agents
            .get_mut(&id)
            .ok_or(ModelError::UnknownAgent { id })?;
        let pos = self.space.relocate(id, agent.pos(), to)?;
        tracing::trace!(%id, ?pos, "moved agent");
        agent.set_pos(pos.clone());
        Ok(pos)
    }

    /// Move agent `id` to a uniformly random position.
    pub fn move_agent_random(&mut self, id: AgentId) -> Result<S::Position, ModelError> {
        self.agent_or_err(id)?;
        let to = self.space.random_position(&mut self.rng);
        self.move_agent(id, &to)
    }

    /// Displace agent `id` by `delta`. Periodic axes wrap; on a bounded
    /// axis the agent stops at the wall.
    pub fn walk(&mut self, id: AgentId, delta: &S::Position) -> Result<S::Position, ModelError> {
        let from = self.position_or_err(id)?;
        let to = self.space.displace(from, delta);
        self.move_agent(id, &to)
    }

    pub(crate) fn position_or_err(&self, id: AgentId) -> Result<&S::Position, ModelError> {
        self.space
            .position_of(id)
            .ok_or(ModelError::UnknownAgent { id })
    }

    pub(crate) fn space_mut_and_rng(&mut self) -> (&mut S, &mut ChaCha8Rng) {
        (&mut self.space, &mut self.rng)
    }

    pub(crate) fn agents_mut(&mut self) -> &mut IndexMap<AgentId, A> {
        &mut self.agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use thicket_core::{Coord, Point};
    use thicket_space::{
        ContinuousExtent, ContinuousSpace, GridExtent, GridSpace, GridSpaceSingle, Metric,
        SpaceError,
    };

    #[derive(Clone, Debug, PartialEq)]
    struct Walker {
        id: AgentId,
        pos: Coord,
        tag: u8,
    }

    impl Agent for Walker {
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

    #[derive(Clone, Debug)]
    struct Drifter {
        id: AgentId,
        pos: Point,
    }

    impl Agent for Drifter {
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

    fn walker(id: u64, pos: &[i32]) -> Walker {
        Walker {
            id: AgentId(id),
            pos: pos.iter().copied().collect(),
            tag: 0,
        }
    }

    fn grid_model(dims: &[u32], periodic: bool) -> Model<Walker, GridSpace> {
        let extent = GridExtent::new(dims, &[periodic]).unwrap();
        Model::new(GridSpace::new(extent, Metric::Chebyshev), &ModelConfig::default())
    }

    // ── Adding and removing ─────────────────────────────────────

    #[test]
    fn add_agent_pos_normalizes_and_caches() {
        let mut m = grid_model(&[5, 5], true);
        m.add_agent_pos(walker(1, &[6, 0])).unwrap();
        let expected: Coord = smallvec![1, 5];
        assert_eq!(m.agent(AgentId(1)).unwrap().pos, expected);
        assert_eq!(m.position(AgentId(1)), Some(&expected));
    }

    #[test]
    fn add_out_of_bounds_leaves_model_unchanged() {
        let mut m = grid_model(&[5, 5], false);
        let err = m.add_agent_pos(walker(1, &[6, 1])).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Space(SpaceError::CoordOutOfBounds { .. })
        ));
        assert!(m.is_empty());
        assert!(m.space().is_empty());
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut m = grid_model(&[5, 5], false);
        m.add_agent_pos(walker(1, &[1, 1])).unwrap();
        assert!(matches!(
            m.add_agent_pos(walker(1, &[2, 2])),
            Err(ModelError::Space(SpaceError::DuplicateAgent { .. }))
        ));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn next_id_skips_past_explicit_ids() {
        let mut m = grid_model(&[5, 5], false);
        assert_eq!(m.next_id(), AgentId(1));
        m.add_agent_pos(walker(10, &[1, 1])).unwrap();
        assert_eq!(m.next_id(), AgentId(11));
    }

    #[test]
    fn add_agent_places_randomly_and_reproducibly() {
        let run = || {
            let mut m = grid_model(&[20, 20], false);
            for i in 1..=5 {
                m.add_agent(walker(i, &[1, 1])).unwrap();
            }
            m.agents().map(|a| a.pos.clone()).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn remove_agent_and_unknown() {
        let mut m = grid_model(&[5, 5], false);
        m.add_agent_pos(walker(1, &[2, 2])).unwrap();
        let a = m.remove_agent(AgentId(1)).unwrap();
        assert_eq!(a.id, AgentId(1));
        assert!(m.space().is_empty());
        assert_eq!(
            m.remove_agent(AgentId(1)),
            Err(ModelError::UnknownAgent { id: AgentId(1) })
        );
    }

    #[test]
    fn remove_all_by_predicate() {
        let mut m = grid_model(&[5, 5], false);
        for i in 1..=6 {
            let mut w = walker(i, &[1, 1]);
            w.tag = (i % 2) as u8;
            m.add_agent_pos(w).unwrap();
        }
        assert_eq!(m.remove_all(|a| a.tag == 1), 3);
        assert_eq!(m.len(), 3);
        assert_eq!(m.space().len(), 3);
        assert!(m.agents().all(|a| a.tag == 0));
    }

    // ── Moving ──────────────────────────────────────────────────

    #[test]
    fn move_agent_updates_index_and_cache() {
        let mut m = grid_model(&[5, 5], false);
        m.add_agent_pos(walker(1, &[1, 1])).unwrap();
        m.move_agent(AgentId(1), &smallvec![3, 4]).unwrap();
        let to: Coord = smallvec![3, 4];
        assert_eq!(m.agent(AgentId(1)).unwrap().pos, to);
        assert_eq!(m.space().position_of(AgentId(1)), Some(&to));
    }

    #[test]
    fn failed_move_keeps_agent_in_place() {
        let extent = GridExtent::new(&[3, 3], &[false]).unwrap();
        let mut m: Model<Walker, GridSpaceSingle> =
            Model::new(GridSpaceSingle::new(extent, Metric::Chebyshev), &ModelConfig::default());
        m.add_agent_pos(walker(1, &[1, 1])).unwrap();
        m.add_agent_pos(walker(2, &[2, 2])).unwrap();
        assert!(matches!(
            m.move_agent(AgentId(1), &smallvec![2, 2]),
            Err(ModelError::Space(SpaceError::CellOccupied { .. }))
        ));
        let home: Coord = smallvec![1, 1];
        assert_eq!(m.agent(AgentId(1)).unwrap().pos, home);
        assert_eq!(m.position(AgentId(1)), Some(&home));
    }

    #[test]
    #[should_panic(expected = "diverged")]
    fn bypassing_the_index_is_detected() {
        let mut m = grid_model(&[5, 5], false);
        m.add_agent_pos(walker(1, &[1, 1])).unwrap();
        m.agent_mut(AgentId(1)).unwrap().set_pos(smallvec![4, 4]);
        let _ = m.move_agent(AgentId(1), &smallvec![2, 2]);
    }

    #[test]
    fn walk_wraps_or_stops_at_wall() {
        let mut torus = grid_model(&[5, 5], true);
        torus.add_agent_pos(walker(1, &[5, 1])).unwrap();
        let to = torus.walk(AgentId(1), &smallvec![1, -1]).unwrap();
        assert_eq!(to, Coord::from_slice(&[1, 5]));

        let mut boxed = grid_model(&[5, 5], false);
        boxed.add_agent_pos(walker(1, &[5, 1])).unwrap();
        let to = boxed.walk(AgentId(1), &smallvec![2, -3]).unwrap();
        assert_eq!(to, Coord::from_slice(&[5, 1]));
    }

    #[test]
    fn continuous_walk_and_direction() {
        let extent = ContinuousExtent::new(&[10.0, 10.0], &[true]).unwrap();
        let space = ContinuousSpace::new(extent, 1.0, Metric::Euclidean).unwrap();
        let mut m: Model<Drifter, ContinuousSpace> = Model::new(space, &ModelConfig::default());
        m.add_agent_pos(Drifter {
            id: AgentId(1),
            pos: smallvec![9.5, 0.5],
        })
        .unwrap();
        let to = m.walk(AgentId(1), &smallvec![1.0, -1.0]).unwrap();
        assert!((to[0] - 0.5).abs() < 1e-9 && (to[1] - 9.5).abs() < 1e-9);

        let d = m.get_direction(&smallvec![9.0, 1.0], &smallvec![1.0, 9.0]);
        assert!((d[0] - 2.0).abs() < 1e-9 && (d[1] + 2.0).abs() < 1e-9);
        assert_eq!(m.spacesize(), Point::from_slice(&[10.0, 10.0]));
    }

    #[test]
    fn agent_distance_honours_wrap() {
        let mut m = grid_model(&[10, 10], true);
        m.add_agent_pos(walker(1, &[1, 1])).unwrap();
        m.add_agent_pos(walker(2, &[10, 9])).unwrap();
        assert_eq!(m.agent_distance(AgentId(1), AgentId(2)).unwrap(), 2.0);
        assert!(m.agent_distance(AgentId(1), AgentId(3)).is_err());
    }

    #[test]
    #[should_panic(expected = "empty space")]
    fn model_requires_empty_space() {
        let extent = GridExtent::new(&[3], &[false]).unwrap();
        let mut space = GridSpace::new(extent, Metric::Chebyshev);
        space.insert(AgentId(1), &smallvec![1]).unwrap();
        let _: Model<Walker, GridSpace> = Model::new(space, &ModelConfig::default());
    }
}
