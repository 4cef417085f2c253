//! Per-agent route bookkeeping on top of a [`Pathfinder`].
//!
//! A [`RoutePlanner`] owns the pathfinder and one [`Route`] per agent
//! that has a plan. Planning replaces an agent's route; moving along it
//! consumes one waypoint per call.

use indexmap::IndexMap;
use rand::seq::IndexedRandom;
use rand::Rng;
use thicket_core::{Agent, AgentId, Coord};
use thicket_path::{BestRoute, Pathfinder, Route};
use thicket_space::{DiscreteSpace, SpaceError};

use crate::error::ModelError;
use crate::model::Model;

/// What one [`RoutePlanner::move_along_route`] call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteStep {
    /// The agent moved onto the next waypoint.
    Advanced(Coord),
    /// The next waypoint is occupied; the agent and its route are
    /// unchanged.
    Blocked,
    /// The agent has no waypoints left.
    Stationary,
}

/// Routes for the agents of one model, planned with one pathfinder.
#[derive(Clone, Debug)]
pub struct RoutePlanner {
    pathfinder: Pathfinder,
    routes: IndexMap<AgentId, Route>,
}

impl RoutePlanner {
    /// Create a planner with no routes.
    pub fn new(pathfinder: Pathfinder) -> Self {
        Self {
            pathfinder,
            routes: IndexMap::new(),
        }
    }

    /// The pathfinder.
    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    /// Mutable access to the pathfinder, e.g. to edit walkability.
    /// Existing routes are not replanned.
    pub fn pathfinder_mut(&mut self) -> &mut Pathfinder {
        &mut self.pathfinder
    }

    /// The remaining route of `id`, if it has one.
    pub fn route(&self, id: AgentId) -> Option<&Route> {
        self.routes.get(&id)
    }

    /// Whether `id` has no waypoints left.
    pub fn is_stationary(&self, id: AgentId) -> bool {
        self.routes.get(&id).is_none_or(Route::is_empty)
    }

    /// Plan a route for `id` from its current cell to `goal`, replacing
    /// any previous one.
    ///
    /// An unreachable goal leaves the agent with an empty route.
    ///
    /// # Errors
    ///
    /// Returns `Err` for an unknown agent, a space whose grid differs from
    /// the pathfinder's, an out-of-bounds goal, or a goal that is not
    /// walkable.
    pub fn plan_route<A, S>(
        &mut self,
        model: &Model<A, S>,
        id: AgentId,
        goal: &Coord,
    ) -> Result<&Route, ModelError>
    where
        S: DiscreteSpace,
        A: Agent<Pos = Coord>,
    {
        self.pathfinder.check_extent(model.space().extent())?;
        let start = model.position_or_err(id)?;
        let outcome = self.pathfinder.find_path(start, goal)?;
        tracing::trace!(
            %id,
            found = outcome.is_found(),
            expanded = outcome.expanded(),
            "planned route"
        );
        self.routes.insert(id, outcome.into_route());
        Ok(&self.routes[&id])
    }

    /// Plan to every goal in `goals` and keep the best route by cost.
    ///
    /// Returns the chosen goal, or `None` when no goal is reachable, in
    /// which case the agent's previous route is dropped. Errors are those
    /// of [`plan_route`](Self::plan_route).
    pub fn plan_best_route<A, S, I>(
        &mut self,
        model: &Model<A, S>,
        id: AgentId,
        goals: I,
        which: BestRoute,
    ) -> Result<Option<Coord>, ModelError>
    where
        S: DiscreteSpace,
        A: Agent<Pos = Coord>,
        I: IntoIterator<Item = Coord>,
    {
        self.pathfinder.check_extent(model.space().extent())?;
        let start = model.position_or_err(id)?;
        match self.pathfinder.best_route(start, goals, which)? {
            Some((goal, route)) => {
                self.routes.insert(id, route);
                Ok(Some(goal))
            }
            None => {
                self.routes.swap_remove(&id);
                Ok(None)
            }
        }
    }

    /// Advance `id` one waypoint along its route.
    ///
    /// Once the route is exhausted every further call is a no-op that
    /// reports [`RouteStep::Stationary`].
    pub fn move_along_route<A, S>(
        &mut self,
        model: &mut Model<A, S>,
        id: AgentId,
    ) -> Result<RouteStep, ModelError>
    where
        S: DiscreteSpace,
        A: Agent<Pos = Coord>,
    {
        model.agent_or_err(id)?;
        let Some(next) = self.routes.get(&id).and_then(|r| r.front()).cloned() else {
            self.routes.swap_remove(&id);
            return Ok(RouteStep::Stationary);
        };
        match model.move_agent(id, &next) {
            Ok(pos) => {
                let route = self
                    .routes
                    .get_mut(&id)
                    .expect("route was present before the move");
                route.pop_front();
                if route.is_empty() {
                    self.routes.swap_remove(&id);
                }
                Ok(RouteStep::Advanced(pos))
            }
            Err(ModelError::Space(SpaceError::CellOccupied { .. })) => Ok(RouteStep::Blocked),
            Err(e) => Err(e),
        }
    }

    /// Remove `id` from the model and forget its route.
    pub fn remove_agent<A, S>(&mut self, model: &mut Model<A, S>, id: AgentId) -> Result<A, ModelError>
    where
        S: DiscreteSpace,
        A: Agent<Pos = Coord>,
    {
        self.routes.swap_remove(&id);
        model.remove_agent(id)
    }

    /// Drop the route of `id`, if any.
    pub fn forget(&mut self, id: AgentId) -> Option<Route> {
        self.routes.swap_remove(&id)
    }

    /// Mark `pos` walkable or blocked. Existing routes are not replanned.
    pub fn set_walkable(&mut self, pos: &Coord, walkable: bool) -> Result<(), ModelError> {
        Ok(self.pathfinder.set_walkable(pos, walkable)?)
    }

    /// A uniformly random walkable cell.
    pub fn random_walkable<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord> {
        self.pathfinder.random_walkable(rng)
    }

    /// A uniformly random walkable cell within `r` of `pos`, excluding
    /// `pos` itself.
    pub fn nearby_walkable<S, R>(&self, space: &S, pos: &Coord, r: f64, rng: &mut R) -> Option<Coord>
    where
        S: DiscreteSpace,
        R: Rng + ?Sized,
    {
        let cells: Vec<Coord> = space
            .nearby_positions(pos, r)
            .filter(|c| self.pathfinder.is_walkable(c))
            .collect();
        cells.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use smallvec::smallvec;
    use thicket_path::{PathError, WalkMask};
    use thicket_space::{GridExtent, GridSpace, GridSpaceSingle, Metric};

    #[derive(Clone, Debug)]
    struct Hiker {
        id: AgentId,
        pos: Coord,
    }

    impl Agent for Hiker {
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

    fn hiker(id: u64, pos: &[i32]) -> Hiker {
        Hiker {
            id: AgentId(id),
            pos: pos.iter().copied().collect(),
        }
    }

    fn open(dims: &[u32]) -> (Model<Hiker, GridSpace>, RoutePlanner) {
        let extent = GridExtent::new(dims, &[false]).unwrap();
        let model = Model::new(
            GridSpace::new(extent.clone(), Metric::Chebyshev),
            &ModelConfig::default(),
        );
        let planner = RoutePlanner::new(Pathfinder::builder(extent).build().unwrap());
        (model, planner)
    }

    // ── Planning ────────────────────────────────────────────────

    #[test]
    fn plan_and_walk_to_goal() {
        let (mut m, mut p) = open(&[10, 10]);
        m.add_agent_pos(hiker(1, &[1, 1])).unwrap();
        assert_eq!(p.plan_route(&m, AgentId(1), &smallvec![10, 10]).unwrap().len(), 9);
        assert!(!p.is_stationary(AgentId(1)));

        let mut steps = 0;
        while let RouteStep::Advanced(_) = p.move_along_route(&mut m, AgentId(1)).unwrap() {
            steps += 1;
        }
        assert_eq!(steps, 9);
        assert_eq!(m.position(AgentId(1)), Some(&Coord::from_slice(&[10, 10])));
        assert!(p.is_stationary(AgentId(1)));
    }

    #[test]
    fn exhausted_route_is_a_noop() {
        let (mut m, mut p) = open(&[4, 4]);
        m.add_agent_pos(hiker(1, &[2, 2])).unwrap();
        p.plan_route(&m, AgentId(1), &smallvec![2, 2]).unwrap();
        for _ in 0..3 {
            assert_eq!(p.move_along_route(&mut m, AgentId(1)).unwrap(), RouteStep::Stationary);
            assert!(p.is_stationary(AgentId(1)));
            assert_eq!(m.position(AgentId(1)), Some(&Coord::from_slice(&[2, 2])));
        }
    }

    #[test]
    fn unreachable_goal_gives_empty_route() {
        let extent = GridExtent::new(&[5, 5], &[false]).unwrap();
        let mask = WalkMask::from_fn(&extent, |c| c[0] != 3);
        let pf = Pathfinder::builder(extent.clone()).walkable(mask).build().unwrap();
        let mut p = RoutePlanner::new(pf);
        let mut m: Model<Hiker, GridSpace> =
            Model::new(GridSpace::new(extent, Metric::Chebyshev), &ModelConfig::default());
        m.add_agent_pos(hiker(1, &[1, 1])).unwrap();
        assert!(p.plan_route(&m, AgentId(1), &smallvec![5, 5]).unwrap().is_empty());
        assert!(p.is_stationary(AgentId(1)));
    }

    #[test]
    fn invalid_goal_rejected_up_front() {
        let (mut m, mut p) = open(&[5, 5]);
        m.add_agent_pos(hiker(1, &[1, 1])).unwrap();
        p.set_walkable(&smallvec![4, 4], false).unwrap();
        assert!(matches!(
            p.plan_route(&m, AgentId(1), &smallvec![4, 4]),
            Err(ModelError::Path(PathError::GoalNotWalkable { .. }))
        ));
        assert!(matches!(
            p.plan_route(&m, AgentId(1), &smallvec![9, 9]),
            Err(ModelError::Path(PathError::OutOfBounds { .. }))
        ));
        assert!(matches!(
            p.plan_route(&m, AgentId(2), &smallvec![2, 2]),
            Err(ModelError::UnknownAgent { .. })
        ));
    }

    #[test]
    fn planner_for_another_grid_is_rejected() {
        let (mut m, _) = open(&[10, 10]);
        m.add_agent_pos(hiker(1, &[1, 1])).unwrap();
        let wide = GridExtent::new(&[20, 20], &[false]).unwrap();
        let mut p = RoutePlanner::new(Pathfinder::builder(wide).build().unwrap());
        assert!(matches!(
            p.plan_route(&m, AgentId(1), &smallvec![15, 15]),
            Err(ModelError::Path(PathError::GridMismatch { .. }))
        ));
        assert!(matches!(
            p.plan_best_route(&m, AgentId(1), vec![Coord::from_slice(&[5, 5])], BestRoute::Shortest),
            Err(ModelError::Path(PathError::GridMismatch { .. }))
        ));
        assert!(p.route(AgentId(1)).is_none());

        let torus = GridExtent::new(&[10, 10], &[true]).unwrap();
        let mut p = RoutePlanner::new(Pathfinder::builder(torus).build().unwrap());
        assert!(matches!(
            p.plan_route(&m, AgentId(1), &smallvec![5, 5]),
            Err(ModelError::Path(PathError::GridMismatch { .. }))
        ));
    }

    #[test]
    fn best_route_picks_nearest_goal() {
        let (mut m, mut p) = open(&[10, 10]);
        m.add_agent_pos(hiker(1, &[1, 1])).unwrap();
        let goals = vec![Coord::from_slice(&[9, 9]), Coord::from_slice(&[3, 1])];
        let goal = p
            .plan_best_route(&m, AgentId(1), goals.clone(), BestRoute::Shortest)
            .unwrap();
        assert_eq!(goal, Some(Coord::from_slice(&[3, 1])));
        assert_eq!(p.route(AgentId(1)).unwrap().len(), 2);

        let far = p
            .plan_best_route(&m, AgentId(1), goals, BestRoute::Longest)
            .unwrap();
        assert_eq!(far, Some(Coord::from_slice(&[9, 9])));
    }

    // ── Blocking and removal ────────────────────────────────────

    #[test]
    fn occupied_waypoint_blocks_without_losing_route() {
        let extent = GridExtent::new(&[5, 1], &[false]).unwrap();
        let mut m: Model<Hiker, GridSpaceSingle> = Model::new(
            GridSpaceSingle::new(extent.clone(), Metric::Chebyshev),
            &ModelConfig::default(),
        );
        let mut p = RoutePlanner::new(Pathfinder::builder(extent).build().unwrap());
        m.add_agent_pos(hiker(1, &[1, 1])).unwrap();
        m.add_agent_pos(hiker(2, &[2, 1])).unwrap();
        p.plan_route(&m, AgentId(1), &smallvec![5, 1]).unwrap();
        assert_eq!(p.move_along_route(&mut m, AgentId(1)).unwrap(), RouteStep::Blocked);
        assert_eq!(p.route(AgentId(1)).unwrap().len(), 4);

        m.remove_agent(AgentId(2)).unwrap();
        assert_eq!(
            p.move_along_route(&mut m, AgentId(1)).unwrap(),
            RouteStep::Advanced(Coord::from_slice(&[2, 1]))
        );
    }

    #[test]
    fn remove_agent_forgets_route() {
        let (mut m, mut p) = open(&[6, 6]);
        m.add_agent_pos(hiker(1, &[1, 1])).unwrap();
        p.plan_route(&m, AgentId(1), &smallvec![6, 6]).unwrap();
        p.remove_agent(&mut m, AgentId(1)).unwrap();
        assert!(p.route(AgentId(1)).is_none());
        assert!(m.is_empty());
        assert!(matches!(
            p.move_along_route(&mut m, AgentId(1)),
            Err(ModelError::UnknownAgent { .. })
        ));
    }

    // ── Walkable sampling ───────────────────────────────────────

    #[test]
    fn walkable_sampling_respects_mask() {
        let (mut m, mut p) = open(&[3, 3]);
        for c in [[1, 1], [1, 2], [2, 1], [2, 3], [3, 2]] {
            p.set_walkable(&smallvec![c[0], c[1]], false).unwrap();
        }
        let (space, rng) = m.space_and_rng();
        for _ in 0..20 {
            let near = p.nearby_walkable(space, &smallvec![2, 2], 1.0, rng).unwrap();
            assert!(p.pathfinder().is_walkable(&near));
            assert_ne!(near.as_slice(), &[2, 2]);
        }
        let anywhere = p.random_walkable(m.rng()).unwrap();
        assert!(p.pathfinder().is_walkable(&anywhere));
    }
}
