//! Neighbour queries, dynamic iteration and route consumption through the
//! model API.

use thicket_core::{Agent, AgentId};
use thicket_model::{Model, ModelConfig, ModelError, RoutePlanner, RouteStep};
use thicket_path::{PathError, Pathfinder};
use thicket_space::{GridExtent, Metric};
use thicket_test_utils::{coord, grid, plane, point, single_grid, Animal, GridAgent, Particle};

// ── Neighbour completeness ──────────────────────────────────────

#[test]
fn five_by_five_excludes_self() {
    let mut m = Model::new(grid(&[5, 5], false, Metric::Chebyshev), &ModelConfig::default());
    m.add_agent_pos(GridAgent::new(1, coord(&[1, 1]), 0)).unwrap();
    m.add_agent_pos(GridAgent::new(2, coord(&[2, 2]), 0)).unwrap();

    let near: Vec<_> = m.nearby_ids(AgentId(1), 1.0).unwrap().collect();
    assert_eq!(near, vec![AgentId(2)]);
}

#[test]
fn continuous_neighbours_across_seam() {
    let mut m = Model::new(plane(&[10.0, 10.0], true, 1.0), &ModelConfig::default());
    let still = point(&[0.0, 0.0]);
    m.add_agent_pos(Particle::new(1, point(&[0.2, 5.0]), still.clone())).unwrap();
    m.add_agent_pos(Particle::new(2, point(&[9.9, 5.0]), still.clone())).unwrap();
    m.add_agent_pos(Particle::new(3, point(&[5.0, 5.0]), still)).unwrap();

    let near: Vec<_> = m.nearby_ids(AgentId(1), 0.5).unwrap().collect();
    assert_eq!(near, vec![AgentId(2)]);
    assert_eq!(m.nearest_neighbor(AgentId(3), None).unwrap(), Some(AgentId(1)));
}

// ── Dynamic iteration ───────────────────────────────────────────

#[test]
fn removing_through_cursor_misses_agents() {
    let mut m = Model::new(grid(&[4, 4], false, Metric::Chebyshev), &ModelConfig::default());
    for i in 1..=3 {
        m.add_agent_pos(GridAgent::new(i, coord(&[2, 2]), 0)).unwrap();
    }
    let mut cursor = m.nearby_cursor_at(&coord(&[2, 2]), 0.0);
    let mut removed = 0;
    while let Some(id) = cursor.advance(&m) {
        m.remove_agent(id).unwrap();
        removed += 1;
    }
    assert!(removed < 3, "cursor saw {removed} agents");
    assert!(!m.is_empty());
}

#[test]
fn collecting_first_removes_everyone() {
    let mut m = Model::new(grid(&[4, 4], false, Metric::Chebyshev), &ModelConfig::default());
    for i in 1..=3 {
        m.add_agent_pos(GridAgent::new(i, coord(&[2, 2]), 0)).unwrap();
    }
    let ids: Vec<_> = m.nearby_ids_at(&coord(&[2, 2]), 0.0).collect();
    for id in ids {
        m.remove_agent(id).unwrap();
    }
    assert!(m.is_empty());
}

// ── Mixed populations ───────────────────────────────────────────

#[test]
fn closed_sum_population_shares_one_index() {
    let mut m = Model::new(grid(&[6, 6], true, Metric::Chebyshev), &ModelConfig { seed: 3 });
    m.add_agent_pos(Animal::sheep(1, coord(&[3, 3]), 4.0)).unwrap();
    m.add_agent_pos(Animal::sheep(2, coord(&[3, 4]), 4.0)).unwrap();
    m.add_agent_pos(Animal::wolf(3, coord(&[4, 4]), 10.0)).unwrap();

    let prey: Vec<_> = m
        .nearby_agents(AgentId(3), 1.0)
        .unwrap()
        .filter(|a| !a.is_wolf())
        .map(|a| a.id())
        .collect();
    assert_eq!(prey, vec![AgentId(1), AgentId(2)]);

    let eaten = prey[0];
    m.remove_agent(eaten).unwrap();
    m.move_agent(AgentId(3), &coord(&[3, 3])).unwrap();
    assert_eq!(m.agent(AgentId(3)).unwrap().pos(), &coord(&[3, 3]));
    assert_eq!(m.remove_all(|a| a.energy() < 5.0), 1);
    assert_eq!(m.len(), 1);
}

// ── Routes ──────────────────────────────────────────────────────

#[test]
fn exhausted_route_keeps_agent_stationary() {
    let extent = GridExtent::new(&[10, 10], &[false]).unwrap();
    let mut planner = RoutePlanner::new(
        Pathfinder::builder(extent)
            .diagonal_movement(false)
            .build()
            .unwrap(),
    );
    let mut m = Model::new(
        single_grid(&[10, 10], false, Metric::Manhattan),
        &ModelConfig::default(),
    );
    m.add_agent_pos(GridAgent::new(1, coord(&[1, 1]), 0)).unwrap();

    assert_eq!(planner.plan_route(&m, AgentId(1), &coord(&[10, 10])).unwrap().len(), 18);
    for _ in 0..18 {
        assert!(matches!(
            planner.move_along_route(&mut m, AgentId(1)).unwrap(),
            RouteStep::Advanced(_)
        ));
    }
    for _ in 0..5 {
        assert_eq!(
            planner.move_along_route(&mut m, AgentId(1)).unwrap(),
            RouteStep::Stationary
        );
        assert!(planner.is_stationary(AgentId(1)));
    }
    assert_eq!(m.position(AgentId(1)), Some(&coord(&[10, 10])));
}

#[test]
fn planner_sized_for_a_larger_grid_is_rejected_before_moving() {
    let wide = GridExtent::new(&[20, 20], &[false]).unwrap();
    let mut planner = RoutePlanner::new(Pathfinder::builder(wide).build().unwrap());
    let mut m = Model::new(grid(&[10, 10], false, Metric::Chebyshev), &ModelConfig::default());
    m.add_agent_pos(GridAgent::new(1, coord(&[1, 1]), 0)).unwrap();

    assert_eq!(
        planner.plan_route(&m, AgentId(1), &coord(&[15, 15])),
        Err(ModelError::Path(PathError::GridMismatch {
            expected: GridExtent::new(&[20, 20], &[false]).unwrap(),
            got: GridExtent::new(&[10, 10], &[false]).unwrap(),
        }))
    );
    assert!(planner.is_stationary(AgentId(1)));
    assert_eq!(
        planner.move_along_route(&mut m, AgentId(1)).unwrap(),
        RouteStep::Stationary
    );
    assert_eq!(m.position(AgentId(1)), Some(&coord(&[1, 1])));
}
