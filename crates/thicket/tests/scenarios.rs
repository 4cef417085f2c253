//! Small end-to-end scenarios driven through the facade.

use thicket::prelude::*;
use thicket_test_utils::{coord, point, Animal, GridAgent, Particle};

/// One segregation sweep: unhappy agents jump to a random empty cell.
fn schelling_step(model: &mut Model<GridAgent, GridSpaceSingle>) -> usize {
    let ids: Vec<AgentId> = model.ids().collect();
    let mut moved = 0;
    for id in ids {
        let Some(me) = model.agent(id) else { continue };
        let group = me.group;
        let same = model
            .nearby_agents(id, 1.0)
            .unwrap()
            .filter(|a| a.group == group)
            .count();
        let happy = same >= 2;
        if let Some(a) = model.agent_mut(id) {
            a.happy = happy;
        }
        if !happy && model.move_agent_single(id).unwrap().is_some() {
            moved += 1;
        }
    }
    moved
}

fn schelling(seed: u64) -> Vec<(AgentId, Coord)> {
    let config = GridConfig {
        dims: vec![12, 12],
        periodic: vec![false],
        metric: Metric::Chebyshev,
    };
    let mut model = Model::new(config.build_single().unwrap(), &ModelConfig { seed });
    for i in 0..90 {
        let id = model.next_id();
        let added = model
            .add_agent_single(GridAgent::new(id.0, coord(&[1, 1]), (i % 2) as u8))
            .unwrap();
        assert_eq!(added, Some(id));
    }
    for _ in 0..5 {
        schelling_step(&mut model);
    }
    model.agents().map(|a| (a.id, a.pos.clone())).collect()
}

#[test]
fn schelling_is_reproducible_per_seed() {
    let a = schelling(11);
    assert_eq!(a, schelling(11));
    assert_eq!(a.len(), 90);
    assert_ne!(a, schelling(12));
}

#[test]
fn flock_drifts_and_wraps() {
    let config = ContinuousConfig {
        extent: vec![20.0, 20.0],
        periodic: vec![true],
        bucket_size: 2.0,
        metric: Metric::Euclidean,
    };
    let mut model = Model::new(config.build().unwrap(), &ModelConfig::default());
    for i in 0..10u64 {
        let x = i as f64 * 2.0;
        model
            .add_agent_pos(Particle::new(i + 1, point(&[x, 19.5]), point(&[0.0, 1.0])))
            .unwrap();
    }
    let ids: Vec<AgentId> = model.ids().collect();
    for &id in &ids {
        model.move_by_velocity(id, 1.0).unwrap();
    }
    for a in model.agents() {
        assert!((a.pos[1] - 0.5).abs() < 1e-9);
    }
    let pairs = model.interacting_pairs(2.5);
    assert_eq!(pairs.len(), 5);
}

#[test]
fn wolves_hunt_across_the_torus() {
    let mut model = Model::new(
        GridConfig {
            dims: vec![8, 8],
            periodic: vec![true],
            metric: Metric::Chebyshev,
        }
        .build_multi()
        .unwrap(),
        &ModelConfig { seed: 5 },
    );
    model.add_agent_pos(Animal::wolf(1, coord(&[1, 1]), 10.0)).unwrap();
    model.add_agent_pos(Animal::sheep(2, coord(&[8, 8]), 3.0)).unwrap();
    model.add_agent_pos(Animal::sheep(3, coord(&[4, 4]), 3.0)).unwrap();

    let target = model
        .nearby_agents(AgentId(1), 1.0)
        .unwrap()
        .find(|a| !a.is_wolf())
        .map(|a| a.id());
    assert_eq!(target, Some(AgentId(2)));

    let dest = model.position(AgentId(2)).unwrap().clone();
    model.remove_agent(AgentId(2)).unwrap();
    model.move_agent(AgentId(1), &dest).unwrap();
    assert_eq!(model.ids_in_position(&coord(&[8, 8])).collect::<Vec<_>>(), vec![AgentId(1)]);
}
