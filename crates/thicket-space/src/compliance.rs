//! Space trait compliance test helpers.
//!
//! These functions verify that a [`Space`] implementation satisfies the
//! invariants required by the trait contract. Reused across all backend
//! test modules (GridSpace, GridSpaceSingle, ContinuousSpace).

use crate::error::SpaceError;
use crate::space::{DiscreteSpace, Space};
use indexmap::IndexSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thicket_core::AgentId;

const SAMPLES: usize = 12;
const AGENTS: u64 = 24;

fn sample_positions<S: Space>(space: &S, seed: u64) -> Vec<S::Position> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..SAMPLES).map(|_| space.random_position(&mut rng)).collect()
}

/// Assert that `distance(a, a) == 0.0` for sampled positions.
pub fn assert_distance_reflexive<S: Space>(space: &S) {
    for p in sample_positions(space, 1) {
        let d = space.distance(&p, &p);
        assert!(d.abs() < f64::EPSILON, "distance({p:?}, {p:?}) = {d}, expected 0.0");
    }
}

/// Assert that `distance(a, b) == distance(b, a)` for sampled pairs.
pub fn assert_distance_symmetric<S: Space>(space: &S) {
    let pts = sample_positions(space, 2);
    for a in &pts {
        for b in &pts {
            let dab = space.distance(a, b);
            let dba = space.distance(b, a);
            assert!(
                (dab - dba).abs() < 1e-9,
                "distance({a:?}, {b:?}) = {dab} != distance({b:?}, {a:?}) = {dba}"
            );
        }
    }
}

/// Assert triangle inequality: `d(a, c) <= d(a, b) + d(b, c)` for sampled triples.
pub fn assert_distance_triangle_inequality<S: Space>(space: &S) {
    let pts = sample_positions(space, 3);
    for a in &pts {
        for b in &pts {
            for c in &pts {
                let dac = space.distance(a, c);
                let dab = space.distance(a, b);
                let dbc = space.distance(b, c);
                assert!(
                    dac <= dab + dbc + 1e-9,
                    "triangle inequality violated: d({a:?},{c:?})={dac} > d({a:?},{b:?})={dab} + d({b:?},{c:?})={dbc}"
                );
            }
        }
    }
}

/// Assert that every indexed agent is found at its recorded position.
pub fn assert_occupancy_consistent<S: Space>(space: &S) {
    let mut count = 0;
    for id in space.ids() {
        count += 1;
        let pos = space.position_of(id).expect("ids() yielded an unknown agent");
        assert_eq!(
            space.normalize(pos).as_ref(),
            Ok(pos),
            "stored position of {id} is not normalized"
        );
        assert!(
            space.ids_in_position(pos).any(|other| other == id),
            "{id} not found at its recorded position {pos:?}"
        );
        assert!(
            space.nearby_ids(pos, 0.0).any(|other| other == id),
            "{id} not within radius 0 of its own position {pos:?}"
        );
    }
    assert_eq!(count, space.len(), "ids() and len() disagree");
}

/// Populate, shuffle and drain the index, checking consistency at every
/// stage. Rejected placements must leave the index untouched.
pub fn assert_mutation_round_trip<S: Space>(space: &mut S) {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    for raw in 0..AGENTS {
        let id = AgentId(raw);
        let pos = space.random_position(&mut rng);
        let before = space.len();
        match space.insert(id, &pos) {
            Ok(stored) => assert_eq!(space.position_of(id), Some(&stored)),
            Err(SpaceError::CellOccupied { .. }) => {
                assert_eq!(space.len(), before);
                assert!(!space.contains(id));
            }
            Err(e) => panic!("insert({id}, {pos:?}) failed: {e}"),
        }
    }
    assert_occupancy_consistent(space);

    let ids: Vec<AgentId> = space.ids().collect();
    for &id in &ids {
        let from = space.position_of(id).cloned().expect("indexed");
        let to = space.random_position(&mut rng);
        match space.relocate(id, &from, &to) {
            Ok(stored) => assert_eq!(space.position_of(id), Some(&stored)),
            Err(SpaceError::CellOccupied { .. }) => {
                assert_eq!(space.position_of(id), Some(&from));
            }
            Err(e) => panic!("relocate({id}) failed: {e}"),
        }
    }
    assert_occupancy_consistent(space);
    let elsewhere = space.random_position(&mut rng);
    assert!(
        space.insert(ids[0], &elsewhere).is_err(),
        "duplicate insert must fail"
    );

    for &id in &ids {
        assert!(space.remove(id).is_some(), "remove({id}) lost the agent");
        assert!(space.remove(id).is_none(), "second remove({id}) succeeded");
    }
    assert!(space.is_empty());
}

/// Assert that radius queries, the cursor and nearest-neighbour search
/// agree with a brute-force scan.
pub fn assert_queries_match_brute_force<S: Space>(space: &mut S) {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for raw in 0..AGENTS {
        let pos = space.random_position(&mut rng);
        let _ = space.insert(AgentId(raw), &pos);
    }
    for center in sample_positions(space, 6) {
        for radius in [0.0, 1.0, 1.5, 2.5, 100.0] {
            let brute: IndexSet<AgentId> = space
                .ids()
                .filter(|&id| space.distance(&center, space.position_of(id).expect("indexed")) <= radius)
                .collect();

            let lazy: Vec<AgentId> = space.nearby_ids(&center, radius).collect();
            let lazy_set: IndexSet<AgentId> = lazy.iter().copied().collect();
            assert_eq!(lazy.len(), lazy_set.len(), "nearby_ids yielded duplicates");
            assert_eq!(
                lazy_set.len(),
                brute.len(),
                "nearby_ids({center:?}, {radius}) size mismatch"
            );
            assert!(lazy_set.iter().all(|id| brute.contains(id)));

            let mut cursor = space.cursor(&center, radius);
            let mut walked = IndexSet::new();
            while let Some(id) = cursor.advance(&*space) {
                assert!(walked.insert(id), "cursor yielded {id} twice");
            }
            assert_eq!(walked, lazy_set, "cursor disagrees with nearby_ids");
        }

        let best = space
            .ids()
            .map(|id| space.distance(&center, space.position_of(id).expect("indexed")))
            .fold(f64::INFINITY, f64::min);
        match space.nearest_neighbor(&center, None, None) {
            Some(id) => {
                let d = space.distance(&center, space.position_of(id).expect("indexed"));
                assert!((d - best).abs() < 1e-9, "nearest at {d}, brute force {best}");
            }
            None => assert!(space.is_empty()),
        }
    }
    let ids: Vec<AgentId> = space.ids().collect();
    for id in ids {
        space.remove(id);
    }
}

/// Assert that `nearby_positions` excludes the center, yields each cell
/// once, and matches a brute-force scan of the lattice.
pub fn assert_nearby_positions_exact<S: DiscreteSpace>(space: &S) {
    let all: Vec<_> = space.extent().positions().collect();
    for center in all.iter().step_by(3) {
        for radius in [0.0, 1.0, 1.5, 2.0, 3.0] {
            let got: Vec<_> = space.nearby_positions(center, radius).collect();
            let unique: IndexSet<_> = got.iter().cloned().collect();
            assert_eq!(got.len(), unique.len(), "nearby_positions yielded duplicates");
            assert!(!unique.contains(center), "nearby_positions included its center");
            let brute = all
                .iter()
                .filter(|p| *p != center && space.distance(center, p) <= radius)
                .count();
            assert_eq!(
                unique.len(),
                brute,
                "nearby_positions({center:?}, {radius}) size mismatch"
            );
        }
    }
}

/// Run every compliance check applicable to any space.
pub fn run_full_compliance<S: Space>(space: &mut S) {
    assert_distance_reflexive(space);
    assert_distance_symmetric(space);
    assert_distance_triangle_inequality(space);
    assert_mutation_round_trip(space);
    assert_queries_match_brute_force(space);
}

/// Run [`run_full_compliance`] plus the lattice-only checks.
pub fn run_discrete_compliance<S: DiscreteSpace>(space: &mut S) {
    run_full_compliance(space);
    assert_nearby_positions_exact(space);
}
