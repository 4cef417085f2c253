//! A* optimality against breadth-first distances on random mazes.

use proptest::prelude::*;
use std::collections::VecDeque;
use thicket_core::Coord;
use thicket_path::{CostMetric, Pathfinder, SearchOutcome, WalkMask};
use thicket_space::GridExtent;

fn c(v: &[i32]) -> Coord {
    v.iter().copied().collect()
}

/// Unit-cost orthogonal BFS distance, or `None` if unreachable.
fn bfs(extent: &GridExtent, mask: &WalkMask, start: &Coord, goal: &Coord) -> Option<usize> {
    let mut dist = vec![usize::MAX; extent.cell_count()];
    let s = extent.linear_index(start)?;
    let g = extent.linear_index(goal)?;
    dist[s] = 0;
    let mut queue = VecDeque::from([s]);
    while let Some(i) = queue.pop_front() {
        if i == g {
            return Some(dist[i]);
        }
        let here = extent.coord_of(i);
        for axis in 0..extent.ndim() {
            for step in [-1, 1] {
                let mut next = here.clone();
                next[axis] += step;
                let Some(j) = extent.linear_index(&next) else {
                    continue;
                };
                if mask.is_walkable(j) && dist[j] == usize::MAX {
                    dist[j] = dist[i] + 1;
                    queue.push_back(j);
                }
            }
        }
    }
    None
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn astar_matches_bfs(
        walls in prop::collection::vec(prop::bool::weighted(0.25), 64),
        sx in 1i32..=8, sy in 1i32..=8,
        gx in 1i32..=8, gy in 1i32..=8,
    ) {
        let extent = GridExtent::new(&[8, 8], &[false]).unwrap();
        let start = c(&[sx, sy]);
        let goal = c(&[gx, gy]);
        let gi = extent.linear_index(&goal).unwrap();
        let mut cells: Vec<bool> = walls.iter().map(|w| !w).collect();
        cells[gi] = true;
        let mask = WalkMask::from_vec(&[8, 8], cells).unwrap();

        let pf = Pathfinder::builder(extent.clone())
            .diagonal_movement(false)
            .cost_metric(CostMetric::Manhattan)
            .walkable(mask.clone())
            .build()
            .unwrap();
        let outcome = pf.find_path(&start, &goal).unwrap();
        match (bfs(&extent, &mask, &start, &goal), outcome) {
            (Some(d), SearchOutcome::Found { route, cost, .. }) => {
                prop_assert_eq!(route.len(), d);
                prop_assert!((cost - d as f64).abs() < 1e-9);
            }
            (None, SearchOutcome::Unreachable { .. }) => {}
            (want, got) => prop_assert!(false, "bfs {:?} vs astar {:?}", want, got),
        }
    }

    #[test]
    fn inflated_search_respects_bound(
        walls in prop::collection::vec(prop::bool::weighted(0.2), 100),
        eps in 0.0f64..2.0,
    ) {
        let extent = GridExtent::new(&[10, 10], &[false]).unwrap();
        let mut cells: Vec<bool> = walls.iter().map(|w| !w).collect();
        cells[0] = true;
        cells[99] = true;
        let mask = WalkMask::from_vec(&[10, 10], cells).unwrap();
        let build = |e: f64| {
            Pathfinder::builder(extent.clone())
                .walkable(mask.clone())
                .admissibility(e)
                .build()
                .unwrap()
        };
        let opt = build(0.0).find_path(&c(&[1, 1]), &c(&[10, 10])).unwrap();
        let relaxed = build(eps).find_path(&c(&[1, 1]), &c(&[10, 10])).unwrap();
        prop_assert_eq!(opt.is_found(), relaxed.is_found());
        if let (Some(o), Some(r)) = (opt.cost(), relaxed.cost()) {
            prop_assert!(r <= (1.0 + eps) * o + 1e-9);
        }
    }
}

#[test]
fn unreachable_route_is_restartable_and_empty() {
    let extent = GridExtent::new(&[3, 3], &[false]).unwrap();
    let mask = WalkMask::from_fn(&extent, |p| p[0] != 2);
    let pf = Pathfinder::builder(extent).walkable(mask).build().unwrap();
    let route = pf.find_path(&c(&[1, 1]), &c(&[3, 3])).unwrap().into_route();
    assert_eq!(route.iter().count(), 0);
    assert_eq!(route.iter().count(), 0);
}

#[test]
fn found_route_can_be_walked_twice() {
    let extent = GridExtent::new(&[4, 4], &[false]).unwrap();
    let pf = Pathfinder::builder(extent).build().unwrap();
    let route = pf.find_path(&c(&[1, 1]), &c(&[4, 2])).unwrap().into_route();
    let first: Vec<_> = route.iter().cloned().collect();
    let second: Vec<_> = route.iter().cloned().collect();
    assert_eq!(first, second);
    assert_eq!(first.last(), Some(&c(&[4, 2])));
}
