//! Segregation and routing walkthrough.
//!
//! Demonstrates: build a single-occupancy grid → fill it → run sweeps
//! until residents settle → plan an A* route for one resident → walk it.
//!
//! Set `RUST_LOG=debug` (or `trace`) to see index and search logs.

use thicket_bench::{schelling_profile, schelling_sweep};
use thicket_core::AgentId;
use thicket_model::{GridConfig, RoutePlanner, RouteStep};
use thicket_path::PathConfig;
use thicket_space::Metric;
use tracing::info;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    println!("=== Thicket Segregation Example ===\n");

    let mut model = schelling_profile(42, 30, 0.8).expect("30x30 profile is valid");
    info!(residents = model.len(), "model ready");

    for sweep in 1..=20 {
        let moved = schelling_sweep(&mut model, 3);
        let happy = model.agents().filter(|r| r.happy).count();
        println!(
            "  sweep {:>2}: moved={:>4}, happy={:>4}/{}",
            sweep,
            moved,
            happy,
            model.len()
        );
        if moved == 0 {
            info!(sweep, "all residents settled");
            break;
        }
    }

    let config = GridConfig {
        dims: vec![30, 30],
        periodic: vec![false],
        metric: Metric::Chebyshev,
    };
    let mut planner = RoutePlanner::new(config.pathfinder(PathConfig::default()).unwrap());
    let walker = AgentId(1);
    let Some(goal) = model.random_empty() else {
        println!("\nno empty cell to walk to");
        return;
    };
    let route = planner.plan_route(&model, walker, &goal).unwrap();
    println!("\nresident {walker} plans {} steps to {:?}", route.len(), goal.as_slice());

    let mut steps = 0;
    let mut blocked = 0;
    while blocked < 3 {
        match planner.move_along_route(&mut model, walker).unwrap() {
            RouteStep::Advanced(_) => steps += 1,
            RouteStep::Blocked => blocked += 1,
            RouteStep::Stationary => break,
        }
    }
    let at = model.position(walker).unwrap();
    println!(
        "resident {walker} took {steps} steps, now at {:?} (blocked {blocked} times)",
        at.as_slice()
    );
}
