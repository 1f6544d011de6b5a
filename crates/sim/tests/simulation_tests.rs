//! Integration tests for FLIP simulation
//! Run with: cargo test -p fludio-sim --release
//!
//! These tests verify whole-step behaviors:
//! - A collapsing block settles on the floor and stays in bounds
//! - Drift compensation keeps a resting pool near its rest density
//! - A moving obstacle is never penetrated
//! - Steps are deterministic and dt = 0 does not move particles

use fludio_sim::{hex_block, ColorConfig, FlipSimulation, Obstacle, StepConfig};
use glam::Vec2;

const DENSITY: f32 = 1000.0;
const CELL_SIZE: f32 = 0.025;
const RADIUS: f32 = 0.01;
const DT: f32 = 1.0 / 60.0;

fn tank(width: f32, height: f32, capacity: usize) -> FlipSimulation {
    FlipSimulation::new(
        DENSITY,
        width,
        height,
        CELL_SIZE,
        RADIUS,
        capacity,
        ColorConfig::default(),
    )
    .unwrap()
}

fn origin() -> Vec2 {
    Vec2::splat(CELL_SIZE + RADIUS)
}

/// Block of 500 particles in the lower-left of a 40x30 tank collapses and settles
#[test]
fn test_dam_break_settles_on_floor() {
    const STEPS: usize = 120;

    let mut sim = tank(1.0, 0.75, 500);
    assert_eq!((sim.grid.num_x, sim.grid.num_y), (40, 30));

    let block = hex_block(origin(), RADIUS, 25, 20);
    assert_eq!(block.len(), 500);
    sim.seed_particles(&block).unwrap();
    let initial_mean_y = block.iter().map(|p| p.y).sum::<f32>() / block.len() as f32;

    // Default flip ratio, drift compensation and separation
    let config = StepConfig {
        dt: DT,
        gravity: -9.8,
        ..Default::default()
    };
    assert_eq!(config.flip_ratio, 0.7);
    assert!(config.compensate_drift && config.separate_particles);
    for step in 0..STEPS {
        sim.simulate(&config, &Obstacle::none());
        assert!(!sim.has_non_finite(), "non-finite state at step {}", step);
        assert_eq!(sim.particles.num_particles(), 500, "particle count changed at step {}", step);
    }

    let mean_y = sim.particles.positions().iter().map(|p| p.y).sum::<f32>() / 500.0;
    let max_vy = sim.max_vertical_speed();
    println!("mean y {:.3} -> {:.3}, max |vy| {:.3}", initial_mean_y, mean_y, max_vy);

    assert_eq!(sim.particles_out_of_bounds(), 0);
    assert!(
        mean_y < initial_mean_y,
        "block should have spread out and dropped: mean y {} -> {}",
        initial_mean_y,
        mean_y
    );
    assert!(max_vy < 0.5, "fluid should have settled, max |vy| = {}", max_vy);
}

/// Drift compensation must not add jitter: the same collapse settles about as
/// calmly with it as without it
#[test]
fn test_drift_compensation_keeps_pool_calm() {
    const STEPS: usize = 240;

    let run = |compensate_drift: bool| {
        let mut sim = tank(1.0, 0.75, 500);
        sim.seed_particles(&hex_block(origin(), RADIUS, 25, 20)).unwrap();
        let config = StepConfig {
            dt: DT,
            compensate_drift,
            ..Default::default()
        };
        for _ in 0..STEPS {
            sim.simulate(&config, &Obstacle::none());
        }
        sim.max_vertical_speed()
    };

    let with_drift = run(true);
    let without = run(false);
    println!("max |vy| with drift {:.3}, without {:.3}", with_drift, without);
    assert!(with_drift < 0.5, "drift compensation left the pool jittering: {}", with_drift);
    assert!(without < 0.5, "uncompensated pool still moving: {}", without);
}

/// A full-width resting pool keeps its density close to the measured rest density
#[test]
fn test_resting_pool_holds_rest_density() {
    const STEPS: usize = 120;

    let mut sim = tank(1.0, 0.5, 600);
    let block = hex_block(origin(), RADIUS, 46, 10);
    sim.seed_particles(&block).unwrap();

    let config = StepConfig {
        dt: DT,
        flip_ratio: 0.1,
        ..Default::default()
    };
    for _ in 0..STEPS {
        sim.simulate(&config, &Obstacle::none());
    }

    let rest = sim.grid.rest_density;
    let mean = sim.mean_fluid_density();
    assert!(rest > 0.0);
    assert!(
        (mean / rest - 1.0).abs() < 0.25,
        "mean density {} drifted from rest density {}",
        mean,
        rest
    );
    assert_eq!(sim.particles.num_particles(), block.len());
    assert_eq!(sim.particles_out_of_bounds(), 0);
}

/// Dragging the obstacle through a pool never leaves particles inside it
#[test]
fn test_moving_obstacle_is_never_penetrated() {
    const STEPS: usize = 90;
    const OBSTACLE_RADIUS: f32 = 0.08;

    let mut sim = tank(1.0, 0.5, 600);
    let block = hex_block(origin(), RADIUS, 46, 10);
    sim.seed_particles(&block).unwrap();

    let config = StepConfig::default();
    let mut obstacle = Obstacle::new(Vec2::new(0.3, 0.2), OBSTACLE_RADIUS);
    let contact = OBSTACLE_RADIUS + sim.particles.radius();

    for step in 0..STEPS {
        let t = step as f32 / STEPS as f32;
        obstacle.move_to(Vec2::new(0.3 + 0.4 * t, 0.2), config.dt);
        sim.simulate(&config, &obstacle);

        for (k, p) in sim.particles.positions().iter().enumerate() {
            let dist = p.distance(obstacle.pos);
            assert!(
                dist >= contact - 1e-4,
                "particle {} inside obstacle at step {}: dist {} < {}",
                k,
                step,
                dist,
                contact
            );
        }
    }
    assert!(sim.kinetic_energy() > 0.0, "dragged obstacle should stir the pool");
}

/// Two copies fed the same inputs stay bit-identical
#[test]
fn test_simulation_is_deterministic() {
    let mut a = tank(1.0, 0.75, 500);
    a.seed_particles(&hex_block(origin(), RADIUS, 25, 20)).unwrap();
    let mut b = a.clone();

    let config = StepConfig::default();
    let mut obstacle = Obstacle::new(Vec2::new(0.7, 0.5), 0.1);
    for step in 0..30 {
        obstacle.move_to(Vec2::new(0.7 - 0.005 * step as f32, 0.5), config.dt);
        a.simulate(&config, &obstacle);
        b.simulate(&config, &obstacle);
    }

    assert_eq!(a.particles.positions(), b.particles.positions());
    assert_eq!(a.particles.velocities(), b.particles.velocities());
    assert_eq!(a.particles.colors(), b.particles.colors());
    assert_eq!(a.grid.u, b.grid.u);
    assert_eq!(a.grid.v, b.grid.v);
}

/// A zero-length step leaves well-separated interior particles where they are
#[test]
fn test_zero_dt_does_not_move_particles() {
    let mut sim = tank(1.0, 0.75, 200);
    // Spacing 3r, so separation has nothing to do
    let block = hex_block(Vec2::new(0.2, 0.2), 1.5 * RADIUS, 10, 10);
    sim.seed_particles(&block).unwrap();

    let config = StepConfig {
        dt: 0.0,
        ..Default::default()
    };
    for _ in 0..5 {
        sim.simulate(&config, &Obstacle::none());
    }

    assert_eq!(sim.particles.positions(), block.as_slice());
    assert!(!sim.has_non_finite());
}

/// Render buffers stay consistent with the particle count through a run
#[test]
fn test_render_buffers_track_state() {
    let mut sim = tank(1.0, 0.75, 500);
    sim.seed_particles(&hex_block(origin(), RADIUS, 20, 10)).unwrap();
    sim.simulate(&StepConfig::default(), &Obstacle::none());

    let n = sim.particles.num_particles();
    assert_eq!(sim.particles.position_buffer().len(), 2 * n);
    assert_eq!(sim.particles.color_buffer().len(), 3 * n);
    assert_eq!(sim.grid.cell_color_buffer().len(), 3 * sim.grid.num_cells());
    assert!(sim
        .particles
        .color_buffer()
        .iter()
        .all(|c| (0.0..=1.0).contains(c)));
}
