//! Headless dam break: collapse a block of fluid and print step diagnostics.
//!
//! Run with: RUST_LOG=debug cargo run -p fludio-sim --example dam_break --release

use fludio_sim::physics::{DEFAULT_OBSTACLE_RADIUS, WATER_DENSITY};
use fludio_sim::{dam_break_block, ColorConfig, FlipSimulation, Obstacle, SimState, StepConfig, ViewSettings};
use glam::Vec2;

const WIDTH: f32 = 1.0;
const HEIGHT: f32 = 0.75;
const RESOLUTION: f32 = 100.0;
const STEPS: usize = 300;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let h = HEIGHT / RESOLUTION;
    let radius = 0.3 * h;
    let block = dam_break_block(WIDTH, HEIGHT, h, radius, 0.6, 0.8);

    let mut sim = FlipSimulation::new(
        WATER_DENSITY,
        WIDTH,
        HEIGHT,
        h,
        radius,
        block.len(),
        ColorConfig::default(),
    )?;
    sim.seed_particles(&block)?;

    let config = StepConfig::default();
    let mut obstacle = Obstacle::new(Vec2::new(0.85 * WIDTH, 0.5 * HEIGHT), DEFAULT_OBSTACLE_RADIUS);

    println!(
        "{} particles on a {}x{} grid",
        sim.particles.num_particles(),
        sim.grid.num_x,
        sim.grid.num_y
    );

    for step in 0..STEPS {
        // Sweep the obstacle left through the first two seconds
        if step < 120 {
            let x = 0.85 * WIDTH - 0.5 * WIDTH * step as f32 / 120.0;
            obstacle.move_to(Vec2::new(x, 0.5 * HEIGHT), config.dt);
        } else {
            obstacle.stop();
        }

        let metrics = sim.simulate_with_diagnostics(&config, &obstacle);
        if step % 30 == 0 {
            let line: Vec<String> = metrics
                .iter()
                .map(|(name, value)| format!("{name}={value:.4}"))
                .collect();
            println!("step {:4}: {}", step, line.join(" "));
        }
    }

    let state = SimState::capture(&sim, &config, &ViewSettings::default(), false);
    println!("{}", state.to_json()?);
    Ok(())
}
