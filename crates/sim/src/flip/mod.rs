//! FLIP/PIC simulation
//!
//! Particles carry the fluid; the grid only exists long enough each step to
//! make the velocity field incompressible.
//!
//! Algorithm:
//! 1. Advect particles under gravity
//! 2. Push overlapping particles apart
//! 3. Resolve obstacle and wall collisions
//! 4. Transfer particle velocities to grid (P2G)
//! 5. Measure particle density per cell
//! 6. Mark solid cells and obstacle face velocities
//! 7. Pressure projection with optional drift compensation
//! 8. Transfer grid velocities back to particles (G2P)
//! 9. Update particle and cell colors
//!
//! Reference: Zhu & Bridson 2005 "Animating Sand as a Fluid"

mod diagnostics;

use glam::Vec2;

use crate::color::ColorConfig;
use crate::error::SimResult;
use crate::grid::Grid;
use crate::particle::ParticleSystem;
use crate::scene::{Obstacle, StepConfig};

/// FLIP simulation state
#[derive(Clone, Debug)]
pub struct FlipSimulation {
    pub grid: Grid,
    pub particles: ParticleSystem,
    /// Particle color mapping, may be changed between steps
    pub color_config: ColorConfig,
}

impl FlipSimulation {
    /// Build an empty tank.
    ///
    /// * `density` - fluid density, only scales the diagnostic pressure
    /// * `width`, `height` - domain extents in world units
    /// * `h` - grid cell size
    /// * `radius` - particle radius
    /// * `max_particles` - fixed particle capacity
    pub fn new(
        density: f32,
        width: f32,
        height: f32,
        h: f32,
        radius: f32,
        max_particles: usize,
        color_config: ColorConfig,
    ) -> SimResult<Self> {
        let grid = Grid::new(density, width, height, h)?;
        let particles = ParticleSystem::new(max_particles, radius, &grid)?;

        log::info!(
            "FLIP tank {}x{} cells (h = {}), capacity {} particles of radius {}",
            grid.num_x,
            grid.num_y,
            h,
            max_particles,
            radius
        );

        Ok(Self {
            grid,
            particles,
            color_config,
        })
    }

    /// Replace all particles with resting ones at `positions`, colored `high`.
    ///
    /// The rest density is measured again on the next step.
    pub fn seed_particles(&mut self, positions: &[Vec2]) -> SimResult<()> {
        self.particles
            .seed(positions, self.color_config.high.to_vec3())?;
        self.grid.reset_rest_density();
        Ok(())
    }

    /// Advance one step
    pub fn simulate(&mut self, config: &StepConfig, obstacle: &Obstacle) {
        self.advect(config, obstacle);
        self.prepare_grid(obstacle);
        self.solve(config);
        self.finish_step(config);
    }

    /// Steps 1-3: move particles and resolve contacts
    fn advect(&mut self, config: &StepConfig, obstacle: &Obstacle) {
        self.particles.integrate(config.dt, config.gravity);
        if config.separate_particles {
            self.particles.push_particles_apart(config.num_particle_iters);
        }
        self.particles.handle_collisions(obstacle);
    }

    /// Steps 4-6: build the grid field the solve works on
    fn prepare_grid(&mut self, obstacle: &Obstacle) {
        self.grid.reset_for_timestep();
        self.particles.transfer_to_grid(&mut self.grid);
        self.particles.update_particle_density(&mut self.grid);
        self.grid.mark_solid_cells(obstacle);
    }

    /// Step 7: make the grid field divergence-free
    fn solve(&mut self, config: &StepConfig) {
        self.grid.solve_incompressibility(
            config.num_pressure_iters,
            config.over_relaxation,
            config.compensate_drift,
            config.dt,
        );
    }

    /// Steps 8-9: pull velocities back and refresh colors
    fn finish_step(&mut self, config: &StepConfig) {
        self.particles.transfer_from_grid(&self.grid, config.flip_ratio);
        self.particles.update_colors(&self.grid, &self.color_config);
        self.grid.update_cell_colors();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::scene::hex_block;

    fn small_tank(capacity: usize) -> FlipSimulation {
        FlipSimulation::new(1000.0, 1.0, 0.5, 0.05, 0.015, capacity, ColorConfig::default())
            .unwrap()
    }

    #[test]
    fn test_new_propagates_validation_errors() {
        let bad = FlipSimulation::new(1000.0, 1.0, 1.0, 0.0, 0.01, 10, ColorConfig::default());
        assert!(matches!(bad, Err(SimError::InvalidCellSize(_))));
        let bad = FlipSimulation::new(1000.0, 1.0, 1.0, 0.1, 0.01, 0, ColorConfig::default());
        assert!(matches!(bad, Err(SimError::ZeroCapacity)));
    }

    #[test]
    fn test_seed_colors_high_and_resets_rest_density() {
        let mut sim = small_tank(100);
        sim.grid.rest_density = 3.0;
        let block = hex_block(Vec2::splat(0.065), 0.015, 5, 4);
        sim.seed_particles(&block).unwrap();

        assert_eq!(sim.particles.num_particles(), 20);
        assert_eq!(sim.grid.rest_density, 0.0);
        let high = sim.color_config.high.to_vec3();
        assert!(sim.particles.colors().iter().all(|c| *c == high));
    }

    #[test]
    fn test_first_step_measures_rest_density() {
        let mut sim = small_tank(100);
        let block = hex_block(Vec2::splat(0.065), 0.015, 5, 4);
        sim.seed_particles(&block).unwrap();
        sim.simulate(&StepConfig::default(), &Obstacle::none());
        assert!(sim.grid.rest_density > 0.0);
        assert_eq!(sim.particles.num_particles(), 20);
    }
}
