//! Diagnostic methods.
//!
//! Energy, speed and bounds checks used by tests and the demo binary.

use super::FlipSimulation;
use crate::scene::{Obstacle, StepConfig};

impl FlipSimulation {
    /// Total kinetic energy of particles: KE = 1/2 * sum(|v|^2)
    /// Each particle is assumed to have unit mass.
    pub fn kinetic_energy(&self) -> f32 {
        self.particles
            .velocities()
            .iter()
            .map(|v| 0.5 * v.length_squared())
            .sum()
    }

    /// Maximum particle speed (for CFL checking)
    pub fn max_speed(&self) -> f32 {
        self.particles
            .velocities()
            .iter()
            .map(|v| v.length())
            .fold(0.0f32, f32::max)
    }

    /// Maximum |v_y| over all particles
    pub fn max_vertical_speed(&self) -> f32 {
        self.particles
            .velocities()
            .iter()
            .map(|v| v.y.abs())
            .fold(0.0f32, f32::max)
    }

    /// CFL number: v_max * dt / h
    /// Should be < 1 for stability
    pub fn compute_cfl(&self, dt: f32) -> f32 {
        self.max_speed() * dt / self.grid.h
    }

    /// Mean particle density over fluid cells from the last step
    pub fn mean_fluid_density(&self) -> f32 {
        self.grid.mean_fluid_density()
    }

    /// Particles whose centre lies outside the allowed bounds
    pub fn particles_out_of_bounds(&self) -> usize {
        let (lo, hi) = self.particles.bounds();
        let eps = 1e-5;
        self.particles
            .positions()
            .iter()
            .filter(|p| {
                p.x < lo.x - eps || p.y < lo.y - eps || p.x > hi.x + eps || p.y > hi.y + eps
            })
            .count()
    }

    /// Any NaN or infinite position or velocity
    pub fn has_non_finite(&self) -> bool {
        self.particles.positions().iter().any(|p| !p.is_finite())
            || self.particles.velocities().iter().any(|v| !v.is_finite())
    }

    /// Run one step and report named metrics.
    ///
    /// Divergence is measured right after particle-to-grid (before the solve)
    /// and again after the solve.
    pub fn simulate_with_diagnostics(
        &mut self,
        config: &StepConfig,
        obstacle: &Obstacle,
    ) -> Vec<(&'static str, f32)> {
        self.advect(config, obstacle);
        self.prepare_grid(obstacle);
        let div_before = self.grid.total_divergence();
        self.solve(config);
        let div_after = self.grid.total_divergence();

        self.finish_step(config);

        let metrics = vec![
            ("div_before", div_before),
            ("div_after", div_after),
            ("max_speed", self.max_speed()),
            ("cfl", self.compute_cfl(config.dt)),
            ("mean_density", self.mean_fluid_density()),
        ];
        log::debug!(
            "step: div {:.4} -> {:.4}, max speed {:.3}, cfl {:.3}, mean density {:.3}",
            div_before,
            div_after,
            metrics[2].1,
            metrics[3].1,
            metrics[4].1
        );
        metrics
    }
}
