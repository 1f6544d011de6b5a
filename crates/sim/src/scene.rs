//! Per-step inputs owned by the caller: step parameters, obstacle state,
//! and helpers for seeding the initial particle block.

use glam::Vec2;

use crate::physics::{
    DEFAULT_DT, DEFAULT_FLIP_RATIO, DEFAULT_GRAVITY, DEFAULT_OVER_RELAXATION,
    DEFAULT_PARTICLE_ITERS, DEFAULT_PRESSURE_ITERS,
};

/// Parameters for one call to [`FlipSimulation::simulate`](crate::FlipSimulation::simulate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepConfig {
    pub dt: f32,
    /// Vertical acceleration, negative pulls down.
    pub gravity: f32,
    /// PIC/FLIP blend in [0, 1]. 0 is smooth and diffusive, 1 is lively and noisy.
    pub flip_ratio: f32,
    pub num_pressure_iters: usize,
    pub num_particle_iters: usize,
    /// SOR factor in (0, 2).
    pub over_relaxation: f32,
    /// Push apart over-dense cells during the pressure solve.
    pub compensate_drift: bool,
    /// Run the particle separation passes.
    pub separate_particles: bool,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            gravity: DEFAULT_GRAVITY,
            flip_ratio: DEFAULT_FLIP_RATIO,
            num_pressure_iters: DEFAULT_PRESSURE_ITERS,
            num_particle_iters: DEFAULT_PARTICLE_ITERS,
            over_relaxation: DEFAULT_OVER_RELAXATION,
            compensate_drift: true,
            separate_particles: true,
        }
    }
}

/// Circular obstacle dragged through the tank.
///
/// A radius <= 0 disables it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Obstacle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Obstacle {
    /// Static obstacle at `pos`.
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }

    /// No obstacle at all.
    pub fn none() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.radius > 0.0
    }

    /// Teleport without imparting velocity (pointer down, scene reset).
    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
    }

    /// Move to `pos` over `dt`; the displacement becomes the obstacle velocity.
    pub fn move_to(&mut self, pos: Vec2, dt: f32) {
        self.vel = if dt > 0.0 {
            (pos - self.pos) / dt
        } else {
            Vec2::ZERO
        };
        self.pos = pos;
    }

    /// Keep the position, drop the velocity (pointer released).
    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }
}

/// Hexagonally packed block of particle centres.
///
/// Neighbours sit exactly `2 * radius` apart; odd rows are shifted right by `radius`.
pub fn hex_block(origin: Vec2, radius: f32, cols: usize, rows: usize) -> Vec<Vec2> {
    let dx = 2.0 * radius;
    let dy = 3.0_f32.sqrt() * radius;
    let mut positions = Vec::with_capacity(cols * rows);
    for i in 0..cols {
        for j in 0..rows {
            let shift = if j % 2 == 0 { 0.0 } else { radius };
            positions.push(origin + Vec2::new(dx * i as f32 + shift, dy * j as f32));
        }
    }
    positions
}

/// Dam-break layout: a hex block filling `rel_width x rel_height` of the tank
/// from the lower-left corner, kept clear of the one-cell wall.
pub fn dam_break_block(
    width: f32,
    height: f32,
    h: f32,
    radius: f32,
    rel_width: f32,
    rel_height: f32,
) -> Vec<Vec2> {
    let dx = 2.0 * radius;
    let dy = 3.0_f32.sqrt() * radius;
    let cols = ((rel_width * width - 2.0 * h - 2.0 * radius) / dx).floor().max(0.0) as usize;
    let rows = ((rel_height * height - 2.0 * h - 2.0 * radius) / dy).floor().max(0.0) as usize;
    hex_block(Vec2::splat(h + radius), radius, cols, rows)
}
