//! Fluid particles for PIC/FLIP simulation
//!
//! Each particle has a continuous position, velocity and display color.
//! Storage is structure-of-arrays with a fixed capacity chosen at construction,
//! so the flat position and color slices can be handed to a renderer as-is.

mod advection;
mod coloring;
mod separation;
mod transfer;

pub use separation::SpatialHash;

use glam::{Vec2, Vec3};

use crate::error::{SimError, SimResult};
use crate::grid::Grid;

/// Particle storage plus the tank bounds particles are clamped to
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    max_particles: usize,
    radius: f32,
    pos: Vec<Vec2>,
    vel: Vec<Vec2>,
    color: Vec<Vec3>,
    /// Lowest allowed centre: one wall cell plus one radius
    min_bound: Vec2,
    /// Highest allowed centre
    max_bound: Vec2,
    hash: SpatialHash,
}

impl ParticleSystem {
    /// Empty system sized for `grid` with room for `max_particles`.
    pub fn new(max_particles: usize, radius: f32, grid: &Grid) -> SimResult<Self> {
        if max_particles == 0 {
            return Err(SimError::ZeroCapacity);
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidParticleRadius(radius));
        }

        let h = grid.h;
        let min_bound = Vec2::splat(h + radius);
        let max_bound = Vec2::new(
            (grid.num_x - 1) as f32 * h - radius,
            (grid.num_y - 1) as f32 * h - radius,
        );
        if min_bound.x > max_bound.x || min_bound.y > max_bound.y {
            return Err(SimError::InvalidParticleRadius(radius));
        }

        Ok(Self {
            max_particles,
            radius,
            pos: Vec::with_capacity(max_particles),
            vel: Vec::with_capacity(max_particles),
            color: Vec::with_capacity(max_particles),
            min_bound,
            max_bound,
            hash: SpatialHash::new(grid.width(), grid.height(), radius, max_particles),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    #[inline]
    pub fn num_particles(&self) -> usize {
        self.pos.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_particles
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Allowed range for particle centres, `(min, max)`
    #[inline]
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.min_bound, self.max_bound)
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.pos
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.vel
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.color
    }

    pub fn positions_mut(&mut self) -> &mut [Vec2] {
        &mut self.pos
    }

    pub fn velocities_mut(&mut self) -> &mut [Vec2] {
        &mut self.vel
    }

    pub fn colors_mut(&mut self) -> &mut [Vec3] {
        &mut self.color
    }

    /// Positions as interleaved x, y floats
    pub fn position_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pos)
    }

    /// Colors as interleaved r, g, b floats
    pub fn color_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.color)
    }

    /// Append one particle, returning its index.
    pub fn push(&mut self, pos: Vec2, vel: Vec2, color: Vec3) -> SimResult<usize> {
        if self.pos.len() >= self.max_particles {
            return Err(SimError::CapacityExceeded {
                requested: self.pos.len() + 1,
                capacity: self.max_particles,
            });
        }
        self.pos.push(pos);
        self.vel.push(vel);
        self.color.push(color);
        Ok(self.pos.len() - 1)
    }

    pub fn clear(&mut self) {
        self.pos.clear();
        self.vel.clear();
        self.color.clear();
    }

    /// Replace all particles with resting ones at `positions`.
    ///
    /// Leaves the system untouched if `positions` exceeds capacity.
    pub fn seed(&mut self, positions: &[Vec2], color: Vec3) -> SimResult<()> {
        if positions.len() > self.max_particles {
            return Err(SimError::CapacityExceeded {
                requested: positions.len(),
                capacity: self.max_particles,
            });
        }
        self.clear();
        self.pos.extend_from_slice(positions);
        self.vel.resize(positions.len(), Vec2::ZERO);
        self.color.resize(positions.len(), color);
        Ok(())
    }

    /// Clamp a point into the particle bounds
    #[inline]
    pub fn clamp_to_bounds(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min_bound, self.max_bound)
    }

    /// Smallest centre-to-centre distance over all pairs (brute force).
    ///
    /// `None` with fewer than two particles.
    pub fn min_pair_distance(&self) -> Option<f32> {
        let mut min_sq: Option<f32> = None;
        for (a, pa) in self.pos.iter().enumerate() {
            for pb in &self.pos[a + 1..] {
                let d = pa.distance_squared(*pb);
                min_sq = Some(min_sq.map_or(d, |m| m.min(d)));
            }
        }
        min_sq.map(f32::sqrt)
    }
}
