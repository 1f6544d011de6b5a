//! Particle separation.
//!
//! Overlapping pairs are pushed apart symmetrically, Gauss-Seidel style,
//! using a linked-list spatial hash rebuilt before every pass.
//!
//! One pass fixes isolated pairs exactly. In a crowded block each push can
//! drive a particle into its other neighbours, so a pass only guarantees the
//! pairs it corrects. Overlap keeps shrinking with more passes because every
//! pass sees the positions the previous one produced.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::ParticleSystem;
use crate::physics::HASH_SPACING_SCALE;

/// Uniform-grid hash over particle indices.
///
/// Buffers are allocated once and refilled in place on every build.
#[derive(Clone, Debug)]
pub struct SpatialHash {
    inv_spacing: f32,
    num_x: usize,
    num_y: usize,
    cell_head: Vec<i32>,     // First particle in each cell (-1 = empty)
    particle_next: Vec<i32>, // Next particle in the same cell (-1 = end)
}

impl SpatialHash {
    /// Hash covering `width x height` with cells of `HASH_SPACING_SCALE * radius`.
    pub fn new(width: f32, height: f32, radius: f32, max_particles: usize) -> Self {
        let spacing = HASH_SPACING_SCALE * radius;
        let inv_spacing = 1.0 / spacing;
        let num_x = (width * inv_spacing).floor() as usize + 1;
        let num_y = (height * inv_spacing).floor() as usize + 1;
        Self {
            inv_spacing,
            num_x,
            num_y,
            cell_head: vec![-1; num_x * num_y],
            particle_next: vec![-1; max_particles],
        }
    }

    #[inline]
    fn cell_coords(&self, p: Vec2) -> (usize, usize) {
        let xi = ((p.x * self.inv_spacing).floor().max(0.0) as usize).min(self.num_x - 1);
        let yi = ((p.y * self.inv_spacing).floor().max(0.0) as usize).min(self.num_y - 1);
        (xi, yi)
    }

    /// Insert every particle at the head of its cell's list
    pub fn build(&mut self, positions: &[Vec2]) {
        self.cell_head.fill(-1);
        if self.particle_next.len() < positions.len() {
            self.particle_next.resize(positions.len(), -1);
        }

        for (idx, p) in positions.iter().enumerate() {
            let (xi, yi) = self.cell_coords(*p);
            let cell = xi * self.num_y + yi;
            self.particle_next[idx] = self.cell_head[cell];
            self.cell_head[cell] = idx as i32;
        }
    }

    /// Visit every particle in the 3x3 block of cells around `p`
    pub fn for_each_neighbor(&self, p: Vec2, mut f: impl FnMut(usize)) {
        let (xi, yi) = self.cell_coords(p);
        let x0 = xi.saturating_sub(1);
        let x1 = (xi + 1).min(self.num_x - 1);
        let y0 = yi.saturating_sub(1);
        let y1 = (yi + 1).min(self.num_y - 1);

        for cx in x0..=x1 {
            for cy in y0..=y1 {
                let mut j = self.cell_head[cx * self.num_y + cy];
                while j >= 0 {
                    let j_idx = j as usize;
                    f(j_idx);
                    j = self.particle_next[j_idx];
                }
            }
        }
    }
}

/// Unit direction for separating two coincident particles.
///
/// Seeded from the pair so repeated runs separate identically.
fn coincident_direction(lo: usize, hi: usize) -> Vec2 {
    let seed = ((lo as u64) << 32) ^ hi as u64;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU))
}

impl ParticleSystem {
    /// Push overlapping particles apart until centres are `2 * radius` apart.
    ///
    /// Each of the `num_iters` sweeps rebuilds the hash from the current
    /// positions, then corrects each pair in place.
    pub fn push_particles_apart(&mut self, num_iters: usize) {
        let count = self.pos.len();
        if count < 2 || num_iters == 0 {
            return;
        }

        let Self { pos, hash, radius, .. } = self;
        let min_dist = 2.0 * *radius;
        let min_dist_sq = min_dist * min_dist;

        for _ in 0..num_iters {
            // Pushes can carry particles across hash cells
            hash.build(pos.as_slice());
            for i in 0..count {
                let p = pos[i];
                hash.for_each_neighbor(p, |j| {
                    if j == i {
                        return;
                    }
                    let d = pos[j] - pos[i];
                    let d_sq = d.length_squared();
                    if d_sq >= min_dist_sq {
                        return;
                    }

                    if d_sq == 0.0 {
                        let (lo, hi) = (i.min(j), i.max(j));
                        let offset = coincident_direction(lo, hi) * (0.5 * min_dist);
                        pos[lo] -= offset;
                        pos[hi] += offset;
                        return;
                    }

                    let dist = d_sq.sqrt();
                    let correction = d * (0.5 * (min_dist - dist) / dist);
                    pos[i] -= correction;
                    pos[j] += correction;
                });
            }
        }
    }
}
