//! Pressure projection.
//!
//! Gauss-Seidel with successive over-relaxation, run directly on the face
//! velocities. Solid faces (s = 0) never receive a correction.

use super::{CellType, Grid};
use crate::physics::DRIFT_STIFFNESS;

impl Grid {
    /// Net outflow of cell (i, j). Interior cells only.
    #[inline]
    pub fn divergence_at(&self, i: usize, j: usize) -> f32 {
        let n = self.num_y;
        let c = self.index(i, j);
        self.u[c + n] - self.u[c] + self.v[c + 1] - self.v[c]
    }

    /// Sum of |divergence| over fluid cells that have at least one open neighbour
    pub fn total_divergence(&self) -> f32 {
        let mut total = 0.0;
        for i in 1..self.num_x - 1 {
            for j in 1..self.num_y - 1 {
                let c = self.index(i, j);
                if self.cell_type[c] != CellType::Fluid || self.open_neighbors(i, j) == 0.0 {
                    continue;
                }
                total += self.divergence_at(i, j).abs();
            }
        }
        total
    }

    #[inline]
    fn open_neighbors(&self, i: usize, j: usize) -> f32 {
        let n = self.num_y;
        let c = self.index(i, j);
        self.s[c - n] + self.s[c + n] + self.s[c - 1] + self.s[c + 1]
    }

    /// Make the velocity field divergence-free in fluid cells.
    ///
    /// With `compensate_drift`, a known rest density and `dt > 0`, over-dense
    /// cells get an extra outflow proportional to their relative excess
    /// density (see `DRIFT_STIFFNESS`).
    pub fn solve_incompressibility(
        &mut self,
        num_iters: usize,
        over_relaxation: f32,
        compensate_drift: bool,
        dt: f32,
    ) {
        self.pressure.fill(0.0);
        let n = self.num_y;
        let cp = if dt > 0.0 { self.density * self.h / dt } else { 0.0 };
        let drift = if compensate_drift && self.rest_density > 0.0 && dt > 0.0 {
            DRIFT_STIFFNESS * self.h / (dt * self.rest_density)
        } else {
            0.0
        };

        for _ in 0..num_iters {
            for i in 1..self.num_x - 1 {
                for j in 1..self.num_y - 1 {
                    let c = self.index(i, j);
                    if self.cell_type[c] != CellType::Fluid {
                        continue;
                    }

                    let sx0 = self.s[c - n];
                    let sx1 = self.s[c + n];
                    let sy0 = self.s[c - 1];
                    let sy1 = self.s[c + 1];
                    let s = sx0 + sx1 + sy0 + sy1;
                    if s == 0.0 {
                        continue;
                    }

                    let mut div = self.u[c + n] - self.u[c] + self.v[c + 1] - self.v[c];
                    if drift > 0.0 {
                        let compression = self.particle_density[c] - self.rest_density;
                        if compression > 0.0 {
                            div -= drift * compression;
                        }
                    }

                    let p = -div / s * over_relaxation;
                    self.pressure[c] += cp * p;

                    self.u[c] -= sx0 * p;
                    self.u[c + n] += sx1 * p;
                    self.v[c] -= sy0 * p;
                    self.v[c + 1] += sy1 * p;
                }
            }
        }
    }
}
