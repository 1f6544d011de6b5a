//! Particle <-> grid transfers.
//!
//! Particle-to-grid splats velocities onto the staggered faces with bilinear
//! weights; grid-to-particle blends the PIC sample with the FLIP delta.

use rayon::prelude::*;

use super::ParticleSystem;
use crate::grid::{Axis, CellType, Field, Grid};

impl ParticleSystem {
    /// Classify cells, then splat particle velocities onto the faces.
    ///
    /// Faces no particle reaches keep their previous velocity. Faces touching a
    /// solid cell keep their pre-transfer value. On return `u_prev`/`v_prev`
    /// hold the transferred field, the baseline for the FLIP delta.
    pub fn transfer_to_grid(&self, grid: &mut Grid) {
        let n = grid.num_y;

        for idx in 0..grid.num_cells() {
            grid.cell_type[idx] = if grid.s[idx] == 0.0 {
                CellType::Solid
            } else {
                CellType::Air
            };
        }
        for p in &self.pos {
            let idx = grid.cell_index_of(*p);
            if grid.cell_type[idx] == CellType::Air {
                grid.cell_type[idx] = CellType::Fluid;
            }
        }

        grid.u_prev.copy_from_slice(&grid.u);
        grid.v_prev.copy_from_slice(&grid.v);
        grid.u.fill(0.0);
        grid.v.fill(0.0);
        grid.reset_for_timestep();

        for (p, v) in self.pos.iter().zip(&self.vel) {
            let st = grid.stencil(*p, Field::U);
            st.scatter(v.x, &mut grid.u, &mut grid.du);
            let st = grid.stencil(*p, Field::V);
            st.scatter(v.y, &mut grid.v, &mut grid.dv);
        }

        for idx in 0..grid.num_cells() {
            if grid.du[idx] > 0.0 {
                grid.u[idx] /= grid.du[idx];
            } else {
                grid.u[idx] = grid.u_prev[idx];
            }
            if grid.dv[idx] > 0.0 {
                grid.v[idx] /= grid.dv[idx];
            } else {
                grid.v[idx] = grid.v_prev[idx];
            }
        }

        for i in 0..grid.num_x {
            for j in 0..grid.num_y {
                let idx = grid.index(i, j);
                let solid = grid.cell_type[idx].is_solid();
                if solid || (i > 0 && grid.cell_type[idx - n].is_solid()) {
                    grid.u[idx] = grid.u_prev[idx];
                }
                if solid || (j > 0 && grid.cell_type[idx - 1].is_solid()) {
                    grid.v[idx] = grid.v_prev[idx];
                }
            }
        }

        grid.u_prev.copy_from_slice(&grid.u);
        grid.v_prev.copy_from_slice(&grid.v);
    }

    /// Recount smoothed particles per cell.
    ///
    /// The first call that finds fluid also fixes the rest density, measured
    /// over fully surrounded fluid cells.
    pub fn update_particle_density(&self, grid: &mut Grid) {
        grid.particle_density.fill(0.0);
        for p in &self.pos {
            let st = grid.stencil(*p, Field::Center);
            st.splat(&mut grid.particle_density);
        }

        if grid.rest_density == 0.0 {
            let rest = grid.measure_rest_density();
            if rest > 0.0 {
                grid.rest_density = rest;
                log::debug!("rest density set to {:.3} particles per cell", rest);
            }
        }
    }

    /// Blend grid velocities back onto particles.
    ///
    /// `flip_ratio` 0 takes the interpolated velocity (PIC), 1 adds the
    /// interpolated change to the particle's own velocity (FLIP). A component
    /// with no valid faces nearby is left unchanged.
    pub fn transfer_from_grid(&mut self, grid: &Grid, flip_ratio: f32) {
        let pic_ratio = 1.0 - flip_ratio;
        self.pos
            .par_iter()
            .zip(self.vel.par_iter_mut())
            .for_each(|(p, v)| {
                if let Some((pic, delta)) = grid.sample_flip(*p, Axis::X) {
                    v.x = flip_ratio * (v.x + delta) + pic_ratio * pic;
                }
                if let Some((pic, delta)) = grid.sample_flip(*p, Axis::Y) {
                    v.y = flip_ratio * (v.y + delta) + pic_ratio * pic;
                }
            });
    }
}
