//! MAC (Marker-and-Cell) grid for FLIP/PIC fluid simulation
//!
//! Uses staggered grid layout:
//! - u (horizontal velocity) stored on left edges of cells
//! - v (vertical velocity) stored on bottom edges of cells
//! - density, marker and color stored at cell centers
//!
//! All fields are flattened column-major: cell (i, j) lives at `i * num_y + j`.
//! The left, right and bottom rows of cells are permanent solid walls; the top is open.

mod cell_types;
mod interp;
mod pressure;

pub use cell_types::CellType;
pub use interp::{Axis, Field, Stencil};

use glam::{Vec2, Vec3};

use crate::color::sci_color;
use crate::error::{SimError, SimResult};
use crate::scene::Obstacle;

/// Staggered MAC grid for pressure-velocity simulation
#[derive(Clone, Debug)]
pub struct Grid {
    pub num_x: usize,
    pub num_y: usize,
    pub h: f32,
    inv_spacing: f32,
    /// Fluid density, only used to scale the diagnostic pressure.
    pub density: f32,

    /// Horizontal velocity (staggered on left edges)
    pub u: Vec<f32>,
    /// Vertical velocity (staggered on bottom edges)
    pub v: Vec<f32>,
    /// Velocities right after particle-to-grid transfer; FLIP delta = u - u_prev
    pub u_prev: Vec<f32>,
    pub v_prev: Vec<f32>,
    /// Accumulated transfer weights per face (scratch)
    pub du: Vec<f32>,
    pub dv: Vec<f32>,

    /// Diagnostic pressure from the last solve
    pub pressure: Vec<f32>,
    /// 0.0 = solid, 1.0 = open
    pub s: Vec<f32>,
    /// Per-step classification used by the solve and by grid-to-particle sampling
    pub cell_type: Vec<CellType>,

    /// Smoothed particle count per cell
    pub particle_density: Vec<f32>,
    /// Reference density measured on the first step (0 until then)
    pub rest_density: f32,

    /// Visualization color per cell
    pub cell_color: Vec<Vec3>,
}

impl Grid {
    /// Build a tank covering `width x height` with cell size `h`.
    ///
    /// Cell counts are `round(width / h)` and `round(height / h)` and must be at least 3.
    pub fn new(density: f32, width: f32, height: f32, h: f32) -> SimResult<Self> {
        if !(h.is_finite() && h > 0.0) {
            return Err(SimError::InvalidCellSize(h));
        }
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(SimError::InvalidDomain { width, height });
        }

        let num_x = (width / h).round() as usize;
        let num_y = (height / h).round() as usize;
        if num_x < 3 || num_y < 3 {
            return Err(SimError::DomainTooSmall { width, height, h });
        }
        let cell_count = num_x * num_y;

        let mut grid = Self {
            num_x,
            num_y,
            h,
            inv_spacing: 1.0 / h,
            density,
            u: vec![0.0; cell_count],
            v: vec![0.0; cell_count],
            u_prev: vec![0.0; cell_count],
            v_prev: vec![0.0; cell_count],
            du: vec![0.0; cell_count],
            dv: vec![0.0; cell_count],
            pressure: vec![0.0; cell_count],
            s: vec![1.0; cell_count],
            cell_type: vec![CellType::Air; cell_count],
            particle_density: vec![0.0; cell_count],
            rest_density: 0.0,
            cell_color: vec![Vec3::ZERO; cell_count],
        };
        grid.mark_solid_cells(&Obstacle::none());
        Ok(grid)
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.num_x * self.num_y
    }

    #[inline]
    pub fn inv_spacing(&self) -> f32 {
        self.inv_spacing
    }

    /// Flattened index of cell (i, j)
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.num_y + j
    }

    /// Tank wall: left column, right column, bottom row
    #[inline]
    pub fn is_border(&self, i: usize, j: usize) -> bool {
        i == 0 || i == self.num_x - 1 || j == 0
    }

    /// World-space width covered by the grid
    #[inline]
    pub fn width(&self) -> f32 {
        self.num_x as f32 * self.h
    }

    /// World-space height covered by the grid
    #[inline]
    pub fn height(&self) -> f32 {
        self.num_y as f32 * self.h
    }

    #[inline]
    pub fn cell_center(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new((i as f32 + 0.5) * self.h, (j as f32 + 0.5) * self.h)
    }

    /// Index of the cell containing `pos`, clamped to the grid
    #[inline]
    pub fn cell_index_of(&self, pos: Vec2) -> usize {
        let i = ((pos.x * self.inv_spacing).floor().max(0.0) as usize).min(self.num_x - 1);
        let j = ((pos.y * self.inv_spacing).floor().max(0.0) as usize).min(self.num_y - 1);
        self.index(i, j)
    }

    /// Density relative to the rest density (1.0 until the rest density is known)
    #[inline]
    pub fn relative_density(&self, idx: usize) -> f32 {
        if self.rest_density > 0.0 {
            self.particle_density[idx] / self.rest_density
        } else {
            1.0
        }
    }

    /// Clear transfer weights before particle-to-grid
    pub fn reset_for_timestep(&mut self) {
        self.du.fill(0.0);
        self.dv.fill(0.0);
    }

    /// Forget the measured rest density; the next density update measures it again.
    pub fn reset_rest_density(&mut self) {
        self.rest_density = 0.0;
    }

    /// Rebuild the solid marker from the tank walls and the obstacle.
    ///
    /// Faces of obstacle cells take the obstacle velocity and faces touching a wall
    /// are zeroed, in both the live and snapshot arrays so the FLIP delta ignores them.
    pub fn mark_solid_cells(&mut self, obstacle: &Obstacle) {
        let n = self.num_y;
        let r_sq = obstacle.radius * obstacle.radius;

        for i in 0..self.num_x {
            for j in 0..self.num_y {
                let idx = self.index(i, j);
                let border = self.is_border(i, j);
                let inside = !border
                    && obstacle.is_active()
                    && (self.cell_center(i, j) - obstacle.pos).length_squared() < r_sq;

                if border || inside {
                    self.s[idx] = 0.0;
                    self.cell_type[idx] = CellType::Solid;
                } else {
                    self.s[idx] = 1.0;
                    if self.cell_type[idx] == CellType::Solid {
                        // Reopened cell: fluid if particles already splat into it
                        self.cell_type[idx] = if self.particle_density[idx] > 0.0 {
                            CellType::Fluid
                        } else {
                            CellType::Air
                        };
                    }
                }

                if inside {
                    let vel = obstacle.vel;
                    self.set_face_u(idx, vel.x);
                    self.set_face_u(idx + n, vel.x);
                    self.set_face_v(idx, vel.y);
                    self.set_face_v(idx + 1, vel.y);
                }
            }
        }

        // Walls never move
        let last = self.num_x - 1;
        for j in 0..n {
            for idx in [self.index(0, j), self.index(1, j), self.index(last, j)] {
                self.set_face_u(idx, 0.0);
            }
            for idx in [self.index(0, j), self.index(last, j)] {
                self.set_face_v(idx, 0.0);
            }
        }
        for i in 0..self.num_x {
            for idx in [self.index(i, 0), self.index(i, 1)] {
                self.set_face_v(idx, 0.0);
            }
        }
    }

    #[inline]
    fn set_face_u(&mut self, idx: usize, value: f32) {
        self.u[idx] = value;
        self.u_prev[idx] = value;
    }

    #[inline]
    fn set_face_v(&mut self, idx: usize, value: f32) {
        self.v[idx] = value;
        self.v_prev[idx] = value;
    }

    /// Mean particle density over fluid cells
    pub fn mean_fluid_density(&self) -> f32 {
        let (sum, count) = self
            .cell_type
            .iter()
            .zip(&self.particle_density)
            .filter(|(kind, _)| **kind == CellType::Fluid)
            .fold((0.0, 0usize), |(sum, count), (_, d)| (sum + d, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// Rest density estimate from the current particle density.
    ///
    /// Averages fluid cells whose four neighbours are also fluid, so thin
    /// surface and wall layers do not pull the reference down. Falls back to
    /// every fluid cell when no cell is fully surrounded.
    pub fn measure_rest_density(&self) -> f32 {
        let n = self.num_y;
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 1..self.num_x - 1 {
            for j in 1..self.num_y - 1 {
                let c = self.index(i, j);
                let surrounded = [c, c - n, c + n, c - 1, c + 1]
                    .iter()
                    .all(|&k| self.cell_type[k] == CellType::Fluid);
                if surrounded {
                    sum += self.particle_density[c];
                    count += 1;
                }
            }
        }
        if count == 0 {
            self.mean_fluid_density()
        } else {
            sum / count as f32
        }
    }

    /// Refresh the visualization colors from density and cell type
    pub fn update_cell_colors(&mut self) {
        for idx in 0..self.num_cells() {
            self.cell_color[idx] = match self.cell_type[idx] {
                CellType::Solid => Vec3::splat(0.5),
                CellType::Fluid => sci_color(self.relative_density(idx), 0.0, 2.0),
                CellType::Air => Vec3::ZERO,
            };
        }
    }

    /// Cell colors as interleaved RGB floats
    pub fn cell_color_buffer(&self) -> &[f32] {
        bytemuck::cast_slice(&self.cell_color)
    }
}
