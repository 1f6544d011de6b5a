//! Density-driven particle coloring.
//!
//! Each particle samples the relative density of the cell it sits in and
//! eases toward the low or high color, at most `COLOR_RATE` per channel per step.

use rayon::prelude::*;

use super::ParticleSystem;
use crate::color::{step_toward, ColorConfig};
use crate::grid::Grid;

impl ParticleSystem {
    /// Ease each particle color toward the target for its cell's density
    pub fn update_colors(&mut self, grid: &Grid, config: &ColorConfig) {
        let h1 = grid.inv_spacing();
        let max_x = grid.num_x - 1;
        let max_y = grid.num_y - 1;

        self.pos
            .par_iter()
            .zip(self.color.par_iter_mut())
            .for_each(|(p, c)| {
                let xi = ((p.x * h1).floor().max(1.0) as usize).min(max_x);
                let yi = ((p.y * h1).floor().max(1.0) as usize).min(max_y);
                let rel = grid.relative_density(grid.index(xi, yi));
                *c = step_toward(*c, config.target(rel));
            });
    }
}
