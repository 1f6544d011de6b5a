//! Bilinear stencils on the staggered grid.
//!
//! Every transfer (particle to face, face to particle, particle to cell centre)
//! goes through the same four-node stencil so the scatter and gather weights match.

use glam::Vec2;

use super::{CellType, Grid};

/// Which sample layout a stencil addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// Left faces: offset (0, h/2)
    U,
    /// Bottom faces: offset (h/2, 0)
    V,
    /// Cell centres: offset (h/2, h/2)
    Center,
}

/// Velocity component
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    pub fn field(self) -> Field {
        match self {
            Axis::X => Field::U,
            Axis::Y => Field::V,
        }
    }
}

impl Field {
    #[inline]
    fn offset(self, h: f32) -> Vec2 {
        let half = 0.5 * h;
        match self {
            Field::U => Vec2::new(0.0, half),
            Field::V => Vec2::new(half, 0.0),
            Field::Center => Vec2::splat(half),
        }
    }
}

/// Four grid nodes and their bilinear weights (weights sum to 1)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stencil {
    pub indices: [usize; 4],
    pub weights: [f32; 4],
}

impl Stencil {
    /// Weighted sum of `values` at the stencil nodes
    #[inline]
    pub fn gather(&self, values: &[f32]) -> f32 {
        self.indices
            .iter()
            .zip(&self.weights)
            .map(|(&idx, &w)| w * values[idx])
            .sum()
    }

    /// Accumulate `value` into `field` and the weights into `weights`
    #[inline]
    pub fn scatter(&self, value: f32, field: &mut [f32], weights: &mut [f32]) {
        for (&idx, &w) in self.indices.iter().zip(&self.weights) {
            field[idx] += w * value;
            weights[idx] += w;
        }
    }

    /// Accumulate the weights alone (particle counting)
    #[inline]
    pub fn splat(&self, field: &mut [f32]) {
        for (&idx, &w) in self.indices.iter().zip(&self.weights) {
            field[idx] += w;
        }
    }
}

impl Grid {
    /// Bilinear stencil of `field` around `pos`.
    ///
    /// The position is clamped to `[h, (n - 1) h]` on each axis first, so the
    /// stencil never reaches outside the grid.
    pub fn stencil(&self, pos: Vec2, field: Field) -> Stencil {
        let h = self.h;
        let h1 = self.inv_spacing;
        let offset = field.offset(h);

        let x = pos.x.clamp(h, (self.num_x - 1) as f32 * h) - offset.x;
        let y = pos.y.clamp(h, (self.num_y - 1) as f32 * h) - offset.y;

        let x0 = ((x * h1).floor().max(0.0) as usize).min(self.num_x - 2);
        let tx = (x - x0 as f32 * h) * h1;
        let x1 = (x0 + 1).min(self.num_x - 2);

        let y0 = ((y * h1).floor().max(0.0) as usize).min(self.num_y - 2);
        let ty = (y - y0 as f32 * h) * h1;
        let y1 = (y0 + 1).min(self.num_y - 2);

        let sx = 1.0 - tx;
        let sy = 1.0 - ty;
        let n = self.num_y;

        Stencil {
            indices: [x0 * n + y0, x1 * n + y0, x1 * n + y1, x0 * n + y1],
            weights: [sx * sy, tx * sy, tx * ty, sx * ty],
        }
    }

    /// Sample one velocity component for grid-to-particle transfer.
    ///
    /// Returns `(pic, delta)`: the interpolated current velocity and the
    /// interpolated change since particle-to-grid. A face contributes only if
    /// one of the two cells it separates is not air. `None` when no face is valid.
    pub fn sample_flip(&self, pos: Vec2, axis: Axis) -> Option<(f32, f32)> {
        let stencil = self.stencil(pos, axis.field());
        let (values, prev, stride) = match axis {
            Axis::X => (&self.u, &self.u_prev, self.num_y),
            Axis::Y => (&self.v, &self.v_prev, 1),
        };

        let mut weight = 0.0;
        let mut pic = 0.0;
        let mut delta = 0.0;
        for (&idx, &w) in stencil.indices.iter().zip(&stencil.weights) {
            let neighbor_open = idx
                .checked_sub(stride)
                .is_some_and(|nb| self.cell_type[nb] != CellType::Air);
            if self.cell_type[idx] == CellType::Air && !neighbor_open {
                continue;
            }
            weight += w;
            pic += w * values[idx];
            delta += w * (values[idx] - prev[idx]);
        }

        if weight > 0.0 {
            Some((pic / weight, delta / weight))
        } else {
            None
        }
    }
}
