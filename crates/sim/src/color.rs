//! Particle and cell coloring.
//!
//! Particles drift toward one of two configured colors depending on the
//! density of the cell they sit in. Cells use a fixed blue→red ramp.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::COLOR_RATE;

/// Linear RGB color, channels in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    #[inline]
    pub fn from_vec3(c: Vec3) -> Self {
        Self::new(c.x, c.y, c.z)
    }
}

/// Density-driven particle color mapping. Safe to retune between steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Relative density (density / rest density) separating `low` from `high`.
    pub threshold: f32,
    /// Color of sparse regions (spray, free surface).
    pub low: Rgb,
    /// Color of the dense fluid body.
    pub high: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            low: Rgb::new(1.0, 0.5, 0.0),
            high: Rgb::new(0.4, 0.0, 0.3),
        }
    }
}

impl ColorConfig {
    /// Target color for a particle in a cell with the given relative density.
    #[inline]
    pub fn target(&self, relative_density: f32) -> Vec3 {
        if relative_density < self.threshold {
            self.low.to_vec3()
        } else {
            self.high.to_vec3()
        }
    }
}

/// Move `color` toward `target` by at most [`COLOR_RATE`] per channel.
///
/// Never overshoots, so repeated calls converge monotonically.
#[inline]
pub fn step_toward(color: Vec3, target: Vec3) -> Vec3 {
    let rate = Vec3::splat(COLOR_RATE);
    color + (target - color).clamp(-rate, rate)
}

/// Scientific color ramp: blue → cyan → green → yellow → red over `[min, max]`.
pub fn sci_color(val: f32, min: f32, max: f32) -> Vec3 {
    let span = max - min;
    let d = if span > 0.0 {
        ((val.clamp(min, max - 0.0001 * span)) - min) / span
    } else {
        0.5
    };
    let segment = (4.0 * d).floor();
    let s = (d - segment / 4.0) * 4.0;
    match segment as i32 {
        0 => Vec3::new(0.0, s, 1.0),
        1 => Vec3::new(0.0, 1.0, 1.0 - s),
        2 => Vec3::new(s, 1.0, 0.0),
        _ => Vec3::new(1.0, 1.0 - s, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_switches_at_threshold() {
        let config = ColorConfig::default();
        assert_eq!(config.target(0.5), config.low.to_vec3());
        assert_eq!(config.target(0.8), config.high.to_vec3());
        assert_eq!(config.target(1.5), config.high.to_vec3());
    }

    #[test]
    fn test_step_toward_never_overshoots() {
        let target = Vec3::new(0.5, 0.5, 0.5);
        let close = Vec3::new(0.495, 0.5, 0.505);
        assert_eq!(step_toward(close, target), target);

        let far = Vec3::ZERO;
        let next = step_toward(far, target);
        assert!((next.x - COLOR_RATE).abs() < 1e-7);
    }

    #[test]
    fn test_sci_color_endpoints() {
        let lo = sci_color(0.0, 0.0, 2.0);
        let hi = sci_color(2.0, 0.0, 2.0);
        assert_eq!(lo, Vec3::new(0.0, 0.0, 1.0));
        assert!(hi.x > 0.99 && hi.z == 0.0, "top of ramp should be red, got {hi:?}");
    }

    #[test]
    fn test_sci_color_channels_in_range() {
        for k in 0..=40 {
            let c = sci_color(k as f32 * 0.05, 0.0, 2.0);
            for ch in c.to_array() {
                assert!((0.0..=1.0).contains(&ch), "channel {ch} out of range at {k}");
            }
        }
    }
}
