//! Shared solver constants and step defaults.
//!
//! All simulation modules should use these constants instead of defining their own.
//! This prevents drift between subsystems and makes tuning easier.

/// Default gravity in m/s² (negative = down).
///
/// Physical gravity for a tank measured in metres. Tanks in larger units
/// want a weaker value through `StepConfig`, e.g. -0.3 for a 3-unit-tall tank.
pub const DEFAULT_GRAVITY: f32 = -9.81;

/// Default timestep: one rendered frame at 60 Hz.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default PIC/FLIP blend (0 = pure PIC, 1 = pure FLIP).
pub const DEFAULT_FLIP_RATIO: f32 = 0.7;

/// Gauss-Seidel sweeps per pressure solve.
pub const DEFAULT_PRESSURE_ITERS: usize = 50;

/// Separation passes per step.
pub const DEFAULT_PARTICLE_ITERS: usize = 2;

/// Successive over-relaxation factor for the pressure solve. Must stay in (0, 2).
///
/// 1.9 converges in fewer sweeps than a conservative 1.2.
pub const DEFAULT_OVER_RELAXATION: f32 = 1.9;

/// Default obstacle radius in world units.
pub const DEFAULT_OBSTACLE_RADIUS: f32 = 0.1;

/// Reference fluid density (kg/m³). Only scales the diagnostic pressure field.
pub const WATER_DENSITY: f32 = 1000.0;

/// Drift compensation stiffness `k`.
///
/// Over-dense cells get an extra outflow of
/// `k * (h / dt) * (density - rest_density) / rest_density`, so `k` is the
/// fraction of a cell's excess volume pushed out per step. The term is
/// independent of cell size and particle count per cell.
pub const DRIFT_STIFFNESS: f32 = 0.05;

/// Maximum per-channel color change per step.
pub const COLOR_RATE: f32 = 0.01;

/// Spatial hash cell size as a multiple of the particle radius.
/// Must be >= 2.0 so a 3x3 neighbourhood covers every overlapping pair.
pub const HASH_SPACING_SCALE: f32 = 2.2;
