//! Fludio - Simulation Library
//!
//! 2-D PIC/FLIP fluid simulation with:
//! - Particle-based fluid in a closed tank with an open top
//! - MAC grid for pressure solving with drift compensation
//! - A movable circular obstacle
//! - Density-driven particle coloring
//!
//! This crate is framework-agnostic - it handles simulation only.
//! Position and color buffers are exposed as flat `f32` slices for any renderer.

pub mod color;
pub mod error;
pub mod flip;
pub mod grid;
pub mod particle;
pub mod physics;
pub mod scene;
pub mod state;

pub use color::{ColorConfig, Rgb};
pub use error::{SimError, SimResult};
pub use flip::FlipSimulation;
pub use grid::{Axis, CellType, Field, Grid, Stencil};
pub use particle::{ParticleSystem, SpatialHash};
pub use scene::{dam_break_block, hex_block, Obstacle, StepConfig};
pub use state::{ParticleRecord, SimState, ViewSettings};
