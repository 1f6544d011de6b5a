//! Construction and restore errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),

    #[error("domain extents must be positive and finite, got {width} x {height}")]
    InvalidDomain { width: f32, height: f32 },

    #[error("domain {width} x {height} holds fewer than 3 cells per axis at cell size {h}")]
    DomainTooSmall { width: f32, height: f32, h: f32 },

    #[error("particle radius must be positive and finite, got {0}")]
    InvalidParticleRadius(f32),

    #[error("particle capacity must be at least 1")]
    ZeroCapacity,

    #[error("requested {requested} particles but capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("state payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
