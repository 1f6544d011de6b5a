//! Save/restore payload.
//!
//! A JSON snapshot of the tunables a user can change at runtime, plus an
//! optional particle list. Every field is optional on load so partial payloads
//! only overwrite what they carry. Grid fields are never stored; the next
//! step rebuilds them from the particles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{SimError, SimResult};
use crate::flip::FlipSimulation;
use crate::scene::StepConfig;

/// Presentation settings carried alongside the simulation state
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSettings {
    pub show_particles: bool,
    pub show_grid: bool,
    pub clear_color: [f32; 3],
    pub ball: Rgb,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            show_particles: true,
            show_grid: false,
            clear_color: [0.6, 0.1, 0.3],
            ball: Rgb::new(1.0, 0.5, 0.0),
        }
    }
}

/// One saved particle. Velocity defaults to rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub vx: f32,
    #[serde(default)]
    pub vy: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_ratio: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_color: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_particles: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_grid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensate_drift: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separate_particles: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particles: Option<Vec<ParticleRecord>>,
}

impl SimState {
    /// Snapshot the current settings, with particles if requested
    pub fn capture(
        sim: &FlipSimulation,
        config: &StepConfig,
        view: &ViewSettings,
        include_particles: bool,
    ) -> Self {
        let particles = include_particles.then(|| {
            let ps = &sim.particles;
            ps.positions()
                .iter()
                .zip(ps.velocities())
                .zip(ps.colors())
                .map(|((p, v), c)| ParticleRecord {
                    x: p.x,
                    y: p.y,
                    vx: v.x,
                    vy: v.y,
                    color: Some(Rgb::from_vec3(*c)),
                })
                .collect()
        });

        Self {
            gravity: Some(config.gravity),
            flip_ratio: Some(config.flip_ratio),
            threshold: Some(sim.color_config.threshold),
            low: Some(sim.color_config.low),
            high: Some(sim.color_config.high),
            ball: Some(view.ball),
            clear_color: Some(view.clear_color),
            show_particles: Some(view.show_particles),
            show_grid: Some(view.show_grid),
            compensate_drift: Some(config.compensate_drift),
            separate_particles: Some(config.separate_particles),
            particles,
        }
    }

    /// Write the payload back.
    ///
    /// A particle list larger than capacity is rejected before anything is
    /// changed. Restored particles are clamped into the tank interior and the
    /// rest density is measured again on the next step. An empty list keeps
    /// the current particles.
    pub fn apply(
        &self,
        sim: &mut FlipSimulation,
        config: &mut StepConfig,
        view: &mut ViewSettings,
    ) -> SimResult<()> {
        if let Some(records) = &self.particles {
            let capacity = sim.particles.capacity();
            if records.len() > capacity {
                log::warn!(
                    "rejecting state with {} particles, capacity is {}",
                    records.len(),
                    capacity
                );
                return Err(SimError::CapacityExceeded {
                    requested: records.len(),
                    capacity,
                });
            }
        }

        if let Some(gravity) = self.gravity {
            config.gravity = gravity;
        }
        if let Some(flip_ratio) = self.flip_ratio {
            config.flip_ratio = flip_ratio;
        }
        if let Some(compensate) = self.compensate_drift {
            config.compensate_drift = compensate;
        }
        if let Some(separate) = self.separate_particles {
            config.separate_particles = separate;
        }

        if let Some(threshold) = self.threshold {
            sim.color_config.threshold = threshold;
        }
        if let Some(low) = self.low {
            sim.color_config.low = low;
        }
        if let Some(high) = self.high {
            sim.color_config.high = high;
        }

        if let Some(show) = self.show_particles {
            view.show_particles = show;
        }
        if let Some(show) = self.show_grid {
            view.show_grid = show;
        }
        if let Some(clear_color) = self.clear_color {
            view.clear_color = clear_color;
        }
        if let Some(ball) = self.ball {
            view.ball = ball;
        }

        match &self.particles {
            Some(records) if !records.is_empty() => restore_particles(sim, records),
            _ => Ok(()),
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn restore_particles(sim: &mut FlipSimulation, records: &[ParticleRecord]) -> SimResult<()> {
    let default_color = sim.color_config.high.to_vec3();
    let particles = &mut sim.particles;
    particles.clear();

    let mut clamped = 0usize;
    for record in records {
        let raw = Vec2::new(record.x, record.y);
        let pos = particles.clamp_to_bounds(raw);
        if pos != raw {
            clamped += 1;
        }
        let color = record.color.map_or(default_color, Rgb::to_vec3);
        particles.push(pos, Vec2::new(record.vx, record.vy), color)?;
    }

    if clamped > 0 {
        log::warn!("clamped {} restored particles into the tank interior", clamped);
    }
    sim.grid.reset_rest_density();
    Ok(())
}
