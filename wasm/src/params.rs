use glam::Vec3;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::ClothError;
use crate::grid::GridConfig;

pub const MAX_ITERATIONS: u32 = 32;

fn clamp_logged(name: &str, v: f32, lo: f32, hi: f32) -> f32 {
    let c = if v.is_nan() { lo } else { v.max(lo).min(hi) };
    if c != v {
        log::warn!("{name}={v} out of range [{lo}, {hi}], using {c}");
    }
    c
}

/// Per-step solver inputs. May change between steps.
#[wasm_bindgen]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    gravity: f32,
    delta_t: f32,
    resistance: f32,
    spring_constraint: f32,
    iterations: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl SimulationParams {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            gravity: 9.8,
            delta_t: 0.016,
            resistance: 0.01,
            spring_constraint: 0.5,
            iterations: 8,
        }
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }
    pub fn delta_t(&self) -> f32 {
        self.delta_t
    }
    pub fn resistance(&self) -> f32 {
        self.resistance
    }
    pub fn spring_constraint(&self) -> f32 {
        self.spring_constraint
    }
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn set_gravity(&mut self, v: f32) {
        self.gravity = clamp_logged("gravity", v, -1000.0, 1000.0);
    }

    pub fn set_delta_t(&mut self, v: f32) {
        self.delta_t = clamp_logged("delta_t", v, 0.0, 1.0);
    }

    pub fn set_resistance(&mut self, v: f32) {
        self.resistance = clamp_logged("resistance", v, 0.0, 1.0);
    }

    pub fn set_spring_constraint(&mut self, v: f32) {
        // Above 1 the two half-corrections overshoot the rest length.
        self.spring_constraint = clamp_logged("spring_constraint", v, 0.0, 1.0);
    }

    pub fn set_iterations(&mut self, v: u32) {
        if v > MAX_ITERATIONS {
            log::warn!("iterations={v} capped at {MAX_ITERATIONS}");
        }
        self.iterations = v.min(MAX_ITERATIONS);
    }
}

/// Sphere the cloth collides with, in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "SphereFields")]
pub struct SphereCollider {
    center: Vec3,
    radius: f32,
}

/// Serialized sphere; converted through [`SphereCollider::new`] on load.
#[derive(Deserialize)]
struct SphereFields {
    center: Vec3,
    radius: f32,
}

impl From<SphereFields> for SphereCollider {
    fn from(f: SphereFields) -> Self {
        Self::new(f.center, f.radius)
    }
}

impl Default for SphereCollider {
    /// Radius 0: nothing collides.
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

impl SphereCollider {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Resolves a non-uniformly scaled sphere to the largest axis scale.
    pub fn from_transform(center: Vec3, scale: Vec3, base_radius: f32) -> Self {
        Self::new(center, scale.abs().max_element() * base_radius)
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Everything needed to stand up a simulation, loadable from RON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothConfig {
    pub grid: GridConfig,
    pub params: SimulationParams,
    pub sphere: SphereCollider,
}

impl ClothConfig {
    pub fn from_ron(text: &str) -> Result<Self, ClothError> {
        let mut config: Self = ron::from_str(text)?;
        // Route through the setters so file values get the same clamping as JS.
        let raw = config.params.clone();
        config.params.set_gravity(raw.gravity);
        config.params.set_delta_t(raw.delta_t);
        config.params.set_resistance(raw.resistance);
        config.params.set_spring_constraint(raw.spring_constraint);
        config.params.set_iterations(raw.iterations);
        Ok(config)
    }
}
