use glam::Vec3;
use wasm_bindgen::prelude::*;

use crate::grid::GridConfig;
use crate::params::{SimulationParams, SphereCollider};
use crate::sim::ClothSimulation;

/// JS handle around [`ClothSimulation`].
///
/// Buffers are exported as pointer/length pairs into wasm memory; lengths are
/// in elements (f32 or u32), not bytes.
#[wasm_bindgen(js_name = ClothSimulation)]
pub struct WebCloth {
    sim: ClothSimulation,
    params: SimulationParams,
    sphere: SphereCollider,
    texture: Vec<f32>,
    normals: Vec<f32>,
}

impl Default for WebCloth {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen(js_class = ClothSimulation)]
impl WebCloth {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            sim: ClothSimulation::new(),
            params: SimulationParams::new(),
            sphere: SphereCollider::default(),
            texture: Vec::new(),
            normals: Vec::new(),
        }
    }

    pub fn reset(&mut self, seg_x: u32, seg_y: u32, scale_w: f32, scale_h: f32) -> Result<(), JsError> {
        self.sim.reset(GridConfig {
            seg_x,
            seg_y,
            scale_w,
            scale_h,
        })?;
        self.texture.clear();
        self.normals.clear();
        Ok(())
    }

    pub fn set_params(&mut self, params: &SimulationParams) {
        self.params = params.clone();
    }

    pub fn params(&self) -> SimulationParams {
        self.params.clone()
    }

    pub fn set_sphere(&mut self, x: f32, y: f32, z: f32, radius: f32) {
        self.sphere = SphereCollider::new(Vec3::new(x, y, z), radius);
    }

    /// Sphere from a scene transform: world position, local scale and the
    /// collider's unscaled radius.
    #[allow(clippy::too_many_arguments)]
    pub fn set_sphere_transform(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        sx: f32,
        sy: f32,
        sz: f32,
        base_radius: f32,
    ) {
        self.sphere = SphereCollider::from_transform(
            Vec3::new(x, y, z),
            Vec3::new(sx, sy, sz),
            base_radius,
        );
    }

    pub fn step(&mut self) -> Result<(), JsError> {
        self.sim.step(&self.params, &self.sphere)?;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.sim.is_ready()
    }

    pub fn frame(&self) -> u64 {
        self.sim.frame()
    }

    pub fn width(&self) -> usize {
        self.sim.grid().map_or(0, |g| g.width())
    }

    pub fn height(&self) -> usize {
        self.sim.grid().map_or(0, |g| g.height())
    }

    pub fn result_ptr(&self) -> u32 {
        self.sim
            .buffers()
            .map_or(0, |b| b.result_floats().as_ptr() as u32)
    }

    pub fn result_len(&self) -> usize {
        self.sim.buffers().map_or(0, |b| b.result_floats().len())
    }

    /// Refreshes the texture-ordered copy of the result buffer.
    pub fn update_texture(&mut self) {
        if let Some(b) = self.sim.buffers() {
            b.write_result_texture(&mut self.texture);
        }
    }

    pub fn texture_ptr(&self) -> u32 {
        self.texture.as_ptr() as u32
    }

    pub fn texture_len(&self) -> usize {
        self.texture.len()
    }

    /// Recomputes smooth normals for the current result pose.
    pub fn update_normals(&mut self) {
        if let Some(n) = self.sim.result_normals() {
            self.normals = n;
        }
    }

    pub fn normals_ptr(&self) -> u32 {
        self.normals.as_ptr() as u32
    }

    pub fn normals_len(&self) -> usize {
        self.normals.len()
    }

    pub fn mesh_vertex_count(&self) -> usize {
        self.sim.mesh().map_or(0, |m| m.vertex_count())
    }

    pub fn mesh_positions_ptr(&self) -> u32 {
        self.sim.mesh().map_or(0, |m| m.positions.as_ptr() as u32)
    }
    pub fn mesh_positions_len(&self) -> usize {
        self.sim.mesh().map_or(0, |m| m.positions.len())
    }

    pub fn mesh_normals_ptr(&self) -> u32 {
        self.sim.mesh().map_or(0, |m| m.normals.as_ptr() as u32)
    }
    pub fn mesh_normals_len(&self) -> usize {
        self.sim.mesh().map_or(0, |m| m.normals.len())
    }

    pub fn mesh_uvs_ptr(&self) -> u32 {
        self.sim.mesh().map_or(0, |m| m.uvs.as_ptr() as u32)
    }
    pub fn mesh_uvs_len(&self) -> usize {
        self.sim.mesh().map_or(0, |m| m.uvs.len())
    }

    pub fn mesh_indices_ptr(&self) -> u32 {
        self.sim.mesh().map_or(0, |m| m.indices.as_ptr() as u32)
    }
    pub fn mesh_indices_len(&self) -> usize {
        self.sim.mesh().map_or(0, |m| m.indices.len())
    }
}
