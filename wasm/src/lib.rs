use wasm_bindgen::prelude::*;

mod error;
mod grid;
mod logging;
mod meshing;
mod params;
mod particles;
mod passes;
mod sim;
mod web;

pub use error::ClothError;
pub use grid::{ClothGrid, GridConfig, RestLengths, FREE, PINNED};
pub use logging::parse_level;
pub use meshing::ClothMesh;
pub use params::{ClothConfig, SimulationParams, SphereCollider, MAX_ITERATIONS};
pub use particles::ParticleBuffers;
pub use passes::{collide, integrate, relax, Spring};
pub use sim::ClothSimulation;
pub use web::WebCloth;

#[cfg(target_arch = "wasm32")]
pub use logging::init_logging;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_thread_pool(num_threads: usize) -> js_sys::Promise {
    wasm_bindgen_rayon::init_thread_pool(num_threads)
}

#[wasm_bindgen]
pub fn rayon_num_threads() -> usize {
    rayon::current_num_threads()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_start() {
    // Keep empty: explicit initialization in JS.
}
