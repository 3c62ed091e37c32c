use glam::Vec4;

use crate::error::ClothError;
use crate::grid::{ClothGrid, GridConfig};
use crate::meshing::ClothMesh;
use crate::params::{SimulationParams, SphereCollider};
use crate::particles::ParticleBuffers;
use crate::passes;

enum State {
    Uninitialized,
    Ready {
        grid: ClothGrid,
        mesh: ClothMesh,
        buffers: ParticleBuffers,
    },
}

/// Cloth solver driver.
///
/// `reset` builds the grid, mesh and buffers; `step` then advances one frame:
/// integrate, `iterations x 12` spring sub-passes, sphere collision. Taking
/// `&mut self` for both keeps a single writer on the buffers.
pub struct ClothSimulation {
    state: State,
    frame: u64,
}

impl Default for ClothSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ClothSimulation {
    pub fn new() -> Self {
        Self {
            state: State::Uninitialized,
            frame: 0,
        }
    }

    pub fn with_grid(config: GridConfig) -> Result<Self, ClothError> {
        let mut sim = Self::new();
        sim.reset(config)?;
        Ok(sim)
    }

    /// Discards all motion and restarts the cloth at rest on a (possibly new)
    /// grid. On error the previous state is left as it was.
    pub fn reset(&mut self, config: GridConfig) -> Result<(), ClothError> {
        let grid = ClothGrid::new(config)?;
        let mesh = grid.build_mesh();

        let buffers = match std::mem::replace(&mut self.state, State::Uninitialized) {
            State::Ready { mut buffers, .. } => {
                buffers.reset(&grid);
                buffers
            }
            State::Uninitialized => ParticleBuffers::new(&grid),
        };

        log::info!(
            "cloth reset: {}x{} particles, {} triangles",
            grid.width(),
            grid.height(),
            mesh.triangle_count()
        );

        self.state = State::Ready {
            grid,
            mesh,
            buffers,
        };
        self.frame = 0;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn grid(&self) -> Option<&ClothGrid> {
        match &self.state {
            State::Ready { grid, .. } => Some(grid),
            State::Uninitialized => None,
        }
    }

    pub fn mesh(&self) -> Option<&ClothMesh> {
        match &self.state {
            State::Ready { mesh, .. } => Some(mesh),
            State::Uninitialized => None,
        }
    }

    pub fn buffers(&self) -> Option<&ParticleBuffers> {
        match &self.state {
            State::Ready { buffers, .. } => Some(buffers),
            State::Uninitialized => None,
        }
    }

    /// Positions after the last completed step (or the rest pose right after
    /// a reset).
    pub fn result(&self) -> Option<&[Vec4]> {
        self.buffers().map(ParticleBuffers::result)
    }

    /// Vertex normals of the current result pose.
    pub fn result_normals(&self) -> Option<Vec<f32>> {
        match &self.state {
            State::Ready { mesh, buffers, .. } => Some(mesh.normals_for(buffers.result())),
            State::Uninitialized => None,
        }
    }

    pub fn step(
        &mut self,
        params: &SimulationParams,
        sphere: &SphereCollider,
    ) -> Result<(), ClothError> {
        let State::Ready { grid, buffers, .. } = &mut self.state else {
            return Err(ClothError::InvalidStateTransition);
        };
        buffers.check_matches(grid)?;

        let width = grid.width();
        let springs = grid.rest_lengths().springs();
        let stiffness = params.spring_constraint();
        let iterations = params.iterations();

        log::debug!(
            "cloth step {}: {} iterations, {} spring sub-passes",
            self.frame,
            iterations,
            iterations as usize * springs.len()
        );

        passes::integrate(
            &buffers.current,
            &buffers.previous,
            &mut buffers.front,
            width,
            params,
        );
        buffers.rotate_history();

        for _ in 0..iterations {
            for &spring in &springs {
                passes::relax(&buffers.front, &mut buffers.back, width, spring, stiffness);
                buffers.swap_scratch();
            }
        }

        passes::collide(&buffers.front, &mut buffers.current, width, sphere);
        buffers.publish_result();

        self.frame += 1;
        Ok(())
    }
}
