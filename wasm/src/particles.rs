use glam::Vec4;

use crate::error::ClothError;
use crate::grid::ClothGrid;

/// Owns every particle buffer the solver touches.
///
/// `current`/`previous` carry the Verlet history, `result` is what renderers
/// read, and `front`/`back` are the scratch pair the relaxation sub-passes
/// ping-pong between. All five always hold `width * height` records.
pub struct ParticleBuffers {
    width: usize,
    height: usize,

    pub(crate) current: Vec<Vec4>,
    pub(crate) previous: Vec<Vec4>,
    pub(crate) result: Vec<Vec4>,

    pub(crate) front: Vec<Vec4>,
    pub(crate) back: Vec<Vec4>,
}

impl ParticleBuffers {
    pub fn new(grid: &ClothGrid) -> Self {
        let mut buffers = Self {
            width: 0,
            height: 0,
            current: Vec::new(),
            previous: Vec::new(),
            result: Vec::new(),
            front: Vec::new(),
            back: Vec::new(),
        };
        buffers.reset(grid);
        buffers
    }

    /// Resizes to `grid` and reseeds every persistent buffer with the rest
    /// pose. Prior motion is discarded.
    pub fn reset(&mut self, grid: &ClothGrid) {
        let initial = grid.initial_particles();
        let n = initial.len();

        self.width = grid.width();
        self.height = grid.height();

        self.previous.clear();
        self.previous.extend_from_slice(&initial);
        self.result.clear();
        self.result.extend_from_slice(&initial);
        self.current = initial;

        self.front.clear();
        self.front.resize(n, Vec4::ZERO);
        self.back.clear();
        self.back.resize(n, Vec4::ZERO);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn current(&self) -> &[Vec4] {
        &self.current
    }

    pub fn previous(&self) -> &[Vec4] {
        &self.previous
    }

    pub fn result(&self) -> &[Vec4] {
        &self.result
    }

    /// `result` as 4 floats per particle, row-major.
    pub fn result_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.result)
    }

    /// `result` with rows flipped into texture order, matching the uvs the
    /// mesh carries (grid row `y` lands on texture row `height - 1 - y`).
    pub fn write_result_texture(&self, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.len() * 4);
        for row in self.result.chunks_exact(self.width).rev() {
            out.extend_from_slice(bytemuck::cast_slice(row));
        }
    }

    /// Fails if any buffer drifted from the grid's dimensions.
    pub fn check_matches(&self, grid: &ClothGrid) -> Result<(), ClothError> {
        let expected = grid.len();
        let buffers = [
            &self.current,
            &self.previous,
            &self.result,
            &self.front,
            &self.back,
        ];
        if self.width != grid.width() || self.height != grid.height() {
            return Err(ClothError::BufferSizeMismatch {
                expected,
                actual: self.len(),
            });
        }
        for b in buffers {
            if b.len() != expected {
                return Err(ClothError::BufferSizeMismatch {
                    expected,
                    actual: b.len(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn swap_scratch(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// After integration has read `current`, it becomes the new `previous`.
    /// The old `previous` storage is recycled as the next `current`, which
    /// the collision pass overwrites in full.
    pub(crate) fn rotate_history(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
    }

    pub(crate) fn publish_result(&mut self) {
        self.result.copy_from_slice(&self.current);
    }
}
