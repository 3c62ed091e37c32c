use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::ClothError;
use crate::meshing::ClothMesh;
use crate::passes::Spring;

/// Pinned flag as stored in the `w` lane of a particle record.
pub const PINNED: f32 = 1.0;
pub const FREE: f32 = 0.0;

/// Segment counts and physical size of the cloth sheet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub seg_x: u32,
    pub seg_y: u32,
    pub scale_w: f32,
    pub scale_h: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            seg_x: 32,
            seg_y: 32,
            scale_w: 4.0,
            scale_h: 4.0,
        }
    }
}

/// Validated cloth topology: `(seg_x + 1) x (seg_y + 1)` particles centred on
/// the origin in the XY plane, row 0 at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct ClothGrid {
    seg_x: u32,
    seg_y: u32,
    scale_w: f32,
    scale_h: f32,
}

impl ClothGrid {
    pub fn new(config: GridConfig) -> Result<Self, ClothError> {
        let invalid = ClothError::InvalidConfiguration {
            seg_x: config.seg_x,
            seg_y: config.seg_y,
        };
        if config.seg_x < 1 || config.seg_y < 1 {
            return Err(invalid);
        }
        // Particle count must be addressable as a Vec4 buffer and as u32
        // mesh indices.
        let count = (config.seg_x as usize)
            .checked_add(1)
            .zip((config.seg_y as usize).checked_add(1))
            .and_then(|(w, h)| w.checked_mul(h))
            .filter(|&n| n <= u32::MAX as usize)
            .filter(|&n| {
                n.checked_mul(std::mem::size_of::<Vec4>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            });
        if count.is_none() {
            return Err(invalid);
        }
        Ok(Self {
            seg_x: config.seg_x,
            seg_y: config.seg_y,
            scale_w: config.scale_w,
            scale_h: config.scale_h,
        })
    }

    pub fn seg_x(&self) -> u32 {
        self.seg_x
    }
    pub fn seg_y(&self) -> u32 {
        self.seg_y
    }
    pub fn width(&self) -> usize {
        self.seg_x as usize + 1
    }
    pub fn height(&self) -> usize {
        self.seg_y as usize + 1
    }
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }

    pub fn rest_position(&self, x: usize, y: usize) -> Vec3 {
        let seg_w = self.scale_w / self.seg_x as f32;
        let seg_h = self.scale_h / self.seg_y as f32;
        let px = x as f32 * seg_w - self.scale_w * 0.5;
        let py = y as f32 * seg_h - self.scale_h * 0.5;
        Vec3::new(px, -py, 0.0)
    }

    /// Texel-centre uv of a particle; v runs bottom-up so row 0 samples the
    /// top of the position texture.
    pub fn uv(&self, x: usize, y: usize) -> [f32; 2] {
        let u = (x as f32 + 0.5) / self.width() as f32;
        let v = 1.0 - (y as f32 + 0.5) / self.height() as f32;
        [u, v]
    }

    pub fn is_pinned_row(&self, y: usize) -> bool {
        y == 0
    }

    pub fn rest_lengths(&self) -> RestLengths {
        let horizontal = self.scale_w / self.seg_x as f32;
        let vertical = self.scale_h / self.seg_y as f32;
        RestLengths {
            horizontal,
            vertical,
            diagonal: (horizontal * horizontal + vertical * vertical).sqrt(),
            horizontal_bend: 2.0 * self.scale_w / self.seg_x as f32,
            vertical_bend: 2.0 * self.scale_h / self.seg_y as f32,
        }
    }

    /// Rest pose, top row pinned.
    pub fn initial_particles(&self) -> Vec<Vec4> {
        let mut out = Vec::with_capacity(self.len());
        for y in 0..self.height() {
            let flag = if self.is_pinned_row(y) { PINNED } else { FREE };
            for x in 0..self.width() {
                out.push(self.rest_position(x, y).extend(flag));
            }
        }
        out
    }

    pub fn build_mesh(&self) -> ClothMesh {
        let mut mesh = ClothMesh::new();
        mesh.rebuild(self);
        mesh
    }
}

/// Spring rest lengths derived from the grid spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RestLengths {
    pub horizontal: f32,
    pub vertical: f32,
    pub diagonal: f32,
    pub horizontal_bend: f32,
    pub vertical_bend: f32,
}

impl RestLengths {
    /// The twelve relaxation sub-passes in solve order. Every offset is
    /// followed by its mirror so each pair is corrected from both ends.
    pub fn springs(&self) -> [Spring; 12] {
        let s = |dx, dy, rest_length| Spring {
            offset: (dx, dy),
            rest_length,
        };
        [
            s(1, 0, self.horizontal),
            s(-1, 0, self.horizontal),
            s(0, 1, self.vertical),
            s(0, -1, self.vertical),
            s(1, 1, self.diagonal),
            s(-1, -1, self.diagonal),
            s(1, -1, self.diagonal),
            s(-1, 1, self.diagonal),
            s(2, 0, self.horizontal_bend),
            s(-2, 0, self.horizontal_bend),
            s(0, 2, self.vertical_bend),
            s(0, -2, self.vertical_bend),
        ]
    }
}
