use glam::{Vec3, Vec4};

use crate::grid::ClothGrid;

/// Triangulated cloth surface handed to the renderer once per reset.
///
/// Flat layouts: 3 floats per position/normal, 2 per uv, 3 indices per triangle.
#[derive(Clone, Debug, Default)]
pub struct ClothMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl ClothMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_vertex(&mut self, pos: Vec3, uv: [f32; 2]) -> u32 {
        let idx = self.vertex_count() as u32;
        self.positions.extend_from_slice(&pos.to_array());
        self.uvs.extend_from_slice(&uv);
        idx
    }

    fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Rebuilds vertices, uvs and triangles for `grid`, then derives normals
    /// from the rest pose.
    pub fn rebuild(&mut self, grid: &ClothGrid) {
        self.clear();

        let w = grid.width();
        let h = grid.height();

        for y in 0..h {
            for x in 0..w {
                self.push_vertex(grid.rest_position(x, y), grid.uv(x, y));
            }
        }

        // Two triangles per cell, same winding for every cell.
        let stride = w as u32;
        for cy in 0..grid.seg_y() {
            for cx in 0..grid.seg_x() {
                let a = cx + stride * cy;
                let b = cx + stride * (cy + 1);
                let c = (cx + 1) + stride * (cy + 1);
                let d = (cx + 1) + stride * cy;
                self.push_triangle(a, d, b);
                self.push_triangle(b, d, c);
            }
        }

        let rest: Vec<Vec3> = self
            .positions
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect();
        self.normals = vertex_normals(&rest, &self.indices);
    }

    /// Smooth normals for a deformed pose, e.g. the solver's result buffer.
    pub fn normals_for(&self, particles: &[Vec4]) -> Vec<f32> {
        let pos: Vec<Vec3> = particles.iter().map(|p| p.truncate()).collect();
        vertex_normals(&pos, &self.indices)
    }
}

fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<f32> {
    let mut acc = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (a, b, c) = (positions[ia], positions[ib], positions[ic]);
        // Unnormalized cross product weights each face by its area.
        let n = (b - a).cross(c - a);
        acc[ia] += n;
        acc[ib] += n;
        acc[ic] += n;
    }

    let mut out = Vec::with_capacity(positions.len() * 3);
    for n in acc {
        out.extend_from_slice(&n.normalize_or_zero().to_array());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridConfig;

    fn grid(seg_x: u32, seg_y: u32) -> ClothGrid {
        ClothGrid::new(GridConfig {
            seg_x,
            seg_y,
            scale_w: 2.0,
            scale_h: 3.0,
        })
        .unwrap()
    }

    #[test]
    fn counts_match_grid() {
        let g = grid(3, 2);
        let mut mesh = ClothMesh::new();
        mesh.rebuild(&g);

        assert_eq!(mesh.vertex_count(), 4 * 3);
        assert_eq!(mesh.uvs.len(), 4 * 3 * 2);
        assert_eq!(mesh.normals.len(), 4 * 3 * 3);
        assert_eq!(mesh.triangle_count(), 3 * 2 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn first_cell_winding() {
        let g = grid(1, 1);
        let mut mesh = ClothMesh::new();
        mesh.rebuild(&g);
        // a=0, b=2, c=3, d=1 on a 2x2 vertex grid.
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn flat_cloth_normals_are_consistent() {
        let g = grid(4, 4);
        let mut mesh = ClothMesh::new();
        mesh.rebuild(&g);

        let first = Vec3::from_slice(&mesh.normals[0..3]);
        assert!((first.length() - 1.0).abs() < 1e-5);
        assert!(first.x.abs() < 1e-6 && first.y.abs() < 1e-6);
        for n in mesh.normals.chunks_exact(3) {
            assert!((Vec3::from_slice(n) - first).length() < 1e-5);
        }
    }

    #[test]
    fn rebuild_is_deterministic() {
        let g = grid(5, 3);
        let mut a = ClothMesh::new();
        let mut b = ClothMesh::new();
        a.rebuild(&g);
        b.rebuild(&g);
        a.rebuild(&g);
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.uvs, b.uvs);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn normals_follow_deformed_pose() {
        let g = grid(1, 1);
        let mut mesh = ClothMesh::new();
        mesh.rebuild(&g);

        // Rotate the flat quad into the XZ plane.
        let bent: Vec<Vec4> = (0..g.len())
            .map(|i| {
                let p = g.rest_position(i % 2, i / 2);
                Vec4::new(p.x, 0.0, p.y, 0.0)
            })
            .collect();
        let normals = mesh.normals_for(&bent);
        for n in normals.chunks_exact(3) {
            assert!(n[1].abs() > 0.99);
        }
    }
}
