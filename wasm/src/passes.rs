//! Full-buffer solver passes.
//!
//! Each pass reads only from its source buffer(s) and writes only to its
//! destination, one rayon task per row. Callers swap buffers between passes.

use glam::{Vec3, Vec4};
use rayon::prelude::*;

use crate::params::{SimulationParams, SphereCollider};

/// Fraction of a spring's error applied to the home particle. The mirrored
/// offset applies the other half from the neighbour's side.
pub const CORRECTION_SHARE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    pub offset: (i32, i32),
    pub rest_length: f32,
}

#[inline(always)]
pub fn is_pinned(p: Vec4) -> bool {
    p.w > 0.5
}

fn check_shapes(src_len: usize, dst_len: usize, width: usize) {
    assert!(width > 0, "pass over a zero-width buffer");
    assert_eq!(src_len, dst_len, "source/destination buffer size mismatch");
    assert_eq!(src_len % width, 0, "buffer length is not a multiple of the row width");
}

/// Verlet step: `next = p + (p - prev) * (1 - resistance) + g * dt^2`.
/// Pinned particles are copied through untouched.
pub fn integrate(
    current: &[Vec4],
    previous: &[Vec4],
    next: &mut [Vec4],
    width: usize,
    params: &SimulationParams,
) {
    check_shapes(current.len(), next.len(), width);
    check_shapes(previous.len(), next.len(), width);

    let damping = 1.0 - params.resistance();
    let dt = params.delta_t();
    let accel = Vec3::new(0.0, -params.gravity(), 0.0) * (dt * dt);

    next.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let off = y * width;
            for (x, out) in row.iter_mut().enumerate() {
                let p = current[off + x];
                if is_pinned(p) {
                    *out = p;
                    continue;
                }
                let pos = p.truncate();
                let velocity = pos - previous[off + x].truncate();
                *out = (pos + velocity * damping + accel).extend(p.w);
            }
        });
}

/// One relaxation sub-pass for a single neighbour offset.
///
/// Cells whose neighbour falls outside the grid pass through unchanged.
pub fn relax(src: &[Vec4], dst: &mut [Vec4], width: usize, spring: Spring, stiffness: f32) {
    check_shapes(src.len(), dst.len(), width);

    let height = (src.len() / width) as isize;
    let (dx, dy) = (spring.offset.0 as isize, spring.offset.1 as isize);

    dst.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let row_in = &src[y * width..(y + 1) * width];
            let ny = y as isize + dy;
            if ny < 0 || ny >= height {
                row.copy_from_slice(row_in);
                return;
            }
            let n_off = ny as usize * width;

            for (x, out) in row.iter_mut().enumerate() {
                let p = row_in[x];
                let nx = x as isize + dx;
                if is_pinned(p) || nx < 0 || nx >= width as isize {
                    *out = p;
                    continue;
                }
                *out = spring_correction(p, src[n_off + nx as usize], spring.rest_length, stiffness);
            }
        });
}

#[inline(always)]
fn spring_correction(p: Vec4, neighbor: Vec4, rest_length: f32, stiffness: f32) -> Vec4 {
    let pos = p.truncate();
    let delta = neighbor.truncate() - pos;
    let d = delta.length();
    if d <= f32::EPSILON {
        // Coincident particles have no direction to resolve along.
        return p;
    }
    let shift = delta * ((d - rest_length) * stiffness * CORRECTION_SHARE / d);
    (pos + shift).extend(p.w)
}

/// Pushes free particles that ended up inside the sphere back onto its
/// surface. A particle exactly at the centre is pushed out along +Z.
pub fn collide(src: &[Vec4], dst: &mut [Vec4], width: usize, sphere: &SphereCollider) {
    check_shapes(src.len(), dst.len(), width);

    let center = sphere.center();
    let radius = sphere.radius();

    dst.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let off = y * width;
            for (x, out) in row.iter_mut().enumerate() {
                let p = src[off + x];
                if is_pinned(p) {
                    *out = p;
                    continue;
                }
                let d = p.truncate() - center;
                if d.length_squared() < radius * radius {
                    let dir = d.try_normalize().unwrap_or(Vec3::Z);
                    *out = (center + dir * radius).extend(p.w);
                } else {
                    *out = p;
                }
            }
        });
}
