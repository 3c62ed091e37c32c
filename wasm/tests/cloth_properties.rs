//! Solver properties checked through the public driver API:
//! - Reset seeds the rest pose with only the top row pinned
//! - Pinned particles never move
//! - Zero forces leave the cloth at rest
//! - Relaxation is a no-op for zero iterations and a fixed point at rest
//! - Collision never leaves a particle inside the sphere

use cloth_sim::{
    collide, integrate, ClothError, ClothGrid, ClothSimulation, GridConfig, SimulationParams,
    SphereCollider, FREE, PINNED,
};
use glam::{Vec3, Vec4};
use proptest::prelude::*;

fn grid_config(seg_x: u32, seg_y: u32, scale_w: f32, scale_h: f32) -> GridConfig {
    GridConfig {
        seg_x,
        seg_y,
        scale_w,
        scale_h,
    }
}

fn params(gravity: f32, delta_t: f32, resistance: f32, stiffness: f32, iterations: u32) -> SimulationParams {
    let mut p = SimulationParams::new();
    p.set_gravity(gravity);
    p.set_delta_t(delta_t);
    p.set_resistance(resistance);
    p.set_spring_constraint(stiffness);
    p.set_iterations(iterations);
    p
}

fn far_sphere() -> SphereCollider {
    SphereCollider::new(Vec3::new(0.0, 0.0, 1000.0), 1.0)
}

proptest! {
    #[test]
    fn reset_seeds_rest_pose(
        seg_x in 1u32..24,
        seg_y in 1u32..24,
        scale_w in 0.5f32..10.0,
        scale_h in 0.5f32..10.0,
    ) {
        let sim = ClothSimulation::with_grid(grid_config(seg_x, seg_y, scale_w, scale_h)).unwrap();
        let result = sim.result().unwrap();
        let w = seg_x as usize + 1;
        let h = seg_y as usize + 1;
        prop_assert_eq!(result.len(), w * h);

        let seg_w = scale_w / seg_x as f32;
        let seg_h = scale_h / seg_y as f32;
        for y in 0..h {
            for x in 0..w {
                let p = result[y * w + x];
                let ex = x as f32 * seg_w - scale_w * 0.5;
                let ey = -(y as f32 * seg_h - scale_h * 0.5);
                prop_assert_eq!(p.truncate(), Vec3::new(ex, ey, 0.0));
                prop_assert_eq!(p.w, if y == 0 { PINNED } else { FREE });
            }
        }
    }

    #[test]
    fn pinned_row_is_invariant(
        gravity in -50.0f32..50.0,
        delta_t in 0.0f32..0.1,
        resistance in 0.0f32..1.0,
        stiffness in 0.0f32..1.0,
        iterations in 0u32..6,
        sphere_y in -3.0f32..3.0,
        steps in 1usize..8,
    ) {
        let config = grid_config(6, 5, 3.0, 2.5);
        let mut sim = ClothSimulation::with_grid(config).unwrap();
        let rest = ClothGrid::new(config).unwrap().initial_particles();
        let p = params(gravity, delta_t, resistance, stiffness, iterations);
        // Sphere sweeps through the pinned row too.
        let sphere = SphereCollider::new(Vec3::new(0.0, sphere_y, 0.0), 1.5);

        for _ in 0..steps {
            sim.step(&p, &sphere).unwrap();
        }

        let result = sim.result().unwrap();
        for x in 0..7 {
            prop_assert_eq!(result[x], rest[x]);
        }
    }
}

#[test]
fn zero_forces_leave_cloth_at_rest() {
    let mut sim = ClothSimulation::with_grid(grid_config(5, 4, 2.0, 3.0)).unwrap();
    let rest = sim.result().unwrap().to_vec();
    let p = params(0.0, 0.016, 0.0, 0.0, 4);

    sim.step(&p, &SphereCollider::new(Vec3::ZERO, 0.0)).unwrap();
    assert_eq!(sim.result().unwrap(), &rest[..]);
}

#[test]
fn zero_iterations_is_integration_then_collision() {
    let config = grid_config(4, 4, 4.0, 4.0);
    let grid = ClothGrid::new(config).unwrap();
    let p = params(9.8, 0.05, 0.02, 0.5, 0);
    let sphere = SphereCollider::new(Vec3::new(0.0, -1.0, 0.05), 0.8);

    let mut sim = ClothSimulation::with_grid(config).unwrap();
    sim.step(&p, &sphere).unwrap();

    let rest = grid.initial_particles();
    let mut integrated = vec![Vec4::ZERO; rest.len()];
    let mut expected = vec![Vec4::ZERO; rest.len()];
    integrate(&rest, &rest, &mut integrated, grid.width(), &p);
    collide(&integrated, &mut expected, grid.width(), &sphere);

    assert_eq!(sim.result().unwrap(), &expected[..]);
}

#[test]
fn relaxation_holds_a_rest_grid() {
    let mut sim = ClothSimulation::with_grid(grid_config(6, 6, 3.0, 3.0)).unwrap();
    let rest = sim.result().unwrap().to_vec();
    let p = params(0.0, 0.016, 0.0, 0.5, 8);

    sim.step(&p, &SphereCollider::default()).unwrap();
    for (got, want) in sim.result().unwrap().iter().zip(&rest) {
        assert!((*got - *want).length() < 1e-5, "{got} moved away from {want}");
    }
}

#[test]
fn particle_at_sphere_centre_is_pushed_to_surface() {
    let config = grid_config(1, 1, 1.0, 1.0);
    let grid = ClothGrid::new(config).unwrap();
    let free = grid.index(1, 1);
    let center = grid.rest_position(1, 1);
    let radius = 0.3;

    // Still cloth, sphere centred on one free particle.
    let mut sim = ClothSimulation::with_grid(config).unwrap();
    let p = params(0.0, 0.016, 0.0, 0.0, 0);
    sim.step(&p, &SphereCollider::new(center, radius)).unwrap();

    let d = (sim.result().unwrap()[free].truncate() - center).length();
    assert!((d - radius).abs() < 1e-5, "distance {d}, radius {radius}");
}

#[test]
fn collision_leaves_nothing_inside() {
    let config = grid_config(8, 8, 4.0, 4.0);
    let mut sim = ClothSimulation::with_grid(config).unwrap();
    let p = params(9.8, 0.016, 0.01, 0.5, 4);
    let sphere = SphereCollider::new(Vec3::new(0.3, -1.0, 0.1), 1.0);

    for _ in 0..30 {
        sim.step(&p, &sphere).unwrap();
        for q in sim.result().unwrap().iter().filter(|q| q.w == FREE) {
            let d = (q.truncate() - sphere.center()).length();
            assert!(d >= sphere.radius() - 1e-4, "particle {q} inside sphere");
        }
    }
}

#[test]
fn gravity_pulls_centre_down_one_step() {
    let config = grid_config(4, 4, 4.0, 4.0);
    let grid = ClothGrid::new(config).unwrap();
    let mut sim = ClothSimulation::with_grid(config).unwrap();
    let p = params(9.8, 0.016, 0.01, 0.5, 1);

    sim.step(&p, &far_sphere()).unwrap();
    let result = sim.result().unwrap();

    let centre = grid.index(2, 2);
    assert!(result[centre].y < grid.rest_position(2, 2).y);
    for x in 0..grid.width() {
        assert_eq!(result[grid.index(x, 0)], grid.initial_particles()[x]);
    }
}

#[test]
fn identical_inputs_give_identical_frames() {
    let config = grid_config(10, 7, 3.0, 2.0);
    let p = params(9.8, 0.016, 0.01, 0.5, 6);
    let sphere = SphereCollider::new(Vec3::new(0.0, -0.8, 0.2), 0.6);

    let mut a = ClothSimulation::with_grid(config).unwrap();
    let mut b = ClothSimulation::with_grid(config).unwrap();
    for _ in 0..10 {
        a.step(&p, &sphere).unwrap();
        b.step(&p, &sphere).unwrap();
    }
    assert_eq!(a.result().unwrap(), b.result().unwrap());
}

#[test]
fn result_mirrors_current_after_step() {
    let mut sim = ClothSimulation::with_grid(grid_config(3, 3, 1.0, 1.0)).unwrap();
    sim.step(&SimulationParams::new(), &far_sphere()).unwrap();
    let buffers = sim.buffers().unwrap();
    assert_eq!(buffers.result(), buffers.current());
}

#[test]
fn lifecycle_errors() {
    let mut sim = ClothSimulation::new();
    assert!(matches!(
        sim.step(&SimulationParams::new(), &far_sphere()),
        Err(ClothError::InvalidStateTransition)
    ));
    assert!(matches!(
        sim.reset(grid_config(0, 3, 1.0, 1.0)),
        Err(ClothError::InvalidConfiguration { seg_x: 0, seg_y: 3 })
    ));
    assert!(!sim.is_ready());
}
