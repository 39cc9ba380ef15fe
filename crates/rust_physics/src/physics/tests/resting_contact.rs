//! Bodies dropped on a floor settle at their radius and stay there

use crate::config::PhysicsConfig;
use crate::foundation::math::{Mat4, Vec3};
use crate::foundation::time::FixedTimestep;
use crate::physics::{physics_step, StaticGeometry};
use crate::scene::{Mesh, PhysicsScene};

const DT: f32 = 1.0 / 60.0;

fn floor_scene() -> PhysicsScene {
    let mut scene = PhysicsScene::new();
    scene.add_geometry(StaticGeometry::from_mesh(&Mesh::quad(20.0), &Mat4::identity()).unwrap());
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dropped_sphere_converges_to_radius() {
        let mut scenes = vec![floor_scene()];
        let ball = scenes[0].create_body(Vec3::new(0.3, 3.0, -0.2));

        for _ in 0..240 {
            physics_step(&mut scenes, DT);
        }

        let body = scenes[0].body(ball).unwrap();
        assert_relative_eq!(body.position().y, 1.0, epsilon = 1e-4);
        assert_relative_eq!(body.position().x, 0.3, epsilon = 1e-5);
        assert_relative_eq!(body.position().z, -0.2, epsilon = 1e-5);
        assert!(body.contact_count() >= 1);
    }

    #[test]
    fn test_resting_sphere_does_not_jitter() {
        let mut scenes = vec![floor_scene()];
        let ball = scenes[0].create_body(Vec3::new(-2.0, 1.5, 4.0));

        for _ in 0..240 {
            physics_step(&mut scenes, DT);
        }
        let settled = scenes[0].body(ball).unwrap().position();

        for _ in 0..120 {
            physics_step(&mut scenes, DT);
            let body = scenes[0].body(ball).unwrap();
            assert_relative_eq!(body.position(), settled, epsilon = 1e-4);
            assert!(body.contact_count() >= 1);
            let normal = body.contact(0).unwrap().normal;
            assert_relative_eq!(normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-4);
        }
    }

    #[test]
    fn test_small_and_large_radii_rest_on_surface() {
        let mut scene = floor_scene();
        let small = scene.create_body(Vec3::new(-5.0, 2.0, 0.0));
        scene.body_mut(small).unwrap().set_radius(0.25);
        let large = scene.create_body(Vec3::new(5.0, 4.0, 0.0));
        scene.body_mut(large).unwrap().set_radius(2.0);

        let mut scenes = vec![scene];
        for _ in 0..300 {
            physics_step(&mut scenes, DT);
        }

        assert_relative_eq!(scenes[0].body(small).unwrap().position().y, 0.25, epsilon = 1e-4);
        assert_relative_eq!(scenes[0].body(large).unwrap().position().y, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_fixed_timestep_drives_steps() {
        let config = PhysicsConfig::default();
        let mut clock = FixedTimestep::new(config.timestep.fixed_dt, config.timestep.max_ticks_per_frame);
        let mut scenes = vec![floor_scene()];
        let ball = scenes[0].create_body(Vec3::new(0.0, 2.0, 0.0));

        let mut ticks = 0;
        for _ in 0..120 {
            for _ in 0..clock.advance(1.0 / 30.0) {
                physics_step(&mut scenes, clock.fixed_dt());
                ticks += 1;
            }
        }
        assert!((238..=241).contains(&ticks));

        // A long hitch resynchronises instead of replaying every missed tick.
        assert_eq!(clock.advance(2.0), 1);
        assert_eq!(clock.resync_count(), 1);

        assert_relative_eq!(scenes[0].body(ball).unwrap().position().y, 1.0, epsilon = 1e-4);
    }
}
