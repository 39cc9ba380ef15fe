//! Sliding down baked, transformed geometry

use crate::foundation::math::{Quat, Transform, Vec3};
use crate::physics::{physics_step, StaticGeometry};
use crate::scene::{Mesh, PhysicsScene};

const DT: f32 = 1.0 / 60.0;
const SLOPE: f32 = 0.3;

fn ramp_scene() -> PhysicsScene {
    let rotation = Quat::from_axis_angle(&Vec3::z_axis(), SLOPE);
    let matrix = Transform::from_position_rotation(Vec3::zeros(), rotation).to_matrix();

    let mut scene = PhysicsScene::new();
    scene.add_geometry(StaticGeometry::from_mesh(&Mesh::quad(10.0), &matrix).unwrap());
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::GeometryId;
    use approx::assert_relative_eq;

    #[test]
    fn test_baked_ramp_is_tilted() {
        let scene = ramp_scene();
        let geometry = scene.geometry(GeometryId(0)).unwrap();
        let expected = Vec3::new(-SLOPE.sin(), SLOPE.cos(), 0.0);
        for triangle in geometry.triangles() {
            assert_relative_eq!(triangle.normal(), expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sphere_slides_downhill_on_surface() {
        let mut scene = ramp_scene();
        let normal = Vec3::new(-SLOPE.sin(), SLOPE.cos(), 0.0);
        // Off to the side of the quad's diagonal, so only face contacts occur.
        let start = Vec3::new(2.0 * SLOPE.cos(), 2.0 * SLOPE.sin(), 4.0) + normal;
        let ball = scene.create_body(start);

        let mut scenes = vec![scene];
        let mut last_x = start.x;
        for _ in 0..120 {
            physics_step(&mut scenes, DT);
            let body = scenes[0].body(ball).unwrap();

            assert!(body.position().x <= last_x + 1e-6);
            last_x = body.position().x;

            let triangle = &scenes[0].geometries()[0].triangles()[body.contact(0).unwrap().triangle.index as usize];
            assert_relative_eq!(triangle.signed_distance(body.position()), 1.0, epsilon = 1e-4);
        }

        let body = scenes[0].body(ball).unwrap();
        assert!(body.position().x < start.x - 1.0);
        assert_relative_eq!(body.position().z, 4.0, epsilon = 1e-4);
        assert!(body.velocity().magnitude() <= scenes[0].config().integrator.max_step_velocity);
    }
}
