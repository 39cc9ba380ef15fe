//! Per-tick physics driver
//!
//! One tick integrates every body, then resolves it against every static
//! triangle of its scene. Corrections apply immediately, so geometries and
//! triangles are always visited in insertion order.

use crate::config::IntegratorConfig;
use crate::physics::body::{Body, GeometryId, TriangleRef};
use crate::physics::collision::collide_body;
use crate::physics::geometry::StaticGeometry;
use crate::scene::PhysicsScene;

/// Advance every scene by one fixed tick of `dt` seconds
pub fn physics_step(scenes: &mut [PhysicsScene], dt: f32) {
    for scene in scenes {
        scene.step(dt);
    }
}

/// Integrate one body and resolve it against `geometries`
///
/// Geometries with an attached octree only test the triangles near the
/// body. The query reaches `2 * radius + max_step_velocity` around the
/// integrated position. Push-outs move the body while a geometry is walked,
/// so once it has drifted more than `reach - radius` from the query center
/// the query is repeated and the walk resumes after the last visited face.
/// Every triangle the brute-force loop would touch is then still visited,
/// in the same order. `candidates` is scratch space reused between calls.
pub fn step_body(
    body: &mut Body,
    geometries: &mut [StaticGeometry],
    integrator: &IntegratorConfig,
    dt: f32,
    candidates: &mut Vec<u32>,
) {
    body.integrate(dt, integrator);

    let radius = body.shape().bounding_radius();
    let reach = 2.0 * radius + integrator.max_step_velocity;
    let drift_limit = reach - radius;

    for (slot, geometry) in geometries.iter_mut().enumerate() {
        let id = GeometryId(slot as u32);
        let mut center = body.position();
        geometry.candidates_near(center, reach, candidates);

        let mut cursor = 0;
        while let Some(&index) = candidates.get(cursor) {
            cursor += 1;
            if let Some(triangle) = geometry.triangle(index as usize) {
                collide_body(body, triangle, TriangleRef { geometry: id, index });
            }

            if geometry.has_octree() && (body.position() - center).magnitude() > drift_limit {
                center = body.position();
                geometry.candidates_near(center, reach, candidates);
                cursor = candidates.partition_point(|&next| next <= index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4, Transform, Vec3};
    use crate::scene::Mesh;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_step_integrates_then_collides() {
        let mut geometries = vec![StaticGeometry::from_mesh(&Mesh::quad(10.0), &Mat4::identity()).unwrap()];
        let mut body = Body::new_sphere(Vec3::new(0.0, 1.0, 0.0), 1.0);
        let mut candidates = Vec::new();

        step_body(&mut body, &mut geometries, &IntegratorConfig::default(), DT, &mut candidates);

        assert_relative_eq!(body.position().y, 1.0, epsilon = 1e-6);
        assert!(body.contact_count() >= 1);
        assert!(body.contacts().iter().all(|c| c.triangle.geometry == GeometryId(0)));
    }

    #[test]
    fn test_contacts_reference_their_geometry() {
        let lifted = Transform::from_position(Vec3::new(0.0, 5.0, 0.0)).to_matrix();
        let mut geometries = vec![
            StaticGeometry::from_mesh(&Mesh::quad(10.0), &lifted).unwrap(),
            StaticGeometry::from_mesh(&Mesh::quad(10.0), &Mat4::identity()).unwrap(),
        ];
        let mut body = Body::new_sphere(Vec3::new(0.5, 0.9, 0.25), 1.0);
        let mut candidates = Vec::new();

        step_body(&mut body, &mut geometries, &IntegratorConfig::default(), DT, &mut candidates);

        assert!(body.contact_count() >= 1);
        assert_eq!(body.contact(0).unwrap().triangle.geometry, GeometryId(1));
    }

    #[test]
    fn test_physics_step_runs_every_scene() {
        let mut scenes = vec![PhysicsScene::new(), PhysicsScene::new()];
        let first = scenes[0].create_body(Vec3::new(0.0, 10.0, 0.0));
        let second = scenes[1].create_body(Vec3::new(0.0, 20.0, 0.0));

        physics_step(&mut scenes, DT);

        assert!(scenes[0].body(first).unwrap().position().y < 10.0);
        assert!(scenes[1].body(second).unwrap().position().y < 20.0);
    }
}
