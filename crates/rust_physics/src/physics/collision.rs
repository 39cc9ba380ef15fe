//! Narrow-phase sphere versus static triangle
//!
//! Candidate points are searched in a fixed order and the first match wins:
//!
//! 1. plane rejection when the center is farther than the radius from the plane
//! 2. the center projected onto the face, when it lands inside the triangle
//! 3. the closest point on edge AB, BC then CA, when within the radius
//! 4. vertex A, B then C, when strictly within the radius
//!
//! The body is pushed out of the candidate point along the line joining the
//! two, by the penetration depth. That order is observable: a body resolved
//! against one triangle starts from the corrected position for the next.

use crate::foundation::math::Vec3;
use crate::physics::body::{Body, Contact, TriangleRef};
use crate::physics::triangle::StaticTriangle;

/// Triangle feature that produced the contact point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitFeature {
    /// Interior of the face
    Face,
    /// Edge 0 = AB, 1 = BC, 2 = CA
    Edge(usize),
    /// Vertex 0 = A, 1 = B, 2 = C
    Vertex(usize),
}

/// Result of a sphere overlapping a triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereHit {
    /// Closest point on the triangle
    pub point: Vec3,
    /// Unit push-out direction, from `point` towards the sphere center
    pub normal: Vec3,
    /// Penetration depth, never negative
    pub depth: f32,
    /// Feature the point lies on
    pub feature: HitFeature,
}

impl SphereHit {
    /// Displacement that moves the sphere out of the triangle
    pub fn correction(&self) -> Vec3 {
        self.normal * self.depth
    }
}

/// Test a sphere against one triangle without side effects
pub fn sphere_vs_triangle(center: Vec3, radius: f32, triangle: &StaticTriangle) -> Option<SphereHit> {
    let distance = triangle.signed_distance(center);
    if distance.abs() > radius {
        return None;
    }

    let (point, feature) = closest_feature(center, radius, distance, triangle)?;

    let offset = center - point;
    let length = offset.magnitude();
    let depth = radius - length;
    if depth < 0.0 {
        return None;
    }

    // Center lying on the triangle: no direction to push along, use the face.
    let normal = if length > f32::EPSILON {
        offset / length
    } else {
        triangle.normal()
    };

    Some(SphereHit { point, normal, depth, feature })
}

fn closest_feature(
    center: Vec3,
    radius: f32,
    distance: f32,
    triangle: &StaticTriangle,
) -> Option<(Vec3, HitFeature)> {
    let projected = center - triangle.normal() * distance;
    if triangle.contains_point(projected) {
        return Some((projected, HitFeature::Face));
    }

    let radius_sq = radius * radius;

    let edge = triangle
        .edges()
        .iter()
        .map(|segment| segment.closest_point(center))
        .enumerate()
        .find(|(_, point)| (center - point).magnitude_squared() <= radius_sq);
    if let Some((index, point)) = edge {
        return Some((point, HitFeature::Edge(index)));
    }

    // Edges include their end points, so this only catches rounding misses.
    triangle
        .vertices()
        .into_iter()
        .enumerate()
        .find(|(_, vertex)| (center - vertex).magnitude_squared() < radius_sq)
        .map(|(index, vertex)| (vertex, HitFeature::Vertex(index)))
}

/// Resolve a body against one triangle
///
/// On a hit the body is pushed out by [`SphereHit::correction`] and a static
/// contact is recorded. The push is applied even when the contact list is
/// already full.
pub fn collide_body(body: &mut Body, triangle: &StaticTriangle, reference: TriangleRef) -> Option<SphereHit> {
    let hit = sphere_vs_triangle(body.position(), body.radius(), triangle)?;

    body.apply_correction(hit.correction());
    body.add_contact(Contact {
        body: None,
        position: hit.point,
        normal: hit.normal,
        triangle: reference,
    });

    Some(hit)
}
