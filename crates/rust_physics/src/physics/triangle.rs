//! Baked static triangles
//!
//! A [`StaticTriangle`] carries everything the narrow phase needs per test,
//! computed once when the triangle is baked: the plane, the barycentric
//! denominators and the three edges as finite segments.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::spatial::Ray;

/// A finite line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// First end point
    pub start: Vec3,
    /// Second end point
    pub end: Vec3,
}

impl Segment {
    /// Create a segment between two points
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// Point of the segment closest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let direction = self.direction();
        let length_sq = direction.magnitude_squared();
        if length_sq <= f32::EPSILON {
            return self.start;
        }
        let t = ((point - self.start).dot(&direction) / length_sq).clamp(0.0, 1.0);
        self.start + direction * t
    }
}

/// Immutable collision triangle with precomputed invariants
///
/// The normal follows the counter-clockwise winding of the source mesh:
/// `normalize((b - a) x (c - a))`. A zero-area triangle leaves `inv_denom`
/// non-finite; such triangles must not be baked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTriangle {
    a: Vec3,
    b: Vec3,
    c: Vec3,
    normal: Vec3,
    ab: Vec3,
    bc: Vec3,
    ca: Vec3,
    ba: Vec3,
    ac_dot_ac: f32,
    ac_dot_ab: f32,
    ab_dot_ab: f32,
    inv_denom: f32,
    edges: [Segment; 3],
    d: f32,
}

impl StaticTriangle {
    /// Bake a triangle from three world-space vertices
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        let ab = b - a;
        let bc = c - b;
        let ca = a - c;
        let ba = a - b;
        let ac = c - a;

        let normal = ab.cross(&ac).normalize();

        let ac_dot_ac = ac.dot(&ac);
        let ac_dot_ab = ac.dot(&ab);
        let ab_dot_ab = ab.dot(&ab);
        let inv_denom = 1.0 / (ac_dot_ac * ab_dot_ab - ac_dot_ab * ac_dot_ab);

        Self {
            a,
            b,
            c,
            normal,
            ab,
            bc,
            ca,
            ba,
            ac_dot_ac,
            ac_dot_ab,
            ab_dot_ab,
            inv_denom,
            edges: [Segment::new(a, b), Segment::new(b, c), Segment::new(c, a)],
            d: -a.dot(&normal),
        }
    }

    /// First vertex
    pub fn a(&self) -> Vec3 {
        self.a
    }

    /// Second vertex
    pub fn b(&self) -> Vec3 {
        self.b
    }

    /// Third vertex
    pub fn c(&self) -> Vec3 {
        self.c
    }

    /// Vertices in winding order
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// Unit face normal
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Edge vectors `b - a`, `c - b`, `a - c`
    pub fn edge_vectors(&self) -> [Vec3; 3] {
        [self.ab, self.bc, self.ca]
    }

    /// Edge vector `a - b`
    pub fn ba(&self) -> Vec3 {
        self.ba
    }

    /// Edges AB, BC, CA as segments
    pub fn edges(&self) -> &[Segment; 3] {
        &self.edges
    }

    /// Plane constant, `dot(normal, p) + d == 0` on the plane
    pub fn plane_d(&self) -> f32 {
        self.d
    }

    /// Reciprocal of the barycentric denominator
    pub fn inv_denom(&self) -> f32 {
        self.inv_denom
    }

    /// Whether the triangle has (numerically) zero area
    pub fn is_degenerate(&self) -> bool {
        !self.inv_denom.is_finite() || !self.normal.iter().all(|v| v.is_finite())
    }

    /// Centroid of the three vertices
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Signed distance from `point` to the triangle plane
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.d
    }

    /// Barycentric inside test for a point on (or projected onto) the plane
    ///
    /// Inclusive on the edges through `a`, exclusive on the edge `bc`.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let ap = point - self.a;
        let ac_dot_ap = (self.c - self.a).dot(&ap);
        let ab_dot_ap = self.ab.dot(&ap);

        let u = (self.ab_dot_ab * ac_dot_ap - self.ac_dot_ab * ab_dot_ap) * self.inv_denom;
        let v = (self.ac_dot_ac * ab_dot_ap - self.ac_dot_ab * ac_dot_ap) * self.inv_denom;

        u >= 0.0 && v >= 0.0 && u + v < 1.0
    }

    /// Möller-Trumbore ray intersection, returns the distance along the ray
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        const EPSILON: f32 = 0.000_001;

        let edge1 = self.ab;
        let edge2 = self.c - self.a;

        let h = ray.direction.cross(&edge2);
        let det = edge1.dot(&h);
        if det.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / det;
        let s = ray.origin - self.a;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor_triangle() -> StaticTriangle {
        StaticTriangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        )
    }

    #[test]
    fn test_normal_follows_winding() {
        let tri = floor_triangle();
        assert_relative_eq!(tri.normal(), Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(tri.normal().magnitude(), 1.0);

        let flipped = StaticTriangle::new(tri.a(), tri.c(), tri.b());
        assert_relative_eq!(flipped.normal(), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_plane_distance() {
        let tri = StaticTriangle::new(
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 2.0, 1.0),
            Vec3::new(1.0, 2.0, 0.0),
        );
        assert_relative_eq!(tri.plane_d(), -2.0);
        assert_relative_eq!(tri.signed_distance(Vec3::new(5.0, 3.5, -4.0)), 1.5);
        assert_relative_eq!(tri.signed_distance(Vec3::new(0.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn test_contains_centroid() {
        let triangles = [
            floor_triangle(),
            StaticTriangle::new(
                Vec3::new(-3.0, 1.0, 2.0),
                Vec3::new(4.0, -2.0, 0.5),
                Vec3::new(0.5, 5.0, -1.0),
            ),
            StaticTriangle::new(
                Vec3::new(100.0, 0.0, 0.0),
                Vec3::new(100.0, 0.1, 0.0),
                Vec3::new(100.0, 0.0, 0.1),
            ),
        ];
        for tri in &triangles {
            assert!(tri.contains_point(tri.centroid()), "centroid outside {tri:?}");
        }
    }

    #[test]
    fn test_rejects_far_points() {
        let tri = floor_triangle();
        assert!(!tri.contains_point(Vec3::new(5.0, 0.0, 5.0)));
        assert!(!tri.contains_point(Vec3::new(-1.0, 0.0, 0.2)));
        assert!(!tri.contains_point(Vec3::new(0.6, 0.0, 0.6)));
    }

    #[test]
    fn test_boundary_convention() {
        let tri = floor_triangle();
        // Vertex a and points on the edges through a are inside
        assert!(tri.contains_point(tri.a()));
        assert!(tri.contains_point(Vec3::new(0.0, 0.0, 0.5)));
        assert!(tri.contains_point(Vec3::new(0.5, 0.0, 0.0)));
        // The edge bc is excluded
        assert!(!tri.contains_point(Vec3::new(0.5, 0.0, 0.5)));
    }

    #[test]
    fn test_segment_closest_point_clamps() {
        let segment = Segment::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(segment.closest_point(Vec3::new(1.0, 3.0, 0.0)), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(segment.closest_point(Vec3::new(-4.0, 1.0, 0.0)), segment.start);
        assert_relative_eq!(segment.closest_point(Vec3::new(9.0, 1.0, 0.0)), segment.end);
    }

    #[test]
    fn test_edges_follow_vertex_order() {
        let tri = floor_triangle();
        let edges = tri.edges();
        assert_eq!(edges[0], Segment::new(tri.a(), tri.b()));
        assert_eq!(edges[1], Segment::new(tri.b(), tri.c()));
        assert_eq!(edges[2], Segment::new(tri.c(), tri.a()));
        assert_eq!(tri.ba(), tri.a() - tri.b());
    }

    #[test]
    fn test_degenerate_triangle_is_flagged() {
        let tri = StaticTriangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        assert!(tri.is_degenerate());
        assert!(!floor_triangle().is_degenerate());
    }

    #[test]
    fn test_ray_hits_face() {
        let tri = floor_triangle();
        let down = Ray::new(Vec3::new(0.2, 5.0, 0.2), Vec3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(tri.intersect_ray(&down).unwrap(), 5.0);

        let beside = Ray::new(Vec3::new(3.0, 5.0, 3.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(tri.intersect_ray(&beside).is_none());
    }

    #[test]
    fn test_serde_round_trip_keeps_precomputed_fields() {
        let tri = StaticTriangle::new(
            Vec3::new(-3.0, 1.0, 2.0),
            Vec3::new(4.0, -2.0, 0.5),
            Vec3::new(0.5, 5.0, -1.0),
        );
        let text = ron::to_string(&tri).unwrap();
        let back: StaticTriangle = ron::from_str(&text).unwrap();
        assert_eq!(back, tri);
    }
}
