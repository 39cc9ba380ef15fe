//! Triangle-level spatial queries for broad-phase pruning
//!
//! The narrow phase walks triangles in baked order, so candidate sets are
//! handed back sorted and without repeats: testing only the candidates keeps
//! the same visiting order as testing everything.

use crate::foundation::math::Vec3;
use crate::spatial::{Octree, Ray};

/// Spatial structure able to list the triangles near a query shape
pub trait SpatialQuery {
    /// Face numbers possibly touching the sphere, ascending and unique
    fn query_sphere(&mut self, center: Vec3, radius: f32, out: &mut Vec<u32>);

    /// Face numbers possibly crossed by the ray, ascending and unique
    fn query_ray(&mut self, ray: &Ray, out: &mut Vec<u32>);
}

impl SpatialQuery for Octree {
    fn query_sphere(&mut self, center: Vec3, radius: f32, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.trace_sphere(center, radius).triangles());
        out.sort_unstable();
        out.dedup();
    }

    fn query_ray(&mut self, ray: &Ray, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.trace_ray(ray).triangles());
        out.sort_unstable();
        out.dedup();
    }
}
