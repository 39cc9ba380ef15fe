//! Sphere physics against static triangle geometry
//!
//! Bodies are integrated with damped Verlet steps and pushed out of baked
//! static triangles by the narrow phase in [`collision`]. [`physics_step`]
//! drives both for a list of scenes.

pub mod body;
pub mod collision;
pub mod geometry;
pub mod shape;
pub mod step;
pub mod triangle;

#[cfg(test)]
mod tests;

pub use body::{Body, BodyKey, Contact, ContactList, GeometryId, TriangleRef, MAX_CONTACTS};
pub use collision::{collide_body, sphere_vs_triangle, HitFeature, SphereHit};
pub use geometry::{GeometryError, StaticGeometry};
pub use shape::Shape;
pub use step::{physics_step, step_body};
pub use triangle::{Segment, StaticTriangle};
