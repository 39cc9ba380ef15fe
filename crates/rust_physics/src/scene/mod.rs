//! Scene data consumed and owned by the physics core
//!
//! - [`Mesh`] is the renderable-side input: per-surface strided vertex
//!   bytes and triangle-list indices
//! - [`AABB`] bounds used by the octree and geometry queries
//! - [`PhysicsScene`] owns bodies and baked static geometry

mod aabb;
pub mod mesh;
mod physics_scene;

pub use aabb::AABB;
pub use mesh::{Mesh, MeshSurface};
pub use physics_scene::{PhysicsScene, RayHit};
