//! # Rust Physics
//!
//! Rigid-sphere physics and static collision for real-time 3D scenes.
//!
//! ## Features
//!
//! - **Damped Verlet bodies**: implicit velocity, per-step velocity cap and
//!   a fixed-capacity contact list
//! - **Static geometry**: meshes baked into world-space triangles with
//!   precomputed plane and barycentric data
//! - **Octree**: arena-backed spatial index for ray and sphere queries, and
//!   an optional broad phase
//! - **Fixed timestep**: accumulator with spiral-of-death protection
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_physics::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = PhysicsScene::new();
//!     scene.add_geometry(StaticGeometry::from_mesh(&Mesh::quad(10.0), &Mat4::identity())?);
//!     let ball = scene.create_body(Vec3::new(0.0, 5.0, 0.0));
//!
//!     let mut scenes = vec![scene];
//!     for _ in 0..120 {
//!         physics_step(&mut scenes, 1.0 / 60.0);
//!     }
//!     println!("{:?}", scenes[0].body(ball).map(Body::position));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod scene;
pub mod spatial;

/// Common imports for physics users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        foundation::{
            math::{Mat4, Transform, Vec3},
            time::{FixedTimestep, Timer},
        },
        physics::{physics_step, Body, BodyKey, Contact, GeometryError, StaticGeometry, StaticTriangle},
        scene::{Mesh, MeshSurface, PhysicsScene},
        spatial::{Octree, Ray},
    };
}
