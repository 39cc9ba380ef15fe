//! Physics scene - bodies and the static world they collide with
//!
//! A scene owns its dynamic bodies and its baked static geometries. Bodies
//! are addressed by generational [`BodyKey`]s and stepped in creation order.
//! Geometries are append-only and addressed by their [`GeometryId`], which is
//! their position in the scene.

use slotmap::SlotMap;

use crate::config::PhysicsConfig;
use crate::foundation::math::Vec3;
use crate::physics::body::{Body, BodyKey, GeometryId, TriangleRef};
use crate::physics::geometry::StaticGeometry;
use crate::physics::step::step_body;
use crate::spatial::Ray;

/// Closest static triangle along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Triangle that was hit
    pub triangle: TriangleRef,
    /// Distance along the ray
    pub distance: f32,
    /// Hit point in world space
    pub point: Vec3,
}

/// Bodies and static geometry stepped together
#[derive(Debug, Default)]
pub struct PhysicsScene {
    /// Integrator, body defaults and octree settings
    config: PhysicsConfig,

    /// Body storage
    bodies: SlotMap<BodyKey, Body>,

    /// Creation order, used for stepping
    order: Vec<BodyKey>,

    /// Baked static world, in visiting order
    geometries: Vec<StaticGeometry>,

    /// Broad-phase scratch buffer
    candidates: Vec<u32>,
}

impl PhysicsScene {
    /// Create an empty scene with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create an empty scene with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            config,
            bodies: SlotMap::with_key(),
            order: Vec::new(),
            geometries: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Create a resting body at `position` using the configured body defaults
    pub fn create_body(&mut self, position: Vec3) -> BodyKey {
        let mut body = Body::from_defaults(&self.config.body_defaults);
        body.set_position(position);
        self.add_body(body)
    }

    /// Insert an existing body
    pub fn add_body(&mut self, body: Body) -> BodyKey {
        let key = self.bodies.insert(body);
        self.order.push(key);
        key
    }

    /// Remove a body, returning it if the key was still live
    pub fn remove_body(&mut self, key: BodyKey) -> Option<Body> {
        let body = self.bodies.remove(key)?;
        self.order.retain(|&k| k != key);
        Some(body)
    }

    /// Body by key
    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    /// Mutable body by key, for gameplay setters between steps
    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    /// Bodies in creation order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &Body)> + '_ {
        self.order
            .iter()
            .filter_map(move |&key| self.bodies.get(key).map(|body| (key, body)))
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Attach baked static geometry
    ///
    /// With the broad phase enabled, an octree is built for geometry that
    /// has none. If that fails the geometry is still added and is tested
    /// triangle by triangle.
    pub fn add_geometry(&mut self, mut geometry: StaticGeometry) -> GeometryId {
        let octree = &self.config.octree;
        if octree.broad_phase && !geometry.has_octree() && !geometry.is_empty() {
            if let Err(err) = geometry.build_octree(octree.max_triangles_per_node) {
                log::warn!("Octree build failed, geometry falls back to brute force: {err}");
            }
        }

        let id = GeometryId(self.geometries.len() as u32);
        log::debug!(
            "Added static geometry {} with {} triangles (octree: {})",
            id.0,
            geometry.len(),
            geometry.has_octree()
        );
        self.geometries.push(geometry);
        id
    }

    /// Geometry by id
    pub fn geometry(&self, id: GeometryId) -> Option<&StaticGeometry> {
        self.geometries.get(id.0 as usize)
    }

    /// All geometries in visiting order
    pub fn geometries(&self) -> &[StaticGeometry] {
        &self.geometries
    }

    /// Closest static triangle hit by `ray`
    pub fn raycast(&mut self, ray: &Ray) -> Option<RayHit> {
        self.geometries
            .iter_mut()
            .enumerate()
            .filter_map(|(slot, geometry)| {
                geometry.raycast(ray).map(|(index, distance)| RayHit {
                    triangle: TriangleRef {
                        geometry: GeometryId(slot as u32),
                        index: index as u32,
                    },
                    distance,
                    point: ray.point_at(distance),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Advance the scene by one fixed tick
    pub fn step(&mut self, dt: f32) {
        let integrator = &self.config.integrator;
        for &key in &self.order {
            if let Some(body) = self.bodies.get_mut(key) {
                step_body(body, &mut self.geometries, integrator, dt, &mut self.candidates);
            }
        }
    }
}
