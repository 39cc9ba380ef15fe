//! Dynamic sphere bodies and their contacts
//!
//! Bodies use position-based damped Verlet integration. Velocity is never
//! stored: it is the difference between the current and the previous
//! position, so moving a body without giving it speed means moving both.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::config::{BodyDefaults, IntegratorConfig};
use crate::foundation::math::Vec3;
use crate::physics::shape::Shape;

new_key_type! {
    /// Key to a body in a physics scene
    ///
    /// Generational, so a key to a removed body stays invalid even after
    /// its slot is reused.
    pub struct BodyKey;
}

/// Maximum contacts a body records per step
pub const MAX_CONTACTS: usize = 8;

/// Default sphere radius
pub const DEFAULT_RADIUS: f32 = 1.0;

/// Default contact friction
pub const DEFAULT_FRICTION: f32 = 0.985;

/// Default gravity acceleration
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Index of a static geometry inside its scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryId(pub u32);

/// A triangle of a particular static geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriangleRef {
    /// Owning geometry
    pub geometry: GeometryId,
    /// Position of the triangle in the geometry
    pub index: u32,
}

/// A touch between a body and something else, valid for one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Contact {
    /// Other body involved, `None` for static world geometry
    pub body: Option<BodyKey>,
    /// Contact point in world space
    pub position: Vec3,
    /// Unit normal pointing from the contact point towards the body center
    pub normal: Vec3,
    /// Triangle that was hit
    pub triangle: TriangleRef,
}

/// Fixed-capacity contact storage, no allocation per step
#[derive(Debug, Clone, Default)]
pub struct ContactList {
    contacts: [Contact; MAX_CONTACTS],
    count: usize,
}

impl ContactList {
    /// Append a contact, `None` when the list is already full
    pub fn push(&mut self, contact: Contact) -> Option<&Contact> {
        if self.count >= MAX_CONTACTS {
            return None;
        }
        let slot = &mut self.contacts[self.count];
        *slot = contact;
        self.count += 1;
        Some(slot)
    }

    /// Forget every contact
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Number of stored contacts
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no contact is stored
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether no more contacts fit
    pub fn is_full(&self) -> bool {
        self.count >= MAX_CONTACTS
    }

    /// Stored contacts
    pub fn as_slice(&self) -> &[Contact] {
        &self.contacts[..self.count]
    }

    /// Contact by index
    pub fn get(&self, index: usize) -> Option<&Contact> {
        self.as_slice().get(index)
    }
}

/// A dynamic sphere integrated with damped Verlet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    position: Vec3,
    last_position: Vec3,
    acceleration: Vec3,
    friction: f32,
    gravity: Vec3,
    scale: Vec3,
    radius: f32,
    #[serde(skip)]
    contacts: ContactList,
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Body {
    /// Create a body at the origin with default radius, friction and gravity
    pub fn new() -> Self {
        Self {
            position: Vec3::zeros(),
            last_position: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            friction: DEFAULT_FRICTION,
            gravity: DEFAULT_GRAVITY,
            scale: Vec3::new(1.0, 1.0, 1.0),
            radius: DEFAULT_RADIUS,
            contacts: ContactList::default(),
        }
    }

    /// Create a resting sphere body
    pub fn new_sphere(position: Vec3, radius: f32) -> Self {
        let mut body = Self::new();
        body.set_position(position);
        body.radius = radius;
        body
    }

    /// Create a body using configured defaults
    pub fn from_defaults(defaults: &BodyDefaults) -> Self {
        let mut body = Self::new();
        body.radius = defaults.radius;
        body.set_friction(defaults.friction);
        body.gravity = defaults.gravity();
        body
    }

    /// Builder-style radius
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Builder-style gravity
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder-style friction, clamped to [0, 1]
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.set_friction(friction);
        self
    }

    /// Builder-style initial velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.set_velocity(velocity);
        self
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Position before the last integration
    pub fn last_position(&self) -> Vec3 {
        self.last_position
    }

    /// Implicit per-step displacement, `position - last_position`
    pub fn velocity(&self) -> Vec3 {
        self.position - self.last_position
    }

    /// Acceleration accumulated for the next step
    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Contact friction in [0, 1]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Gravity acceleration
    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Sphere radius
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Stored scale; collision only uses the radius
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Collision shape of this body
    pub fn shape(&self) -> Shape {
        Shape::Sphere { radius: self.radius }
    }

    /// Teleport: moves the body and zeroes its velocity
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.last_position = position;
    }

    /// Set the per-step displacement without moving the body
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.last_position = self.position - velocity;
    }

    /// Set the X component of the per-step displacement
    pub fn set_velocity_x(&mut self, x: f32) {
        self.last_position.x = self.position.x - x;
    }

    /// Set the Y component of the per-step displacement
    pub fn set_velocity_y(&mut self, y: f32) {
        self.last_position.y = self.position.y - y;
    }

    /// Set the Z component of the per-step displacement
    pub fn set_velocity_z(&mut self, z: f32) {
        self.last_position.z = self.position.z - z;
    }

    /// Set the sphere radius
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    /// Set the gravity acceleration
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Set contact friction, clamped to [0, 1]
    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction.clamp(0.0, 1.0);
    }

    /// Set the stored scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Add to the acceleration applied on the next step
    pub fn add_acceleration(&mut self, acceleration: Vec3) {
        self.acceleration += acceleration;
    }

    /// Move the body without touching its previous position
    ///
    /// Positional push-out: the displacement also changes the implicit velocity.
    pub fn apply_correction(&mut self, correction: Vec3) {
        self.position += correction;
    }

    /// Contacts recorded during the last step
    pub fn contacts(&self) -> &[Contact] {
        self.contacts.as_slice()
    }

    /// Number of contacts recorded during the last step
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Contact by index
    pub fn contact(&self, index: usize) -> Option<&Contact> {
        self.contacts.get(index)
    }

    /// Record a contact; `None` once [`MAX_CONTACTS`] are stored this step
    pub fn add_contact(&mut self, contact: Contact) -> Option<&Contact> {
        if self.contacts.is_full() {
            log::trace!("Contact list full, dropping contact at {:?}", contact.position);
        }
        self.contacts.push(contact)
    }

    /// Forget the contacts of the previous step
    pub fn clear_contacts(&mut self) {
        self.contacts.clear();
    }

    /// Advance the body by one fixed step
    ///
    /// Clears contacts, applies gravity and accumulated acceleration, runs
    /// the damped Verlet update and caps the resulting step displacement.
    /// Bodies that touched something in the previous step are damped with
    /// their own friction, the rest with `air_friction`.
    pub fn integrate(&mut self, dt: f32, config: &IntegratorConfig) {
        let had_contacts = !self.contacts.is_empty();
        self.contacts.clear();

        self.acceleration += self.gravity;

        let damping = if had_contacts {
            1.0 - self.friction
        } else {
            config.air_friction
        };
        let next = self.position * (2.0 - damping) - self.last_position * (1.0 - damping)
            + self.acceleration * (dt * dt);
        self.last_position = self.position;
        self.position = next;

        self.acceleration = Vec3::zeros();

        let cap = config.max_step_velocity;
        let backwards = self.last_position - self.position;
        if backwards.magnitude_squared() > cap * cap {
            self.last_position = self.position + backwards.normalize() * cap;
        }
    }
}
