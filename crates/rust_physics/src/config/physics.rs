//! Physics configuration sections

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::{vec3_from_array, Vec3};

/// Damped Verlet integrator tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Damping applied to bodies with no contacts during the previous step
    pub air_friction: f32,
    /// Upper bound on the implicit per-step displacement length
    pub max_step_velocity: f32,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            air_friction: 0.01,
            max_step_velocity: 0.75,
        }
    }
}

/// Values new bodies start with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDefaults {
    /// Sphere radius
    pub radius: f32,
    /// Contact friction in [0, 1]; 1 keeps all tangential motion
    pub friction: f32,
    /// Gravity acceleration
    pub gravity: [f32; 3],
}

impl BodyDefaults {
    /// Gravity as a vector
    pub fn gravity(&self) -> Vec3 {
        vec3_from_array(self.gravity)
    }
}

impl Default for BodyDefaults {
    fn default() -> Self {
        Self {
            radius: 1.0,
            friction: 0.985,
            gravity: [0.0, -9.81, 0.0],
        }
    }
}

/// Fixed simulation clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestepConfig {
    /// Seconds per simulation tick
    pub fixed_dt: f32,
    /// Pending ticks allowed before the clock resynchronises
    pub max_ticks_per_frame: u32,
}

impl Default for TimestepConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_ticks_per_frame: 4,
        }
    }
}

/// Octree construction and broad-phase settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeSettings {
    /// Nodes holding fewer triangles than this become leaves
    pub max_triangles_per_node: usize,
    /// Index baked geometry with an octree and use it to prune narrow-phase tests
    pub broad_phase: bool,
}

impl Default for OctreeSettings {
    fn default() -> Self {
        Self {
            max_triangles_per_node: 16,
            broad_phase: false,
        }
    }
}

/// Top-level physics configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Integrator tunables
    pub integrator: IntegratorConfig,
    /// Defaults for newly created bodies
    pub body_defaults: BodyDefaults,
    /// Simulation clock
    pub timestep: TimestepConfig,
    /// Octree settings
    pub octree: OctreeSettings,
}

impl PhysicsConfig {
    /// Check that every value is inside its usable range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let integrator = &self.integrator;
        if !(0.0..=1.0).contains(&integrator.air_friction) {
            return Err(ConfigError::Invalid(format!(
                "air_friction must be in [0, 1], got {}",
                integrator.air_friction
            )));
        }
        if integrator.max_step_velocity <= 0.0 {
            return Err(ConfigError::Invalid(
                "max_step_velocity must be positive".to_string(),
            ));
        }
        if self.body_defaults.radius <= 0.0 {
            return Err(ConfigError::Invalid("body radius must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.body_defaults.friction) {
            return Err(ConfigError::Invalid(format!(
                "body friction must be in [0, 1], got {}",
                self.body_defaults.friction
            )));
        }
        if self.timestep.fixed_dt <= 0.0 {
            return Err(ConfigError::Invalid("fixed_dt must be positive".to_string()));
        }
        if self.timestep.max_ticks_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_ticks_per_frame must be at least 1".to_string(),
            ));
        }
        if self.octree.max_triangles_per_node < 2 {
            return Err(ConfigError::Invalid(
                "max_triangles_per_node must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config for PhysicsConfig {}
