//! Math utilities and types
//!
//! Thin aliases over nalgebra plus the handful of helpers the physics core
//! needs for baking geometry into world space.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
///
/// Used to build the world matrices static geometry is baked with.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Replace the scale of this transform
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Transform a position (w = 1) by a 4x4 matrix
pub fn transform_position(matrix: &Mat4, position: Vec3) -> Vec3 {
    matrix.transform_point(&Point3::from(position)).coords
}

/// Build a vector from a packed `[x, y, z]` triple
pub fn vec3_from_array(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transform_position_applies_translation() {
        let matrix = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).to_matrix();
        let moved = transform_position(&matrix, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Vec3::new(2.0, 2.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn test_transform_scale_then_translate() {
        let matrix = Transform::from_position(Vec3::new(0.0, -1.0, 0.0))
            .with_scale(Vec3::new(10.0, 1.0, 10.0))
            .to_matrix();
        let moved = transform_position(&matrix, Vec3::new(1.0, 0.0, -1.0));
        assert_relative_eq!(moved, Vec3::new(10.0, -1.0, -10.0), epsilon = EPSILON);
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let matrix = Mat4::rotation_z(std::f32::consts::FRAC_PI_2);
        let moved = transform_position(&matrix, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Vec3::new(0.0, 1.0, 0.0), epsilon = EPSILON);
    }
}
