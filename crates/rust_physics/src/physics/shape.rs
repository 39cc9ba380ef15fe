//! Convex collision shapes
//!
//! Shapes are described in local space around the body origin. Each one
//! exposes a support function (farthest point along a direction) and a
//! bounding radius. The support function is what a general convex narrow
//! phase would be built on. The physics step itself only resolves spheres
//! against static triangles.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Convex collision shape in local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box given by its half extents
    Box {
        /// Half size on each axis
        half_extents: Vec3,
    },
    /// Sphere around the origin
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Capsule along the Y axis
    Capsule {
        /// Half the distance between the two cap centers
        half_height: f32,
        /// Cap radius
        radius: f32,
    },
    /// Single triangle
    Triangle {
        /// The three corners
        vertices: [Vec3; 3],
    },
    /// Convex hull of a point set
    PointCloud {
        /// Hull points
        points: Vec<Vec3>,
    },
}

impl Shape {
    /// Sphere shape
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box shape from half extents
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box { half_extents }
    }

    /// Farthest point of the shape in `direction`
    ///
    /// `direction` does not need to be normalized. A zero direction returns
    /// some point of the shape.
    pub fn support(&self, direction: Vec3) -> Vec3 {
        match self {
            Self::Box { half_extents } => Vec3::new(
                half_extents.x.copysign(direction.x),
                half_extents.y.copysign(direction.y),
                half_extents.z.copysign(direction.z),
            ),
            Self::Sphere { radius } => scaled_direction(direction, *radius),
            Self::Capsule { half_height, radius } => {
                let cap = Vec3::new(0.0, half_height.copysign(direction.y), 0.0);
                cap + scaled_direction(direction, *radius)
            }
            Self::Triangle { vertices } => farthest(vertices, direction),
            Self::PointCloud { points } => farthest(points, direction),
        }
    }

    /// Radius of the smallest origin-centered sphere containing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Box { half_extents } => half_extents.magnitude(),
            Self::Sphere { radius } => *radius,
            Self::Capsule { half_height, radius } => half_height + radius,
            Self::Triangle { vertices } => max_length(vertices),
            Self::PointCloud { points } => max_length(points),
        }
    }
}

fn scaled_direction(direction: Vec3, length: f32) -> Vec3 {
    direction
        .try_normalize(f32::EPSILON)
        .map_or_else(Vec3::zeros, |unit| unit * length)
}

fn farthest(points: &[Vec3], direction: Vec3) -> Vec3 {
    points
        .iter()
        .copied()
        .max_by(|a, b| a.dot(&direction).total_cmp(&b.dot(&direction)))
        .unwrap_or_else(Vec3::zeros)
}

fn max_length(points: &[Vec3]) -> f32 {
    points.iter().map(|p| p.magnitude()).fold(0.0, f32::max)
}
