//! Axis-aligned bounding boxes

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest box containing every point, or `None` for an empty set
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first, first);
        for point in points {
            bounds.expand_to_include(point);
        }
        Some(bounds)
    }

    /// Grow the box so it contains `point`
    pub fn expand_to_include(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// One of the eight boxes obtained by splitting at the center
    ///
    /// Bit 0 selects +X, bit 1 +Y, bit 2 +Z.
    pub fn octant(&self, index: usize) -> Self {
        let center = self.center();
        let mut min = self.min;
        let mut max = center;
        if index & 1 != 0 {
            min.x = center.x;
            max.x = self.max.x;
        }
        if index & 2 != 0 {
            min.y = center.y;
            max.y = self.max.y;
        }
        if index & 4 != 0 {
            min.z = center.z;
            max.z = self.max.z;
        }
        Self::new(min, max)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB overlaps another
    ///
    /// Compares center separation against summed extents on every axis,
    /// touching boxes count as overlapping.
    pub fn overlaps(&self, other: &AABB) -> bool {
        let separation = (self.center() - other.center()).abs();
        let reach = self.extents() + other.extents();
        separation.x <= reach.x && separation.y <= reach.y && separation.z <= reach.z
    }

    /// Squared distance from `point` to the box, zero when inside
    pub fn distance_squared_to_point(&self, point: Vec3) -> f32 {
        let mut distance_sq = 0.0;
        for axis in 0..3 {
            let value = point[axis];
            if value < self.min[axis] {
                let d = self.min[axis] - value;
                distance_sq += d * d;
            } else if value > self.max[axis] {
                let d = value - self.max[axis];
                distance_sq += d * d;
            }
        }
        distance_sq
    }

    /// Check if a sphere touches this box
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.distance_squared_to_point(center) <= radius * radius
    }

    /// Test ray intersection with this AABB using slab method
    /// Returns the distance to the entry point if the ray intersects, None otherwise
    /// Based on "An Efficient and Robust Ray–Box Intersection Algorithm"
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray_origin[axis];
            let (min, max) = (self.min[axis], self.max[axis]);

            // Parallel to this slab: inside it everywhere or nowhere.
            if ray_dir[axis] == 0.0 {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inv_dir = 1.0 / ray_dir[axis];
            let t1 = (min - origin) * inv_dir;
            let t2 = (max - origin) * inv_dir;
            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        // Ray intersects if tmax >= tmin and tmax >= 0
        if tmax >= tmin && tmax >= 0.0 {
            // Return entry point distance (or 0 if we're inside the box)
            Some(tmin.max(0.0))
        } else {
            None
        }
    }
}
