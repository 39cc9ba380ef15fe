//! Static collision geometry baked from meshes
//!
//! A [`StaticGeometry`] is an ordered, append-only list of
//! [`StaticTriangle`]s in world space. The order is the order the narrow
//! phase visits them in, which makes it part of the simulation result.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{transform_position, Mat4, Vec3};
use crate::physics::triangle::StaticTriangle;
use crate::scene::mesh::{vertex_count, POSITION_SIZE};
use crate::scene::{Mesh, AABB};
use crate::spatial::{Octree, OctreeError, Ray, SpatialQuery};

/// Errors raised while baking mesh buffers into static geometry
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Stride cannot hold a position
    #[error("surface {surface}: vertex stride {stride} is smaller than a 12-byte position")]
    InvalidStride {
        /// Surface number in the mesh
        surface: usize,
        /// Offending stride
        stride: usize,
    },

    /// Index buffer is not a triangle list
    #[error("surface {surface}: index count {count} is not a multiple of 3")]
    IncompleteTriangle {
        /// Surface number in the mesh
        surface: usize,
        /// Index count
        count: usize,
    },

    /// An index points past the vertex buffer
    #[error("surface {surface}: index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Surface number in the mesh
        surface: usize,
        /// Offending index
        index: u32,
        /// Vertices available
        vertex_count: usize,
    },
}

/// Ordered collection of baked static triangles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticGeometry {
    triangles: Vec<StaticTriangle>,
    #[serde(skip)]
    octree: Option<Octree>,
    #[serde(skip)]
    candidates: Vec<u32>,
}

impl StaticGeometry {
    /// Create empty geometry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bake a mesh into new geometry
    pub fn from_mesh(mesh: &Mesh, transform: &Mat4) -> Result<Self, GeometryError> {
        let mut geometry = Self::new();
        geometry.fill(mesh, transform)?;
        Ok(geometry)
    }

    /// Append one triangle
    pub fn push(&mut self, triangle: StaticTriangle) {
        self.invalidate_octree();
        self.triangles.push(triangle);
    }

    /// Bake every triangle of every surface of `mesh`, transformed to world space
    ///
    /// The whole mesh is checked before anything is appended, so on error
    /// the geometry is left unchanged. Returns the number of triangles added.
    pub fn fill(&mut self, mesh: &Mesh, transform: &Mat4) -> Result<usize, GeometryError> {
        let mut baked = Vec::with_capacity(mesh.triangle_count());

        for (surface_index, surface) in mesh.surfaces.iter().enumerate() {
            if surface.stride < POSITION_SIZE {
                return Err(GeometryError::InvalidStride {
                    surface: surface_index,
                    stride: surface.stride,
                });
            }
            if surface.indices.len() % 3 != 0 {
                return Err(GeometryError::IncompleteTriangle {
                    surface: surface_index,
                    count: surface.indices.len(),
                });
            }

            let world_position = |index: u32| {
                surface
                    .position(index)
                    .map(|local| transform_position(transform, local))
                    .ok_or(GeometryError::IndexOutOfRange {
                        surface: surface_index,
                        index,
                        vertex_count: vertex_count(&surface.vertices, surface.stride),
                    })
            };

            for face in surface.indices.chunks_exact(3) {
                let a = world_position(face[0])?;
                let b = world_position(face[1])?;
                let c = world_position(face[2])?;
                baked.push(StaticTriangle::new(a, b, c));
            }
        }

        let added = baked.len();
        if added > 0 {
            self.invalidate_octree();
            self.triangles.extend(baked);
        }
        log::debug!(
            "Baked {added} triangles from {} surfaces ({} total)",
            mesh.surfaces.len(),
            self.triangles.len()
        );
        Ok(added)
    }

    /// Baked triangles in visiting order
    pub fn triangles(&self) -> &[StaticTriangle] {
        &self.triangles
    }

    /// Triangle by index
    pub fn triangle(&self, index: usize) -> Option<&StaticTriangle> {
        self.triangles.get(index)
    }

    /// Number of triangles
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether no triangle was baked
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounds of all triangles
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.triangles.iter().flat_map(StaticTriangle::vertices))
    }

    /// Index the baked triangles with an octree for broad-phase queries
    pub fn build_octree(&mut self, max_triangles_per_node: usize) -> Result<(), OctreeError> {
        let positions: Vec<[f32; 3]> = self
            .triangles
            .iter()
            .flat_map(StaticTriangle::vertices)
            .map(|v| [v.x, v.y, v.z])
            .collect();
        let indices: Vec<u32> = (0..positions.len() as u32).collect();
        let octree = Octree::from_positions(&positions, &indices, max_triangles_per_node)?;
        self.octree = Some(octree);
        Ok(())
    }

    /// Attached octree, if built
    pub fn octree(&self) -> Option<&Octree> {
        self.octree.as_ref()
    }

    /// Whether an octree is attached
    pub fn has_octree(&self) -> bool {
        self.octree.is_some()
    }

    fn invalidate_octree(&mut self) {
        if self.octree.take().is_some() {
            log::debug!("Static geometry changed, dropping its octree");
        }
    }

    /// Collect the triangles that may touch a sphere into `out`, in visiting order
    ///
    /// Without an octree every triangle is a candidate.
    pub fn candidates_near(&mut self, center: Vec3, radius: f32, out: &mut Vec<u32>) {
        match self.octree.as_mut() {
            Some(octree) => octree.query_sphere(center, radius, out),
            None => {
                out.clear();
                out.extend(0..self.triangles.len() as u32);
            }
        }
    }

    /// Closest triangle hit by a ray as `(triangle index, distance)`
    pub fn raycast(&mut self, ray: &Ray) -> Option<(usize, f32)> {
        if let Some(octree) = self.octree.as_mut() {
            octree.query_ray(ray, &mut self.candidates);
        } else {
            self.candidates.clear();
            self.candidates.extend(0..self.triangles.len() as u32);
        }

        let triangles = &self.triangles;
        self.candidates
            .iter()
            .filter_map(|&index| {
                let index = index as usize;
                triangles[index].intersect_ray(ray).map(|t| (index, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::scene::MeshSurface;
    use approx::assert_relative_eq;

    #[test]
    fn test_fill_transforms_vertices() {
        let matrix = Transform::from_position(Vec3::new(0.0, -2.0, 0.0)).to_matrix();
        let geometry = StaticGeometry::from_mesh(&Mesh::quad(5.0), &matrix).unwrap();

        assert_eq!(geometry.len(), 2);
        for tri in geometry.triangles() {
            for v in tri.vertices() {
                assert_relative_eq!(v.y, -2.0);
            }
            assert_relative_eq!(tri.normal(), Vec3::new(0.0, 1.0, 0.0));
        }
        let bounds = geometry.bounds().unwrap();
        assert_relative_eq!(bounds.min, Vec3::new(-5.0, -2.0, -5.0));
        assert_relative_eq!(bounds.max, Vec3::new(5.0, -2.0, 5.0));
    }

    #[test]
    fn test_fill_keeps_surface_and_index_order() {
        let first = MeshSurface::from_positions(
            &[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
            &[0, 1, 2],
        );
        let second = MeshSurface::from_positions(
            &[[0.0, 5.0, 0.0], [0.0, 5.0, 1.0], [1.0, 5.0, 0.0]],
            &[0, 1, 2, 2, 1, 0],
        );
        let mut geometry = StaticGeometry::new();
        let added = geometry.fill(&Mesh::new(vec![first, second]), &Mat4::identity()).unwrap();

        assert_eq!(added, 3);
        assert_eq!(geometry.triangle(0).unwrap().a().y, 0.0);
        assert_eq!(geometry.triangle(1).unwrap().a().y, 5.0);
        assert_eq!(geometry.triangle(2).unwrap().a(), Vec3::new(1.0, 5.0, 0.0));
    }

    #[test]
    fn test_fill_is_append_only() {
        let mut geometry = StaticGeometry::new();
        geometry.fill(&Mesh::quad(1.0), &Mat4::identity()).unwrap();
        geometry.fill(&Mesh::quad(2.0), &Mat4::identity()).unwrap();
        assert_eq!(geometry.len(), 4);
    }

    #[test]
    fn test_fill_rejects_bad_surface_without_side_effects() {
        let mut geometry = StaticGeometry::new();
        let good = MeshSurface::from_positions(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]], &[0, 1, 2]);
        let bad = MeshSurface::from_positions(&[[0.0, 0.0, 0.0]], &[0, 0, 9]);

        let result = geometry.fill(&Mesh::new(vec![good, bad]), &Mat4::identity());
        assert_eq!(
            result,
            Err(GeometryError::IndexOutOfRange { surface: 1, index: 9, vertex_count: 1 })
        );
        assert!(geometry.is_empty());

        let partial = MeshSurface::from_positions(&[[0.0, 0.0, 0.0]], &[0, 0]);
        assert!(matches!(
            geometry.fill(&Mesh::new(vec![partial]), &Mat4::identity()),
            Err(GeometryError::IncompleteTriangle { surface: 0, count: 2 })
        ));
    }

    #[test]
    fn test_octree_candidates_are_ordered_subset() {
        let mut geometry = StaticGeometry::from_mesh(&Mesh::grid(20.0, 10), &Mat4::identity()).unwrap();
        let total = geometry.len();
        let mut near = Vec::new();
        geometry.candidates_near(Vec3::zeros(), 1.0, &mut near);
        assert_eq!(near.len(), total);

        geometry.build_octree(12).unwrap();
        assert!(geometry.has_octree());
        geometry.candidates_near(Vec3::new(-9.0, 0.5, -9.0), 1.0, &mut near);
        assert!(!near.is_empty());
        assert!(near.len() < total);
        assert!(near.windows(2).all(|pair| pair[0] < pair[1]));

        geometry.push(StaticTriangle::new(Vec3::zeros(), Vec3::z(), Vec3::x()));
        assert!(!geometry.has_octree());
    }

    #[test]
    fn test_raycast_with_and_without_octree() {
        let mut geometry = StaticGeometry::new();
        geometry.fill(&Mesh::grid(10.0, 5), &Mat4::identity()).unwrap();
        let lifted = Transform::from_position(Vec3::new(0.0, 3.0, 0.0)).to_matrix();
        geometry.fill(&Mesh::quad(1.0), &lifted).unwrap();

        let ray = Ray::new(Vec3::new(0.2, 10.0, 0.3), Vec3::new(0.0, -1.0, 0.0));
        let brute = geometry.raycast(&ray).unwrap();
        assert_relative_eq!(brute.1, 7.0, epsilon = 1e-5);
        assert!(brute.0 >= 50);

        geometry.build_octree(8).unwrap();
        let indexed = geometry.raycast(&ray).unwrap();
        assert_eq!(indexed.0, brute.0);
        assert_relative_eq!(indexed.1, brute.1);

        let away = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert!(geometry.raycast(&away).is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let geometry = StaticGeometry::from_mesh(&Mesh::quad(2.0), &Mat4::identity()).unwrap();
        let text = ron::to_string(&geometry).unwrap();
        let back: StaticGeometry = ron::from_str(&text).unwrap();
        assert_eq!(back.triangles(), geometry.triangles());
        assert!(!back.has_octree());
    }
}
