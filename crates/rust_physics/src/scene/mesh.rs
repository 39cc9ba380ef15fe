//! Mesh buffers handed over by the scene/asset side
//!
//! Collision baking only needs positions, so a surface is kept as the raw
//! interleaved vertex bytes the renderer uploads plus a byte stride. The
//! position is expected as three native-endian `f32` at the start of each
//! vertex.

use crate::foundation::math::{vec3_from_array, Vec3};

/// Size in bytes of a packed `[f32; 3]` position
pub const POSITION_SIZE: usize = std::mem::size_of::<[f32; 3]>();

/// One indexed triangle list of a mesh
#[derive(Debug, Clone, Default)]
pub struct MeshSurface {
    /// Interleaved vertex data
    pub vertices: Vec<u8>,
    /// Distance in bytes between consecutive vertices
    pub stride: usize,
    /// Triangle list indices, three per face
    pub indices: Vec<u32>,
}

impl MeshSurface {
    /// Create a surface from raw interleaved vertex bytes
    pub fn new(vertices: Vec<u8>, stride: usize, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            stride,
            indices,
        }
    }

    /// Create a surface from tightly packed positions
    pub fn from_positions(positions: &[[f32; 3]], indices: &[u32]) -> Self {
        Self {
            vertices: bytemuck::cast_slice(positions).to_vec(),
            stride: POSITION_SIZE,
            indices: indices.to_vec(),
        }
    }

    /// Number of vertices addressable with this stride
    pub fn vertex_count(&self) -> usize {
        vertex_count(&self.vertices, self.stride)
    }

    /// Number of complete triangles in the index list
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `index`, `None` when out of range
    pub fn position(&self, index: u32) -> Option<Vec3> {
        read_position(&self.vertices, self.stride, index)
    }
}

/// A renderable mesh as a list of surfaces
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Surfaces, each with its own buffers
    pub surfaces: Vec<MeshSurface>,
}

impl Mesh {
    /// Create a mesh from its surfaces
    pub fn new(surfaces: Vec<MeshSurface>) -> Self {
        Self { surfaces }
    }

    /// Single-surface mesh from packed positions
    pub fn from_positions(positions: &[[f32; 3]], indices: &[u32]) -> Self {
        Self::new(vec![MeshSurface::from_positions(positions, indices)])
    }

    /// Flat quad in the XZ plane centered on the origin, facing +Y
    pub fn quad(half_size: f32) -> Self {
        let h = half_size;
        Self::from_positions(
            &[[-h, 0.0, -h], [-h, 0.0, h], [h, 0.0, h], [h, 0.0, -h]],
            &[0, 1, 2, 0, 2, 3],
        )
    }

    /// XZ grid of `cells` x `cells` quads spanning `size`, facing +Y
    pub fn grid(size: f32, cells: u32) -> Self {
        let cells = cells.max(1);
        let step = size / cells as f32;
        let origin = -size * 0.5;
        let row = cells + 1;

        let mut positions = Vec::with_capacity((row * row) as usize);
        for z in 0..row {
            for x in 0..row {
                positions.push([origin + x as f32 * step, 0.0, origin + z as f32 * step]);
            }
        }

        let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
        for z in 0..cells {
            for x in 0..cells {
                let i0 = z * row + x;
                let i1 = i0 + 1;
                let i2 = i0 + row;
                let i3 = i2 + 1;
                indices.extend_from_slice(&[i0, i2, i3, i0, i3, i1]);
            }
        }

        Self::from_positions(&positions, &indices)
    }

    /// Total triangle count over all surfaces
    pub fn triangle_count(&self) -> usize {
        self.surfaces.iter().map(MeshSurface::triangle_count).sum()
    }
}

/// Number of vertices addressable in `vertices` with `stride`
pub fn vertex_count(vertices: &[u8], stride: usize) -> usize {
    if stride < POSITION_SIZE || vertices.len() < POSITION_SIZE {
        return 0;
    }
    (vertices.len() - POSITION_SIZE) / stride + 1
}

/// Read the position of vertex `index` from a strided buffer
pub fn read_position(vertices: &[u8], stride: usize, index: u32) -> Option<Vec3> {
    if stride < POSITION_SIZE {
        return None;
    }
    let offset = (index as usize).checked_mul(stride)?;
    let bytes = vertices.get(offset..offset.checked_add(POSITION_SIZE)?)?;
    Some(vec3_from_array(bytemuck::pod_read_unaligned::<[f32; 3]>(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_positions_read_back() {
        let surface = MeshSurface::from_positions(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], &[0, 1, 0]);
        assert_eq!(surface.vertex_count(), 2);
        assert_eq!(surface.position(1), Some(Vec3::new(4.0, 5.0, 6.0)));
        assert_eq!(surface.position(2), None);
    }

    #[test]
    fn test_interleaved_stride() {
        // position + normal per vertex
        let data: Vec<[f32; 6]> = vec![
            [0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            [7.0, 8.0, 9.0, 0.0, 1.0, 0.0],
        ];
        let bytes: Vec<u8> = bytemuck::cast_slice(data.as_slice()).to_vec();
        let surface = MeshSurface::new(bytes, 24, vec![0, 1, 1]);
        assert_eq!(surface.vertex_count(), 2);
        assert_eq!(surface.position(1), Some(Vec3::new(7.0, 8.0, 9.0)));
    }

    #[test]
    fn test_grid_counts() {
        let grid = Mesh::grid(10.0, 4);
        assert_eq!(grid.triangle_count(), 32);
        assert_eq!(grid.surfaces[0].vertex_count(), 25);
    }

    #[test]
    fn test_stride_too_small() {
        assert_eq!(read_position(&[0u8; 24], 8, 0), None);
        assert_eq!(vertex_count(&[0u8; 24], 8), 0);
    }
}
