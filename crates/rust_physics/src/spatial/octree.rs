//! Octree over a raw triangle mesh
//!
//! Built once from a strided vertex buffer and a triangle-list index buffer.
//! Nodes live in a flat arena and refer to their children by [`NodeId`];
//! leaves own the index triples of the triangles whose bounds overlap them,
//! so a triangle straddling a split plane is stored in every leaf it touches.
//!
//! Queries reuse a trace buffer sized to the leaf count. Each query
//! overwrites it, and the returned [`Trace`] borrows the octree, so only one
//! query result can be alive at a time.

use crate::foundation::math::Vec3;
use crate::scene::mesh::{read_position, vertex_count, POSITION_SIZE};
use crate::scene::AABB;
use crate::spatial::Ray;

/// Depth at which nodes stop splitting regardless of triangle count
///
/// Triangles sharing a vertex all overlap every box around that vertex, so a
/// fan with more faces than the split threshold would otherwise subdivide
/// forever.
pub const MAX_DEPTH: u32 = 10;

/// Index of a node in the octree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Contents of a node: triangles for leaves, eight children otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf holding the triangles that overlap its bounds
    Leaf {
        /// Face numbers (position of the triple in the source index buffer / 3)
        triangles: Vec<u32>,
        /// Vertex index triples of those faces, flattened
        indices: Vec<u32>,
    },
    /// Interior node split at its center
    Split {
        /// Octants, bit 0 = +X, bit 1 = +Y, bit 2 = +Z
        children: [NodeId; 8],
    },
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// World-space bounds of this node
    pub bounds: AABB,
    /// Depth in the tree (0 = root)
    pub depth: u32,
    kind: NodeKind,
}

impl OctreeNode {
    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Leaf or split contents
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Children of a split node
    pub fn children(&self) -> Option<&[NodeId; 8]> {
        match &self.kind {
            NodeKind::Split { children } => Some(children),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Face numbers stored in a leaf, empty for split nodes
    pub fn triangles(&self) -> &[u32] {
        match &self.kind {
            NodeKind::Leaf { triangles, .. } => triangles,
            NodeKind::Split { .. } => &[],
        }
    }

    /// Vertex index triples stored in a leaf, empty for split nodes
    pub fn indices(&self) -> &[u32] {
        match &self.kind {
            NodeKind::Leaf { indices, .. } => indices,
            NodeKind::Split { .. } => &[],
        }
    }
}

/// Errors raised while building an octree from mesh buffers
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OctreeError {
    /// Stride cannot hold a position
    #[error("vertex stride {0} is smaller than a 12-byte position")]
    InvalidStride(usize),

    /// Index buffer is not a triangle list
    #[error("index count {0} is not a multiple of 3")]
    IncompleteTriangle(usize),

    /// An index points past the vertex buffer
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Vertices available
        vertex_count: usize,
    },

    /// No triangles to index
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// Threshold can never produce a leaf for shared geometry
    #[error("max_triangles_per_node must be at least 2, got {0}")]
    InvalidThreshold(usize),
}

/// Leaves reached by the most recent query
#[derive(Debug, Clone, Copy)]
pub struct Trace<'a> {
    nodes: &'a [OctreeNode],
    leaves: &'a [NodeId],
}

impl<'a> Trace<'a> {
    /// Leaf ids in traversal order
    pub fn leaves(&self) -> &'a [NodeId] {
        self.leaves
    }

    /// Number of leaves reached
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Whether the query reached no leaf
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Face numbers of every reached leaf, with repeats for shared faces
    pub fn triangles(&self) -> impl Iterator<Item = u32> + 'a {
        let nodes = self.nodes;
        self.leaves
            .iter()
            .flat_map(move |id| nodes[id.index()].triangles().iter().copied())
    }

    /// Reached leaf nodes
    pub fn nodes(&self) -> impl Iterator<Item = &'a OctreeNode> + 'a {
        let nodes = self.nodes;
        self.leaves.iter().map(move |id| &nodes[id.index()])
    }
}

/// Octree spatial index over a triangle mesh
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    trace: Vec<NodeId>,
    leaf_count: usize,
    triangle_count: usize,
    max_depth: u32,
}

/// Per-build scratch data
struct BuildContext<'a> {
    indices: &'a [u32],
    face_bounds: Vec<AABB>,
    max_triangles_per_node: usize,
}

impl Octree {
    /// Build an octree from a strided vertex buffer and triangle-list indices
    ///
    /// Nodes holding fewer than `max_triangles_per_node` faces become leaves,
    /// the rest split into eight equal octants.
    pub fn build(
        vertices: &[u8],
        stride: usize,
        indices: &[u32],
        max_triangles_per_node: usize,
    ) -> Result<Self, OctreeError> {
        if stride < POSITION_SIZE {
            return Err(OctreeError::InvalidStride(stride));
        }
        if indices.len() % 3 != 0 {
            return Err(OctreeError::IncompleteTriangle(indices.len()));
        }
        if indices.is_empty() {
            return Err(OctreeError::EmptyMesh);
        }
        if max_triangles_per_node < 2 {
            return Err(OctreeError::InvalidThreshold(max_triangles_per_node));
        }

        let available = vertex_count(vertices, stride);
        let mut positions = Vec::with_capacity(indices.len());
        for &index in indices {
            let position = read_position(vertices, stride, index).ok_or(
                OctreeError::IndexOutOfRange {
                    index,
                    vertex_count: available,
                },
            )?;
            positions.push(position);
        }

        let face_bounds: Vec<AABB> = positions
            .chunks_exact(3)
            .filter_map(|face| AABB::from_points(face.iter().copied()))
            .collect();
        let root_bounds =
            AABB::from_points(positions.iter().copied()).ok_or(OctreeError::EmptyMesh)?;

        let context = BuildContext {
            indices,
            face_bounds,
            max_triangles_per_node,
        };
        let triangle_count = context.face_bounds.len();

        let mut octree = Self {
            nodes: Vec::new(),
            trace: Vec::new(),
            leaf_count: 0,
            triangle_count,
            max_depth: 0,
        };
        let all_faces = (0..triangle_count as u32).collect();
        octree.build_node(&context, root_bounds, all_faces, 0);
        octree.trace = Vec::with_capacity(octree.leaf_count);

        log::debug!(
            "Built octree over {} triangles: {} nodes, {} leaves, depth {}",
            octree.triangle_count,
            octree.nodes.len(),
            octree.leaf_count,
            octree.max_depth
        );

        Ok(octree)
    }

    /// Build an octree over tightly packed `[x, y, z]` positions
    pub fn from_positions(
        positions: &[[f32; 3]],
        indices: &[u32],
        max_triangles_per_node: usize,
    ) -> Result<Self, OctreeError> {
        Self::build(
            bytemuck::cast_slice(positions),
            POSITION_SIZE,
            indices,
            max_triangles_per_node,
        )
    }

    fn build_node(
        &mut self,
        context: &BuildContext<'_>,
        bounds: AABB,
        faces: Vec<u32>,
        depth: u32,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.max_depth = self.max_depth.max(depth);

        if faces.len() < context.max_triangles_per_node || depth >= MAX_DEPTH {
            if depth >= MAX_DEPTH && faces.len() >= context.max_triangles_per_node {
                log::trace!("Octree depth limit reached with {} triangles in one leaf", faces.len());
            }
            let indices = faces
                .iter()
                .flat_map(|&face| {
                    let first = face as usize * 3;
                    context.indices[first..first + 3].iter().copied()
                })
                .collect();
            self.nodes.push(OctreeNode {
                bounds,
                depth,
                kind: NodeKind::Leaf {
                    triangles: faces,
                    indices,
                },
            });
            self.leaf_count += 1;
            return id;
        }

        // Reserve the slot so children land after their parent
        self.nodes.push(OctreeNode {
            bounds,
            depth,
            kind: NodeKind::Split {
                children: [id; 8],
            },
        });

        let mut children = [id; 8];
        for (octant, child) in children.iter_mut().enumerate() {
            let child_bounds = bounds.octant(octant);
            let child_faces = faces
                .iter()
                .copied()
                .filter(|&face| context.face_bounds[face as usize].overlaps(&child_bounds))
                .collect();
            *child = self.build_node(context, child_bounds, child_faces, depth + 1);
        }

        self.nodes[id.index()].kind = NodeKind::Split { children };
        id
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Bounds of the whole tree
    pub fn bounds(&self) -> AABB {
        self.nodes[0].bounds
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &OctreeNode {
        &self.nodes[id.index()]
    }

    /// All nodes in arena order
    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    /// Total node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves, also the trace buffer capacity
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of triangles the tree was built from
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Deepest node depth
    pub fn depth(&self) -> u32 {
        self.max_depth
    }

    /// Collect the leaves whose bounds the ray passes through
    pub fn trace_ray(&mut self, ray: &Ray) -> Trace<'_> {
        let (origin, direction) = (ray.origin, ray.direction);
        self.trace_with(|bounds| bounds.intersect_ray(origin, direction).is_some())
    }

    /// Collect the leaves whose bounds touch the sphere
    pub fn trace_sphere(&mut self, center: Vec3, radius: f32) -> Trace<'_> {
        self.trace_with(|bounds| bounds.intersects_sphere(center, radius))
    }

    /// Result of the most recent query
    pub fn last_trace(&self) -> Trace<'_> {
        Trace {
            nodes: &self.nodes,
            leaves: &self.trace,
        }
    }

    fn trace_with<F>(&mut self, test: F) -> Trace<'_>
    where
        F: Fn(&AABB) -> bool,
    {
        let root = self.root();
        self.trace.clear();
        collect_leaves(&self.nodes, root, &test, &mut self.trace);
        self.last_trace()
    }
}

fn collect_leaves<F>(nodes: &[OctreeNode], id: NodeId, test: &F, out: &mut Vec<NodeId>)
where
    F: Fn(&AABB) -> bool,
{
    let node = &nodes[id.index()];
    if !test(&node.bounds) {
        return;
    }
    match &node.kind {
        NodeKind::Leaf { .. } => out.push(id),
        NodeKind::Split { children } => {
            for &child in children {
                collect_leaves(nodes, child, test, out);
            }
        }
    }
}
