//! Spatial partitioning data structures
//!
//! Provides spatial indexing over static triangle meshes for
//! ray casting and sphere proximity queries in 3D space.

mod octree;
mod ray;
pub mod spatial_query;

pub use octree::{NodeId, NodeKind, Octree, OctreeError, OctreeNode, Trace, MAX_DEPTH};
pub use ray::Ray;
pub use spatial_query::SpatialQuery;
