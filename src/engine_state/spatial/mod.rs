//! # Spatial Indexing
//!
//! Bounding boxes and octrees used to find loaded chunks by region or along a ray.

pub mod aabb;
pub mod chunk_octree;
pub mod octree;

pub use aabb::Aabb;
pub use chunk_octree::ChunkOctree;
pub use octree::{Octree, OctreeConfig};
