//! Octree over loaded chunk positions.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::chunk::CHUNK_DIMENSION;

use super::{
    aabb::Aabb,
    octree::{Octree, OctreeConfig},
};

/// Indexes chunks by their world-space bounds.
///
/// Chunks are identified by their chunk coordinates, the same key the world map uses.
pub struct ChunkOctree {
    octree: Octree<Point3<i32>>,
}

impl ChunkOctree {
    /// Creates an index whose root covers `bounds` in world space.
    pub fn new(bounds: Aabb, config: OctreeConfig) -> Self {
        ChunkOctree {
            octree: Octree::new(bounds, config),
        }
    }

    /// Creates an index covering chunk coordinates `-radius..radius` horizontally
    /// and `min_y..min_y + height` vertically.
    pub fn for_extent(radius: i32, min_y: i32, height: i32, config: OctreeConfig) -> Self {
        let size = CHUNK_DIMENSION as f32;
        let min = Point3::new(-radius as f32 * size, min_y as f32 * size, -radius as f32 * size);
        let max = Point3::new(
            radius as f32 * size,
            (min_y + height) as f32 * size,
            radius as f32 * size,
        );
        Self::new(Aabb::new(min, max), config)
    }

    /// World-space bounds of a chunk.
    pub fn chunk_bounds(position: Point3<i32>) -> Aabb {
        let size = CHUNK_DIMENSION as f32;
        Aabb::from_min_size(
            Point3::new(
                position.x as f32 * size,
                position.y as f32 * size,
                position.z as f32 * size,
            ),
            Vector3::new(size, size, size),
        )
    }

    /// Indexes a chunk. Returns `false` if the chunk lies outside the root bounds.
    pub fn add_chunk(&mut self, position: Point3<i32>) -> bool {
        self.octree.insert(Self::chunk_bounds(position), position)
    }

    /// Removes a chunk. Returns `false` if it was not indexed.
    pub fn remove_chunk(&mut self, position: Point3<i32>) -> bool {
        self.octree.remove(&Self::chunk_bounds(position), &position)
    }

    /// Chunks whose bounds touch `region`.
    pub fn chunks_in_region(&self, region: &Aabb) -> Vec<Point3<i32>> {
        self.octree.query_region(region).into_iter().copied().collect()
    }

    /// Chunks the ray passes through within `max_distance`, nearest first.
    pub fn chunks_along_ray(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Vec<Point3<i32>> {
        self.octree
            .query_ray_with_distance(origin, direction, max_distance)
            .into_iter()
            .map(|(_, position)| *position)
            .collect()
    }

    /// Root bounds.
    pub fn bounds(&self) -> &Aabb {
        self.octree.bounds()
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.octree.len()
    }

    /// True if no chunk is indexed.
    pub fn is_empty(&self) -> bool {
        self.octree.is_empty()
    }

    /// Forgets every chunk.
    pub fn clear(&mut self) {
        self.octree.clear()
    }
}
