//! # World Module
//!
//! This module provides the `World` struct which manages a collection of chunks in the voxel world.
//! It serves as the central coordinator for chunk loading, unloading, and access.
//!
//! ## Architecture
//!
//! The world uses sparse storage: only generated chunks are kept, in a hash map keyed by
//! chunk coordinates. A [`ChunkOctree`] indexes the same chunks by their world-space bounds
//! and is updated on every add and remove, so region and ray queries never see a chunk the
//! map does not hold.
//!
//! ## Chunk Generation
//!
//! Multiple terrain generation strategies are supported:
//! - Perlin noise for natural-looking terrain
//! - Checkerboard pattern for testing
//! - Solid chunks (all blocks filled)
//! - Random sparse blocks
//! - Empty chunks (all blocks air)
//!
//! ## Coordinates
//!
//! World block coordinates split into chunk coordinates and chunk-local coordinates
//! with euclidean division, so block -1 lives in chunk -1 at local 15.

use std::collections::{HashMap, HashSet};

use cgmath::{InnerSpace, Point3, Vector3};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::{config::EngineConfig, MtResource};
use crate::engine_state::spatial::ChunkOctree;
use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType, BlockTypeSize},
    chunk::{Chunk, CHUNK_DIMENSION},
    visibility::ExtendedChunkData,
};

/// The method used to generate new chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkGenerationMethod {
    /// Perlin noise terrain
    Perlin,
    /// Alternating solid and air blocks
    Checkerboard,
    /// Every block dirt
    Solid,
    /// Sparse random blocks
    Random,
    /// Every block air
    Empty,
}

impl ChunkGenerationMethod {
    /// Generates the chunk at `position`.
    pub fn generate(self, position: &Point3<i32>, seed: u32) -> Chunk {
        match self {
            ChunkGenerationMethod::Perlin => Chunk::perlin(position, seed),
            ChunkGenerationMethod::Checkerboard => Chunk::checkerboard(position),
            ChunkGenerationMethod::Solid => Chunk::solid(position),
            ChunkGenerationMethod::Random => Chunk::random(position, seed as u64),
            ChunkGenerationMethod::Empty => Chunk::empty(position),
        }
    }
}

/// The first solid block found by [`World::raycast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// World block coordinates of the hit block
    pub block_position: Point3<i32>,
    /// Chunk coordinates of the chunk holding it
    pub chunk_position: Point3<i32>,
    /// Block id of the hit block
    pub block_type: BlockTypeSize,
    /// Face the ray entered through, `None` if the ray starts inside the block
    pub face: Option<BlockSide>,
    /// Distance along the normalized ray to the entry point
    pub distance: f32,
}

/// Splits world block coordinates into chunk coordinates and chunk-local coordinates.
pub fn chunk_and_local(world: Point3<i32>) -> (Point3<i32>, Point3<i32>) {
    (
        Point3::new(
            world.x.div_euclid(CHUNK_DIMENSION),
            world.y.div_euclid(CHUNK_DIMENSION),
            world.z.div_euclid(CHUNK_DIMENSION),
        ),
        Point3::new(
            world.x.rem_euclid(CHUNK_DIMENSION),
            world.y.rem_euclid(CHUNK_DIMENSION),
            world.z.rem_euclid(CHUNK_DIMENSION),
        ),
    )
}

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_mesher::engine_state::spatial::{ChunkOctree, OctreeConfig};
/// use voxel_mesher::engine_state::voxels::world::{ChunkGenerationMethod, World};
///
/// let octree = ChunkOctree::for_extent(2, -1, 2, OctreeConfig::default());
/// let mut world = World::new(octree, ChunkGenerationMethod::Solid, 0);
/// world.add_chunk_at(Point3::new(0, 0, 0));
/// assert!(world.get_chunk_at(Point3::new(0, 0, 0)).is_some());
/// ```
pub struct World {
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<Point3<i32>, MtResource<Chunk>>,
    /// Spatial index over the same chunks.
    octree: ChunkOctree,
    generation: ChunkGenerationMethod,
    seed: u32,
}

impl World {
    /// Creates a new, empty world.
    ///
    /// # Arguments
    /// * `octree` - Chunk index; its root bounds limit where chunks may be added
    /// * `generation` - How [`World::add_chunk_at`] fills new chunks
    /// * `seed` - Terrain seed
    pub fn new(octree: ChunkOctree, generation: ChunkGenerationMethod, seed: u32) -> Self {
        World {
            chunks: HashMap::new(),
            octree,
            generation,
            seed,
        }
    }

    /// Creates an empty world sized by the config: `world_radius_chunks` around the
    /// origin horizontally and `world_height_chunks` layers starting at chunk y = -1.
    pub fn from_config(config: &EngineConfig) -> Self {
        let octree = ChunkOctree::for_extent(
            config.world_radius_chunks,
            -1,
            config.world_height_chunks,
            config.octree,
        );
        Self::new(octree, config.chunk_generation, config.seed)
    }

    /// Generates every chunk inside the octree bounds that is not loaded yet.
    ///
    /// # Returns
    /// The positions of the chunks that were added.
    pub fn generate_all(&mut self) -> Vec<Point3<i32>> {
        let bounds = *self.octree.bounds();
        let size = CHUNK_DIMENSION as f32;
        let min = bounds.min / size;
        let max = bounds.max / size;

        let mut added = Vec::new();
        for x in min.x.floor() as i32..max.x.ceil() as i32 {
            for y in min.y.floor() as i32..max.y.ceil() as i32 {
                for z in min.z.floor() as i32..max.z.ceil() as i32 {
                    let position = Point3::new(x, y, z);
                    if self.add_chunk_at(position) {
                        added.push(position);
                    }
                }
            }
        }
        debug!("Generated {} chunks", added.len());
        added
    }

    /// Adds a new chunk at the specified chunk coordinates if one doesn't already exist.
    ///
    /// The chunk is generated using the world's generation method.
    ///
    /// # Returns
    /// `true` if a chunk was generated.
    pub fn add_chunk_at(&mut self, position: Point3<i32>) -> bool {
        if self.chunks.contains_key(&position) {
            return false;
        }
        let chunk = self.generation.generate(&position, self.seed);
        self.insert_chunk(chunk)
    }

    /// Adds a prebuilt chunk, replacing any chunk at the same position.
    ///
    /// # Returns
    /// `false` if the chunk lies outside the octree bounds. The chunk is dropped.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> bool {
        let position = chunk.position;
        if self.chunks.contains_key(&position) {
            self.octree.remove_chunk(position);
        }
        if !self.octree.add_chunk(position) {
            warn!("Chunk {:?} is outside the world bounds", position);
            self.chunks.remove(&position);
            return false;
        }
        self.chunks.insert(position, MtResource::new(chunk));
        true
    }

    /// Unloads a chunk.
    ///
    /// # Returns
    /// The removed chunk, if one was loaded.
    pub fn remove_chunk_at(&mut self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        let chunk = self.chunks.remove(&position)?;
        self.octree.remove_chunk(position);
        Some(chunk)
    }

    /// Retrieves the chunk at the specified chunk coordinates.
    ///
    /// The returned chunk is wrapped in a thread-safe reference-counted container,
    /// allowing it to be shared with other threads.
    pub fn get_chunk_at(&self, position: Point3<i32>) -> Option<MtResource<Chunk>> {
        self.chunks.get(&position).cloned()
    }

    /// Positions of all loaded chunks, in no particular order.
    pub fn chunk_positions(&self) -> impl Iterator<Item = Point3<i32>> + '_ {
        self.chunks.keys().copied()
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True if no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The chunk index.
    pub fn octree(&self) -> &ChunkOctree {
        &self.octree
    }

    /// Block id at world block coordinates. Unloaded chunks read as air.
    pub fn get_block(&self, position: Point3<i32>) -> BlockTypeSize {
        let (chunk_position, local) = chunk_and_local(position);
        match self.chunks.get(&chunk_position) {
            Some(chunk) => chunk.read().get_block(local.x, local.y, local.z),
            None => BlockType::AIR.id(),
        }
    }

    /// Sets the block at world block coordinates.
    ///
    /// # Returns
    /// Chunks whose meshes must be rebuilt: the edited chunk, plus every loaded face
    /// neighbor when the block sits on the shared border. Empty if the chunk is not
    /// loaded, in which case nothing changes.
    pub fn set_block(&mut self, position: Point3<i32>, block_type: BlockTypeSize) -> Vec<Point3<i32>> {
        let (chunk_position, local) = chunk_and_local(position);
        let Some(chunk) = self.chunks.get(&chunk_position) else {
            debug!("Ignoring block edit in unloaded chunk {:?}", chunk_position);
            return Vec::new();
        };
        chunk.write().set_block(local.x, local.y, local.z, block_type);

        let mut dirty = vec![chunk_position];
        for side in BlockSide::all() {
            let normal = side.normal();
            let on_border = (0..3).any(|axis| {
                (normal[axis] < 0 && local[axis] == 0)
                    || (normal[axis] > 0 && local[axis] == CHUNK_DIMENSION - 1)
            });
            let neighbor = chunk_position + normal;
            if on_border && self.chunks.contains_key(&neighbor) {
                dirty.push(neighbor);
            }
        }
        dirty
    }

    /// Samples a loaded chunk and the borders of its loaded face neighbors.
    ///
    /// Missing neighbors leave their border as air.
    pub fn extended_data(&self, position: Point3<i32>) -> Option<ExtendedChunkData> {
        let chunk = self.chunks.get(&position)?;
        let guards = BlockSide::all().map(|side| {
            self.chunks
                .get(&(position + side.normal()))
                .map(|neighbor| neighbor.read())
        });
        let neighbors = std::array::from_fn(|index| guards[index].as_deref());
        let center = chunk.read();
        Some(ExtendedChunkData::from_chunks(&center, neighbors))
    }

    /// Finds the first non-air block along a ray.
    ///
    /// Only chunks the octree reports along the ray are inspected. Blocks are walked one
    /// voxel at a time in ray order, and the walk ends where the ray leaves the world
    /// bounds, so an unbounded `max_distance` is fine.
    ///
    /// # Arguments
    /// * `origin` - Ray start in world space
    /// * `direction` - Ray direction, need not be normalized
    /// * `max_distance` - Maximum distance along the ray
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        if direction.magnitude2() == 0.0 {
            return None;
        }
        let direction = direction.normalize();
        let candidates: HashSet<Point3<i32>> = self
            .octree
            .chunks_along_ray(origin, direction, max_distance)
            .into_iter()
            .collect();
        if candidates.is_empty() {
            return None;
        }

        // The walk covers the root bounds only; a ray starting outside jumps to its
        // entry point first.
        let root = *self.octree.bounds();
        let (t_enter, t_exit) = root.ray_span(origin, direction, max_distance)?;
        let lo = root.min.map(|v| v.floor() as i32);
        let hi = root.max.map(|v| v.ceil() as i32);
        let start = origin + direction * t_enter;

        let mut voxel = Point3::new(0, 0, 0);
        let mut step = [0i32; 3];
        let mut t_max = [f32::INFINITY; 3];
        let mut t_delta = [f32::INFINITY; 3];
        let mut entry_axis = None;
        let mut entry_t = f32::NEG_INFINITY;
        for axis in 0..3 {
            voxel[axis] = (start[axis].floor() as i32).clamp(lo[axis], hi[axis] - 1);
            let d = direction[axis];
            if d > 0.0 {
                step[axis] = 1;
                t_max[axis] = t_enter + ((voxel[axis] + 1) as f32 - start[axis]) / d;
                t_delta[axis] = 1.0 / d;
            } else if d < 0.0 {
                step[axis] = -1;
                t_max[axis] = t_enter + (voxel[axis] as f32 - start[axis]) / d;
                t_delta[axis] = -1.0 / d;
            }
            if d != 0.0 {
                let boundary = if d > 0.0 { root.min[axis] } else { root.max[axis] };
                let t = (boundary - origin[axis]) / d;
                if t > entry_t {
                    entry_t = t;
                    entry_axis = Some(axis);
                }
            }
        }

        let inside = |voxel: &Point3<i32>| {
            (0..3).all(|axis| voxel[axis] >= lo[axis] && voxel[axis] < hi[axis])
        };
        let mut distance = t_enter;
        let mut face = match entry_axis {
            Some(axis) if t_enter > 0.0 => Some(entry_face(axis, step[axis])),
            _ => None,
        };
        while distance <= t_exit && inside(&voxel) {
            let (chunk_position, _) = chunk_and_local(voxel);
            if candidates.contains(&chunk_position) {
                let block_type = self.get_block(voxel);
                if block_type != BlockType::AIR.id() {
                    return Some(RaycastHit {
                        block_position: voxel,
                        chunk_position,
                        block_type,
                        face,
                        distance,
                    });
                }
            }

            let axis = if t_max[0] <= t_max[1] && t_max[0] <= t_max[2] {
                0
            } else if t_max[1] <= t_max[2] {
                1
            } else {
                2
            };
            distance = t_max[axis];
            voxel[axis] += step[axis];
            t_max[axis] += t_delta[axis];
            face = Some(entry_face(axis, step[axis]));
        }
        None
    }
}

/// The face of the next voxel crossed when stepping along `axis` in direction `step`.
fn entry_face(axis: usize, step: i32) -> BlockSide {
    match (axis, step > 0) {
        (0, true) => BlockSide::WEST,
        (0, false) => BlockSide::EAST,
        (1, true) => BlockSide::DOWN,
        (1, false) => BlockSide::UP,
        (_, true) => BlockSide::NORTH,
        (_, false) => BlockSide::SOUTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::spatial::OctreeConfig;

    fn empty_world() -> World {
        let octree = ChunkOctree::for_extent(2, -1, 2, OctreeConfig::default());
        let mut world = World::new(octree, ChunkGenerationMethod::Empty, 0);
        world.generate_all();
        world
    }

    #[test]
    fn generation_method_names_are_lowercase() {
        let method: ChunkGenerationMethod = serde_json::from_str("\"random\"").unwrap();
        assert_eq!(method, ChunkGenerationMethod::Random);
        assert_eq!(
            serde_json::to_string(&ChunkGenerationMethod::Perlin).unwrap(),
            "\"perlin\""
        );
    }

    #[test]
    fn chunks_stay_in_sync_with_the_octree() {
        let mut world = empty_world();
        assert_eq!(world.len(), 4 * 2 * 4);
        assert_eq!(world.octree().len(), world.len());

        assert!(!world.add_chunk_at(Point3::new(0, 0, 0)));
        assert!(!world.add_chunk_at(Point3::new(5, 0, 0)));
        assert!(world.get_chunk_at(Point3::new(5, 0, 0)).is_none());

        assert!(world.remove_chunk_at(Point3::new(0, 0, 0)).is_some());
        assert!(world.remove_chunk_at(Point3::new(0, 0, 0)).is_none());
        assert_eq!(world.octree().len(), world.len());
        assert!(world.add_chunk_at(Point3::new(0, 0, 0)));
        assert_eq!(world.octree().len(), world.len());
    }

    #[test]
    fn world_coordinates_split_euclidean() {
        assert_eq!(
            chunk_and_local(Point3::new(-1, 0, 17)),
            (Point3::new(-1, 0, 1), Point3::new(15, 0, 1))
        );
        assert_eq!(
            chunk_and_local(Point3::new(-16, 15, 16)),
            (Point3::new(-1, 0, 1), Point3::new(0, 15, 0))
        );
    }

    #[test]
    fn block_edits_report_dirty_chunks() {
        let mut world = empty_world();
        let stone = BlockType::STONE.id();

        assert_eq!(world.set_block(Point3::new(5, 5, 5), stone), vec![Point3::new(0, 0, 0)]);
        assert_eq!(world.get_block(Point3::new(5, 5, 5)), stone);

        let dirty = world.set_block(Point3::new(0, 5, 5), stone);
        assert_eq!(dirty, vec![Point3::new(0, 0, 0), Point3::new(-1, 0, 0)]);

        // Corner block touching three neighbors, one of them above the loaded layers.
        let mut dirty = world.set_block(Point3::new(15, 15, 15), stone);
        dirty.sort_by_key(|p| (p.x, p.y, p.z));
        assert_eq!(dirty, vec![Point3::new(0, 0, 0), Point3::new(0, 0, 1), Point3::new(1, 0, 0)]);
    }

    #[test]
    fn edits_in_unloaded_chunks_are_ignored() {
        let mut world = empty_world();
        assert!(world.set_block(Point3::new(100, 0, 0), BlockType::STONE.id()).is_empty());
        assert_eq!(world.get_block(Point3::new(100, 0, 0)), BlockType::AIR.id());
    }

    #[test]
    fn extended_data_samples_neighbor_borders() {
        let octree = ChunkOctree::for_extent(2, -1, 2, OctreeConfig::default());
        let mut world = World::new(octree, ChunkGenerationMethod::Empty, 0);
        world.add_chunk_at(Point3::new(0, 0, 0));
        assert!(world.insert_chunk(Chunk::solid(&Point3::new(1, 0, 0))));

        let extended = world.extended_data(Point3::new(0, 0, 0)).unwrap();
        assert_eq!(extended.get(16, 3, 4), BlockType::DIRT.id());
        assert_eq!(extended.get(-1, 3, 4), BlockType::AIR.id());
        assert_eq!(extended.get(3, 3, 4), BlockType::AIR.id());
        assert!(world.extended_data(Point3::new(-2, 0, 0)).is_none());
    }

    #[test]
    fn raycast_finds_first_block_across_chunks() {
        let mut world = empty_world();
        world.set_block(Point3::new(20, 3, 8), BlockType::SAND.id());
        world.set_block(Point3::new(25, 3, 8), BlockType::STONE.id());

        let hit = world
            .raycast(Point3::new(0.5, 3.5, 8.5), Vector3::new(2.0, 0.0, 0.0), 64.0)
            .unwrap();
        assert_eq!(hit.block_position, Point3::new(20, 3, 8));
        assert_eq!(hit.chunk_position, Point3::new(1, 0, 0));
        assert_eq!(hit.block_type, BlockType::SAND.id());
        assert_eq!(hit.face, Some(BlockSide::WEST));
        assert!((hit.distance - 19.5).abs() < 1e-4);

        let down = world
            .raycast(Point3::new(20.5, 10.5, 8.5), Vector3::new(0.0, -1.0, 0.0), 64.0)
            .unwrap();
        assert_eq!(down.face, Some(BlockSide::UP));
        assert!((down.distance - 6.5).abs() < 1e-4);
    }

    #[test]
    fn raycast_respects_max_distance_and_empty_space() {
        let mut world = empty_world();
        world.set_block(Point3::new(20, 3, 8), BlockType::SAND.id());
        let origin = Point3::new(0.5, 3.5, 8.5);
        assert!(world.raycast(origin, Vector3::new(1.0, 0.0, 0.0), 10.0).is_none());
        assert!(world.raycast(origin, Vector3::new(-1.0, 0.0, 0.0), 64.0).is_none());
        assert!(world.raycast(origin, Vector3::new(0.0, 0.0, 0.0), 64.0).is_none());
    }

    #[test]
    fn raycast_from_inside_a_block_has_no_face() {
        let mut world = empty_world();
        world.set_block(Point3::new(1, 1, 1), BlockType::STONE.id());
        let hit = world
            .raycast(Point3::new(1.5, 1.5, 1.5), Vector3::new(0.0, 1.0, 0.0), 5.0)
            .unwrap();
        assert_eq!(hit.face, None);
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn raycast_with_unbounded_reach_terminates() {
        let mut world = empty_world();
        let origin = Point3::new(0.5, 3.5, 8.5);
        assert!(world.raycast(origin, Vector3::new(1.0, 0.0, 0.0), f32::INFINITY).is_none());
        assert!(world.raycast(origin, Vector3::new(1.0, 0.3, -0.2), 1.0e8).is_none());

        world.set_block(Point3::new(20, 3, 8), BlockType::SAND.id());
        let hit = world
            .raycast(origin, Vector3::new(1.0, 0.0, 0.0), f32::INFINITY)
            .unwrap();
        assert_eq!(hit.block_position, Point3::new(20, 3, 8));
        assert!((hit.distance - 19.5).abs() < 1e-4);
    }

    #[test]
    fn raycast_from_outside_the_world_enters_it() {
        let mut world = empty_world();
        world.set_block(Point3::new(20, 3, 8), BlockType::SAND.id());

        let hit = world
            .raycast(Point3::new(-1000.5, 3.5, 8.5), Vector3::new(1.0, 0.0, 0.0), f32::INFINITY)
            .unwrap();
        assert_eq!(hit.block_position, Point3::new(20, 3, 8));
        assert_eq!(hit.face, Some(BlockSide::WEST));
        assert!((hit.distance - 1020.5).abs() < 1e-3);

        let far = world
            .raycast(Point3::new(-1.0e8, 3.5, 8.5), Vector3::new(1.0, 0.0, 0.0), f32::INFINITY)
            .unwrap();
        assert_eq!(far.block_position, Point3::new(20, 3, 8));

        // Entering through the top face of the world.
        world.set_block(Point3::new(2, -16, 2), BlockType::STONE.id());
        let down = world
            .raycast(Point3::new(2.5, 500.0, 2.5), Vector3::new(0.0, -1.0, 0.0), f32::INFINITY)
            .unwrap();
        assert_eq!(down.block_position, Point3::new(2, -16, 2));
        assert_eq!(down.face, Some(BlockSide::UP));
    }
}
