//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data. It includes chunk generation algorithms, bounds
//! checked block access and the naive per-block face visibility test.
//!
//! ## Storage Layout
//!
//! Blocks are stored densely, one `Block` per position, at index
//! `x + z * CHUNK_DIMENSION + y * CHUNK_PLANE_SIZE`. A horizontal (Y) layer is therefore a
//! contiguous run of 256 entries, and a row along X is a contiguous run of 16. The
//! binary masks in [`ChunkBits`] use the same indexing, which lets the greedy mesher
//! pull a whole X row out of a mask with a single shift.
//!
//! Callers should not rely on the layout; `(x, y, z)` round-trips through
//! [`Chunk::set_block`] and [`Chunk::get_block`] and that is the contract.

use bitvec::prelude::{BitArray, Lsb0};
use cgmath::Point3;
use chunk_creation::ChunkCreationIterator;
use noise::NoiseFn;
use noise::Perlin;

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::block::registry::BlockRegistry;
use super::block::{Block, BlockTypeSize};
use super::visibility::culling;

mod chunk_creation;
pub mod chunk_iteration;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;
/// The dimension of a chunk including an extra layer of blocks on each side for neighbor lookups.
pub const CHUNK_DIMENSION_WRAPPED: usize = (CHUNK_DIMENSION + 2) as usize;
/// The number of blocks in a wrapped 2D chunk plane.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// The total number of blocks in a wrapped chunk.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// Number of 64-bit words in a one-bit-per-block chunk mask.
pub const CHUNK_WORDS: usize = CHUNK_SIZE as usize / 64;

/// A fixed-size bit set with one bit per chunk position, indexed like chunk blocks.
pub type ChunkBits = BitArray<[u64; CHUNK_WORDS], Lsb0>;

/// Returns a mask with every bit cleared.
#[inline]
pub fn empty_chunk_bits() -> ChunkBits {
    BitArray::new([0; CHUNK_WORDS])
}

/// Converts chunk-local coordinates to a block index.
///
/// # Arguments
/// * `x`, `y`, `z` - Coordinates within the chunk, each in `0..CHUNK_DIMENSION`
///
/// # Returns
/// The index into chunk block storage and into every [`ChunkBits`] mask.
#[inline]
pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    x + z * CHUNK_DIMENSION as usize + y * CHUNK_PLANE_SIZE as usize
}

/// Converts a block index back to chunk-local `(x, y, z)` coordinates.
#[inline]
pub fn index_to_local(index: usize) -> Point3<usize> {
    let dimension = CHUNK_DIMENSION as usize;
    Point3::new(
        index % dimension,
        index / CHUNK_PLANE_SIZE as usize,
        (index / dimension) % dimension,
    )
}

/// True if the signed coordinates address a block inside a chunk.
#[inline]
pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
    (0..CHUNK_DIMENSION).contains(&x)
        && (0..CHUNK_DIMENSION).contains(&y)
        && (0..CHUNK_DIMENSION).contains(&z)
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Chunks are the fundamental unit of world data and mesh generation. Each chunk
/// maintains its position in the world and owns all 4096 of its blocks.
///
/// Chunks are deliberately not `Clone`; they are moved or shared through
/// [`crate::core::MtResource`].
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not block coordinates).
    pub position: Point3<i32>,

    /// Dense block storage, `CHUNK_SIZE` entries indexed by [`block_index`].
    blocks: Vec<Block>,
}

/// Threshold above which Perlin noise is considered solid for terrain generation.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered empty for terrain generation.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;
/// Fraction of air blocks in [`Chunk::random`] chunks.
pub const RANDOM_SPARSENESS: f64 = 0.9;

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    ///
    /// # Returns
    /// A new `Chunk` instance filled with air blocks.
    pub fn empty(position: &Point3<i32>) -> Self {
        ChunkCreationIterator::new(*position).return_chunk()
    }

    /// Builds a chunk by asking `block_at` for the block id at every local position.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `block_at` - Called once per position with local `(x, y, z)`
    pub fn from_fn<F>(position: &Point3<i32>, mut block_at: F) -> Self
    where
        F: FnMut(i32, i32, i32) -> BlockTypeSize,
    {
        let mut cci = ChunkCreationIterator::new(*position);
        while let Some(local) = cci.next_position() {
            cci.push_block_type(block_at(local.x, local.y, local.z));
        }
        cci.return_chunk()
    }

    /// Creates a new chunk with random blocks (for testing purposes).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `seed` - Seed mixed with the chunk position so neighboring chunks differ
    ///
    /// # Returns
    /// A new `Chunk` with randomly placed blocks.
    pub fn random(position: &Point3<i32>, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(Self::position_seed(position, seed));
        Self::from_fn(position, |_, _, _| {
            if rng.f64() < RANDOM_SPARSENESS {
                BlockType::AIR.id()
            } else {
                BlockType::random_with(&mut rng).id()
            }
        })
    }

    /// Generates a chunk using Perlin noise for natural-looking terrain.
    ///
    /// The terrain is generated by sampling 3D Perlin noise and applying thresholds
    /// to determine which blocks are solid. The result resembles natural terrain
    /// with caves and overhangs. Solid blocks get a random opaque type drawn from a
    /// generator seeded by the chunk position, so the result is reproducible.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates where the chunk will be placed
    /// * `seed` - Noise seed
    ///
    /// # Returns
    /// A new `Chunk` with terrain generated using Perlin noise.
    pub fn perlin(position: &Point3<i32>, seed: u32) -> Self {
        let perlin = Perlin::new(seed);
        let mut rng = fastrand::Rng::with_seed(Self::position_seed(position, seed as u64));
        let origin = Self::origin_of(position);

        Self::from_fn(position, |i, j, k| {
            let bposition = Point3::<i32>::new(origin.x + i, origin.y + j, origin.z + k);
            let perlin_sample = perlin.get(Self::to_perlin_pos(bposition, PERLIN_SCALE_FACTOR));
            if !(PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&perlin_sample) {
                BlockType::random_with(&mut rng).id()
            } else {
                BlockType::AIR.id()
            }
        })
    }

    /// Converts chunk-relative block coordinates to world-space coordinates for Perlin noise sampling.
    ///
    /// # Arguments
    /// * `pos` - The block position in world block coordinates
    /// * `scale_factor` - Scaling factor to apply to the world coordinates
    ///
    /// # Returns
    /// An array of [x, y, z] coordinates scaled for Perlin noise sampling.
    fn to_perlin_pos(pos: Point3<i32>, scale_factor: f64) -> [f64; 3] {
        [
            (pos.x as f64 * scale_factor),
            (pos.y as f64 * scale_factor),
            (pos.z as f64 * scale_factor),
        ]
    }

    fn position_seed(position: &Point3<i32>, seed: u64) -> u64 {
        let x = position.x as u32 as u64;
        let y = position.y as u32 as u64;
        let z = position.z as u32 as u64;
        seed ^ x.wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ y.wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ z.wrapping_mul(0x1656_67B1_9E37_79F9)
    }

    /// Creates a new chunk filled with solid blocks (for testing).
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    ///
    /// # Returns
    /// A new `Chunk` completely filled with dirt.
    pub fn solid(position: &Point3<i32>) -> Self {
        Self::filled(position, BlockType::DIRT.id())
    }

    /// Creates a chunk where every position holds `block_type`.
    pub fn filled(position: &Point3<i32>, block_type: BlockTypeSize) -> Self {
        Self::from_fn(position, |_, _, _| block_type)
    }

    /// Creates a new chunk with a checkerboard pattern (for testing).
    ///
    /// The pattern alternates between solid and air blocks in a 3D grid, so no two
    /// solid blocks share a face.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    ///
    /// # Returns
    /// A new `Chunk` with a 3D checkerboard pattern.
    pub fn checkerboard(position: &Point3<i32>) -> Self {
        Self::from_fn(position, |x, y, z| {
            if (x + y + z) % 2 == 0 {
                BlockType::DIRT.id()
            } else {
                BlockType::AIR.id()
            }
        })
    }

    /// World block coordinates of the chunk's (0, 0, 0) corner.
    pub fn world_origin(&self) -> Point3<i32> {
        Self::origin_of(&self.position)
    }

    /// World block coordinates of the (0, 0, 0) corner of the chunk at `position`.
    pub fn origin_of(position: &Point3<i32>) -> Point3<i32> {
        Point3::new(
            position.x * CHUNK_DIMENSION,
            position.y * CHUNK_DIMENSION,
            position.z * CHUNK_DIMENSION,
        )
    }

    /// Gets the block id at the specified chunk-relative coordinates.
    ///
    /// # Arguments
    /// * `x` - X coordinate within the chunk (0..CHUNK_DIMENSION)
    /// * `y` - Y coordinate within the chunk (0..CHUNK_DIMENSION)
    /// * `z` - Z coordinate within the chunk (0..CHUNK_DIMENSION)
    ///
    /// # Returns
    /// The block id at the position, or air if the coordinates are out of bounds.
    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        if !in_bounds(x, y, z) {
            return BlockType::AIR.id();
        }
        self.blocks[block_index(x as usize, y as usize, z as usize)].block_type
    }

    /// Sets the block id at the specified chunk-relative coordinates.
    ///
    /// Out-of-bounds writes are ignored.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block_type: BlockTypeSize) {
        if !in_bounds(x, y, z) {
            return;
        }
        self.blocks[block_index(x as usize, y as usize, z as usize)] = Block::from_id(block_type);
    }

    /// Same as [`Chunk::set_block`] for a built-in block type.
    pub fn set_block_type(&mut self, x: i32, y: i32, z: i32, block_type: BlockType) {
        self.set_block(x, y, z, block_type.id());
    }

    /// All blocks in storage order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of non-air blocks.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_air()).count()
    }

    /// True if every block is air.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(Block::is_air)
    }

    /// Iterates over the non-air blocks together with their local positions.
    pub fn iter_blocks(&self) -> chunk_iteration::ChunkBlockIterator<'_> {
        chunk_iteration::ChunkBlockIterator::new(self)
    }

    /// Determines whether the face of the block at (x,y,z) on `side` should be drawn.
    ///
    /// This is the naive per-block test. Only this chunk's data is consulted, so a
    /// neighbor across the chunk border is unknown and border faces are reported
    /// visible.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Coordinates within the chunk
    /// * `side` - The face to test
    /// * `registry` - Block properties used by the culling rules
    ///
    /// # Returns
    /// `true` if the face is visible, `false` if it is culled or the block is air.
    pub fn is_face_visible(
        &self,
        x: i32,
        y: i32,
        z: i32,
        side: BlockSide,
        registry: &BlockRegistry,
    ) -> bool {
        if !in_bounds(x, y, z) {
            return false;
        }
        let normal = side.normal();
        let (nx, ny, nz) = (x + normal.x, y + normal.y, z + normal.z);
        let neighbor = in_bounds(nx, ny, nz).then(|| self.get_block(nx, ny, nz));
        culling::is_face_visible(self.get_block(x, y, z), neighbor, side, registry)
    }
}
