//! Per-block-type occupancy masks for a chunk.
//!
//! The greedy mesher never looks at individual blocks. It works on one 4096-bit mask
//! per block type, indexed exactly like chunk storage, and slices those masks a
//! machine word at a time.

use std::collections::HashMap;

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType, BlockTypeSize},
    chunk::{
        block_index, empty_chunk_bits, in_bounds, index_to_local, Chunk, ChunkBits,
        CHUNK_DIMENSION, CHUNK_WORDS,
    },
    visibility::ExtendedChunkData,
};

/// One occupancy mask per distinct non-air block type in a chunk.
#[derive(Clone, Debug)]
pub struct BinaryChunkData {
    /// The chunk coordinates this data was built from.
    pub position: Point3<i32>,
    masks: HashMap<BlockTypeSize, ChunkBits>,
    active_types: Vec<BlockTypeSize>,
}

impl BinaryChunkData {
    /// Creates data with no blocks.
    pub fn new(position: Point3<i32>) -> Self {
        BinaryChunkData {
            position,
            masks: HashMap::new(),
            active_types: Vec::new(),
        }
    }

    /// Builds the masks from a chunk's blocks.
    pub fn from_chunk(chunk: &Chunk) -> Self {
        let mut data = Self::new(chunk.position);
        for (position, block) in chunk.iter_blocks() {
            data.insert(block_index(position.x, position.y, position.z), block.block_type);
        }
        data.sort_active_types();
        data
    }

    /// Builds the masks from the interior of bordered chunk data.
    pub fn from_extended(extended: &ExtendedChunkData) -> Self {
        let mut data = Self::new(extended.position);
        let air = BlockType::AIR.id();
        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    let block_type = extended.get(x, y, z);
                    if block_type != air {
                        data.insert(block_index(x as usize, y as usize, z as usize), block_type);
                    }
                }
            }
        }
        data.sort_active_types();
        data
    }

    fn insert(&mut self, index: usize, block_type: BlockTypeSize) {
        let active_types = &mut self.active_types;
        self.masks
            .entry(block_type)
            .or_insert_with(|| {
                active_types.push(block_type);
                empty_chunk_bits()
            })
            .set(index, true);
    }

    fn sort_active_types(&mut self) {
        self.active_types.sort_unstable();
    }

    /// The distinct non-air block types present, in ascending id order.
    pub fn active_types(&self) -> &[BlockTypeSize] {
        &self.active_types
    }

    /// The occupancy mask of one block type, if any block of that type is present.
    pub fn mask(&self, block_type: BlockTypeSize) -> Option<&ChunkBits> {
        self.masks.get(&block_type)
    }

    /// True if the chunk has no non-air blocks.
    pub fn is_empty(&self) -> bool {
        self.active_types.is_empty()
    }

    /// True if the block at chunk-local `(x, y, z)` is exactly `block_type`.
    ///
    /// Out-of-bounds positions hold nothing. Air is never stored, so asking for air
    /// answers whether no other type claims the position.
    pub fn has_block_at(&self, x: i32, y: i32, z: i32, block_type: BlockTypeSize) -> bool {
        if block_type == BlockType::AIR.id() {
            return self.block_at(x, y, z) == block_type;
        }
        if !in_bounds(x, y, z) {
            return false;
        }
        let index = block_index(x as usize, y as usize, z as usize);
        self.masks
            .get(&block_type)
            .map(|mask| mask[index])
            .unwrap_or(false)
    }

    /// The block type at chunk-local `(x, y, z)`, air if unoccupied or out of bounds.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        if !in_bounds(x, y, z) {
            return BlockType::AIR.id();
        }
        let index = block_index(x as usize, y as usize, z as usize);
        self.active_types
            .iter()
            .copied()
            .find(|block_type| self.masks.get(block_type).is_some_and(|mask| mask[index]))
            .unwrap_or(BlockType::AIR.id())
    }

    /// Union of every type's mask.
    pub fn occupancy(&self) -> ChunkBits {
        let mut words = [0u64; CHUNK_WORDS];
        for mask in self.masks.values() {
            for (word, bits) in words.iter_mut().zip(mask.as_raw_slice()) {
                *word |= bits;
            }
        }
        ChunkBits::new(words)
    }

    /// Positions of every block of one type, in storage order.
    pub fn positions_of(&self, block_type: BlockTypeSize) -> Vec<Point3<usize>> {
        self.masks
            .get(&block_type)
            .map(|mask| mask.iter_ones().map(index_to_local).collect())
            .unwrap_or_default()
    }

    /// Rebuilds bordered block data from this chunk and up to six neighbors.
    ///
    /// # Arguments
    /// * `neighbors` - Face neighbors indexed by [`BlockSide`]; `None` leaves that border air
    pub fn to_extended(&self, neighbors: [Option<&BinaryChunkData>; 6]) -> ExtendedChunkData {
        let mut extended = ExtendedChunkData::new(self.position);
        for &block_type in &self.active_types {
            for position in self.positions_of(block_type) {
                extended.set(
                    position.x as i32,
                    position.y as i32,
                    position.z as i32,
                    block_type,
                );
            }
        }
        for side in BlockSide::all() {
            if let Some(neighbor) = neighbors[side as usize] {
                extended.fill_border(side, |source| neighbor.block_at(source.x, source.y, source.z));
            }
        }
        extended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chunk() -> Chunk {
        let mut rng = fastrand::Rng::with_seed(3);
        Chunk::from_fn(&Point3::new(0, 0, 0), |_, _, _| {
            if rng.bool() {
                rng.u8(1..10)
            } else {
                BlockType::AIR.id()
            }
        })
    }

    #[test]
    fn agrees_with_chunk_everywhere() {
        let chunk = sample_chunk();
        let data = BinaryChunkData::from_chunk(&chunk);
        for y in 0..16 {
            for z in 0..16 {
                for x in 0..16 {
                    let stored = chunk.get_block(x, y, z);
                    assert_eq!(data.block_at(x, y, z), stored);
                    for block_type in 0..10 {
                        assert_eq!(
                            data.has_block_at(x, y, z, block_type),
                            stored == block_type,
                            "({x}, {y}, {z}) type {block_type}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn active_types_are_sorted_and_exclude_air() {
        let mut chunk = Chunk::empty(&Point3::new(0, 0, 0));
        chunk.set_block_type(0, 0, 0, BlockType::WATER);
        chunk.set_block_type(1, 0, 0, BlockType::DIRT);
        chunk.set_block_type(2, 0, 0, BlockType::WATER);
        let data = BinaryChunkData::from_chunk(&chunk);
        assert_eq!(data.active_types(), &[BlockType::DIRT.id(), BlockType::WATER.id()]);
        assert_eq!(data.mask(BlockType::WATER.id()).map(|m| m.count_ones()), Some(2));
        assert!(data.mask(BlockType::AIR.id()).is_none());
        assert_eq!(data.occupancy().count_ones(), 3);
    }

    #[test]
    fn extended_and_chunk_paths_match() {
        let chunk = sample_chunk();
        let extended = ExtendedChunkData::from_chunks(&chunk, [None; 6]);
        let a = BinaryChunkData::from_chunk(&chunk);
        let b = BinaryChunkData::from_extended(&extended);
        assert_eq!(a.active_types(), b.active_types());
        for &block_type in a.active_types() {
            assert_eq!(a.mask(block_type), b.mask(block_type));
        }
    }

    #[test]
    fn to_extended_samples_neighbor_borders() {
        let center = BinaryChunkData::new(Point3::new(0, 0, 0));
        let above = BinaryChunkData::from_chunk(&Chunk::filled(&Point3::new(0, 1, 0), BlockType::SAND.id()));
        let mut neighbors: [Option<&BinaryChunkData>; 6] = [None; 6];
        neighbors[BlockSide::UP as usize] = Some(&above);
        let extended = center.to_extended(neighbors);
        assert_eq!(extended.get(4, 16, 4), BlockType::SAND.id());
        assert_eq!(extended.get(4, -1, 4), BlockType::AIR.id());
    }
}
