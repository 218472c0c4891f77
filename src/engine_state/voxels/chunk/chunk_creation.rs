//! # Chunk Creation Module
//!
//! This module provides a builder for populating chunks one block at a time in
//! storage order. Generators ask the builder for the next local position, decide the
//! block for it, and push it; the builder owns the index arithmetic.

use cgmath::Point3;

use crate::engine_state::voxels::block::{Block, BlockTypeSize};

use super::{index_to_local, Chunk, CHUNK_SIZE};

/// A builder for creating chunks in storage order.
///
/// Blocks are pushed in the order of [`super::block_index`]. Positions that were
/// never pushed are air when the chunk is returned.
pub struct ChunkCreationIterator {
    /// The chunk coordinates of the chunk being created
    position: Point3<i32>,
    /// Blocks pushed so far
    blocks: Vec<Block>,
}

impl ChunkCreationIterator {
    /// Creates a new `ChunkCreationIterator` for building a chunk at the given position.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the chunk to create
    ///
    /// # Returns
    /// A new `ChunkCreationIterator` ready to build a chunk
    pub fn new(position: Point3<i32>) -> Self {
        ChunkCreationIterator {
            position,
            blocks: Vec::with_capacity(CHUNK_SIZE as usize),
        }
    }

    /// Local coordinates of the block the next push will fill, or `None` once the
    /// chunk is full.
    pub fn next_position(&self) -> Option<Point3<i32>> {
        if self.blocks.len() >= CHUNK_SIZE as usize {
            return None;
        }
        let local = index_to_local(self.blocks.len());
        Some(Point3::new(local.x as i32, local.y as i32, local.z as i32))
    }

    /// Adds a block at the current position and advances the position.
    ///
    /// Pushes past the end of the chunk are ignored.
    ///
    /// # Arguments
    /// * `block_type` - The id of the block to add
    pub fn push_block_type(&mut self, block_type: BlockTypeSize) {
        if self.blocks.len() < CHUNK_SIZE as usize {
            self.blocks.push(Block::from_id(block_type));
        }
    }

    /// Finalizes the chunk creation and returns the constructed `Chunk`.
    ///
    /// # Returns
    /// The fully constructed `Chunk`, padded with air if fewer than `CHUNK_SIZE`
    /// blocks were pushed.
    pub fn return_chunk(mut self) -> Chunk {
        self.blocks.resize(CHUNK_SIZE as usize, Block::AIR);
        Chunk {
            position: self.position,
            blocks: self.blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_build_is_padded_with_air() {
        let mut cci = ChunkCreationIterator::new(Point3::new(0, 0, 0));
        assert_eq!(cci.next_position(), Some(Point3::new(0, 0, 0)));
        cci.push_block_type(4);
        assert_eq!(cci.next_position(), Some(Point3::new(1, 0, 0)));
        let chunk = cci.return_chunk();
        assert_eq!(chunk.blocks().len(), CHUNK_SIZE as usize);
        assert_eq!(chunk.get_block(0, 0, 0), 4);
        assert_eq!(chunk.solid_count(), 1);
    }
}
