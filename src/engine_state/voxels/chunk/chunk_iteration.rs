//! # Chunk Iteration Module
//!
//! This module provides an iterator for traversing all non-air blocks in a chunk
//! together with their chunk-local positions.

use cgmath::Point3;

use crate::engine_state::voxels::block::Block;

use super::{index_to_local, Chunk};

/// An iterator over all non-air blocks in a chunk.
///
/// Blocks are visited in storage order. Air blocks are skipped.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next storage index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` for the given chunk.
    ///
    /// # Arguments
    /// * `chunk_ref` - A reference to the chunk to iterate over
    ///
    /// # Returns
    /// A new `ChunkBlockIterator` positioned before the first non-air block
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }
}

impl<'a> Iterator for ChunkBlockIterator<'a> {
    type Item = (Point3<usize>, &'a Block);

    /// Gets the next non-air block in the chunk along with its position.
    ///
    /// # Returns
    /// - `Some((position, block))` if another non-air block is found
    /// - `None` if there are no more blocks to iterate over
    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < blocks.len() {
            let index = self.current_offset;
            self.current_offset += 1;
            let block = &blocks[index];
            if !block.is_air() {
                return Some((index_to_local(index), block));
            }
        }
        None
    }
}
