//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, the culling properties of
//! each block type, and the registry that maps stored ids to those properties.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;
pub mod properties;
pub mod registry;

/// The underlying integer type used to represent block types in memory.
/// This is used for efficient storage and serialization of block data.
pub type BlockTypeSize = u8;

/// Represents a single voxel block in the world.
///
/// This is a lightweight structure that stores only the essential block data.
/// The actual block properties are looked up from the block registry.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute ensures a consistent memory layout, so chunk storage can
/// be viewed as raw bytes. The block type is stored as a compact `BlockTypeSize`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq, Eq, Default)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// An air block.
    pub const AIR: Block = Block { block_type: 0 };

    /// Creates a block from a raw stored id, which may be a custom registry entry.
    pub fn from_id(block_type: BlockTypeSize) -> Self {
        Block { block_type }
    }

    /// True if this block is air.
    #[inline]
    pub fn is_air(&self) -> bool {
        self.block_type == BlockType::AIR as BlockTypeSize
    }
}
