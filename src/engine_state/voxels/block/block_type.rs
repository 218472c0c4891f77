//! # Block Type Module
//!
//! This module defines the built-in block kinds and the conversion between the
//! compact stored id (`BlockTypeSize`) and the rich enum.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use phf::phf_map;

use super::BlockTypeSize;

/// Enumerates the built-in block types.
///
/// The discriminant is the stored block id. `AIR` is always 0 and means "no block".
/// Custom registries may define ids beyond these; the enum only names the defaults.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// An air block, which is empty and transparent.
    AIR = 0,

    /// A basic dirt block.
    DIRT = 1,

    /// A grass block with different textures on top, bottom and sides.
    GRASS = 2,

    /// A log block with ring textures on the top and bottom.
    WOOD = 3,

    /// Plain stone.
    STONE = 4,

    /// Sand.
    SAND = 5,

    /// Leaves, transparent but not liquid.
    LEAVES = 6,

    /// Glass, transparent; adjacent panes hide their shared face.
    GLASS = 7,

    /// Water, a transparent liquid.
    WATER = 8,

    /// Stairs, a partial shape that never fully hides its neighbors.
    OAK_STAIRS = 9,
}

/// Number of built-in block types.
pub const BLOCK_TYPE_COUNT: usize = 10;

/// Lookup from registry/config names to the built-in block types.
static BLOCK_TYPE_NAMES: phf::Map<&'static str, BlockType> = phf_map! {
    "air" => BlockType::AIR,
    "dirt" => BlockType::DIRT,
    "grass" => BlockType::GRASS,
    "wood" => BlockType::WOOD,
    "stone" => BlockType::STONE,
    "sand" => BlockType::SAND,
    "leaves" => BlockType::LEAVES,
    "glass" => BlockType::GLASS,
    "water" => BlockType::WATER,
    "oak_stairs" => BlockType::OAK_STAIRS,
};

impl BlockType {
    /// Converts a stored block id to a built-in `BlockType`.
    ///
    /// Returns `None` for ids that have no built-in name.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }

    /// The stored id of this block type.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Looks up a built-in block type by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPE_NAMES.get(name).copied()
    }

    /// Draws a random solid, opaque block type (dirt, grass, wood or stone).
    ///
    /// This is used for testing and procedural generation.
    pub fn random_with(rng: &mut fastrand::Rng) -> Self {
        Self::from_id(rng.u8(1..5)).unwrap_or(BlockType::DIRT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn air_is_zero() {
        assert_eq!(BlockType::AIR.id(), 0);
        assert_eq!(BlockType::from_id(0), Some(BlockType::AIR));
    }

    #[test]
    fn ids_round_trip() {
        for id in 0..BLOCK_TYPE_COUNT as BlockTypeSize {
            let block_type = BlockType::from_id(id).unwrap();
            assert_eq!(block_type.id(), id);
        }
        assert_eq!(BlockType::from_id(BLOCK_TYPE_COUNT as BlockTypeSize), None);
    }

    #[test]
    fn names_resolve() {
        assert_eq!(BlockType::from_name("water"), Some(BlockType::WATER));
        assert_eq!(BlockType::from_name("oak_stairs"), Some(BlockType::OAK_STAIRS));
        assert_eq!(BlockType::from_name("bedrock"), None);
    }

    #[test]
    fn random_types_are_never_air() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..100 {
            assert_ne!(BlockType::random_with(&mut rng), BlockType::AIR);
        }
    }
}
