//! # Block Properties Module
//!
//! Per-block-type data consulted by face culling. Every visibility decision in the
//! crate reads these records through the [`super::registry::BlockRegistry`], never
//! through block-specific code.

use serde::{Deserialize, Serialize};

use super::block_side::BlockSide;

/// How much of a face a block covers on one of its six sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FaceCull {
    /// The side is open; it hides nothing behind it.
    #[default]
    None,
    /// The side is a complete square; it hides the neighbor's touching face.
    Full,
    /// The side is partially covered (slabs, stairs); treated as not hiding anything.
    Partial,
}

/// The geometry a block is drawn with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockShape {
    /// A unit cube, meshed by the greedy mesher.
    #[default]
    Cube,
    /// A non-cube model drawn by a separate per-block path. The greedy mesher skips it.
    Model,
}

/// Face culling behavior of one block type.
///
/// Faces are indexed by [`BlockSide`] (down, up, north, south, west, east).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockCullingProperties {
    /// Cull category of each side.
    pub faces: [FaceCull; 6],
    /// Light passes through the block; neighbors stay visible behind it.
    pub is_transparent: bool,
    /// The block's own faces may be hidden by full neighbor faces.
    pub can_be_culled: bool,
    /// Liquid blocks only hide their faces against full opaque neighbor faces.
    pub is_liquid: bool,
    /// Faces that touch this block are always drawn, whatever else applies.
    /// Used for partial shapes whose geometry the mesher does not model.
    pub exposes_neighbors: bool,
}

impl BlockCullingProperties {
    /// Properties of air: transparent and hiding nothing.
    pub const AIR: Self = BlockCullingProperties {
        faces: [FaceCull::None; 6],
        is_transparent: true,
        can_be_culled: false,
        is_liquid: false,
        exposes_neighbors: false,
    };

    /// A solid, opaque unit cube.
    pub const OPAQUE_CUBE: Self = BlockCullingProperties {
        faces: [FaceCull::Full; 6],
        is_transparent: false,
        can_be_culled: true,
        is_liquid: false,
        exposes_neighbors: false,
    };

    /// A see-through cube such as glass or leaves.
    pub const TRANSPARENT_CUBE: Self = BlockCullingProperties {
        faces: [FaceCull::Full; 6],
        is_transparent: true,
        can_be_culled: true,
        is_liquid: false,
        exposes_neighbors: false,
    };

    /// A transparent liquid.
    pub const LIQUID: Self = BlockCullingProperties {
        faces: [FaceCull::None; 6],
        is_transparent: true,
        can_be_culled: true,
        is_liquid: true,
        exposes_neighbors: false,
    };

    /// Stairs: full bottom, partial elsewhere, never culled and never hiding neighbors.
    pub const STAIRS: Self = BlockCullingProperties {
        faces: [
            FaceCull::Full,
            FaceCull::Partial,
            FaceCull::Partial,
            FaceCull::Partial,
            FaceCull::Partial,
            FaceCull::Partial,
        ],
        is_transparent: false,
        can_be_culled: false,
        is_liquid: false,
        exposes_neighbors: true,
    };

    /// Cull category of the given side.
    #[inline]
    pub fn face(&self, side: BlockSide) -> FaceCull {
        self.faces[side as usize]
    }

    /// True when this record describes something that behaves like air.
    pub fn is_air_like(&self) -> bool {
        self.is_transparent
            && self.faces.iter().all(|face| *face == FaceCull::None)
            && !self.is_liquid
            && !self.exposes_neighbors
    }
}

impl Default for BlockCullingProperties {
    fn default() -> Self {
        Self::OPAQUE_CUBE
    }
}
