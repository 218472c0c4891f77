//! # Face Visibility Mask
//!
//! Six 4096-bit masks, one per face direction, recording which blocks have a visible
//! face on that side. The mask is a cache of [`super::culling::is_face_visible`]
//! evaluated over [`ExtendedChunkData`]; it is rebuilt whenever the chunk or one of
//! its neighbor borders changes.

use log::error;

use crate::engine_state::voxels::{
    block::{block_side::BlockSide, block_type::BlockType, registry::BlockRegistry},
    chunk::{block_index, empty_chunk_bits, ChunkBits, CHUNK_DIMENSION},
};

use super::extended::ExtendedChunkData;

/// Per-direction visible-face bits for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceVisibilityMask {
    masks: [ChunkBits; 6],
}

impl Default for FaceVisibilityMask {
    fn default() -> Self {
        FaceVisibilityMask {
            masks: std::array::from_fn(|_| empty_chunk_bits()),
        }
    }
}

impl FaceVisibilityMask {
    /// The mask for one face direction.
    #[inline]
    pub fn mask(&self, side: BlockSide) -> &ChunkBits {
        &self.masks[side as usize]
    }

    /// True if the block at chunk-local `(x, y, z)` shows its `side` face.
    #[inline]
    pub fn is_visible(&self, x: usize, y: usize, z: usize, side: BlockSide) -> bool {
        self.masks[side as usize][block_index(x, y, z)]
    }

    /// Total number of visible faces over all directions.
    pub fn visible_face_count(&self) -> usize {
        self.masks.iter().map(|mask| mask.count_ones()).sum()
    }
}

/// Builds [`FaceVisibilityMask`]s from bordered chunk data.
pub struct FaceVisibilityMaskGenerator<'a> {
    registry: &'a BlockRegistry,
}

impl<'a> FaceVisibilityMaskGenerator<'a> {
    /// Creates a generator reading culling properties from `registry`.
    pub fn new(registry: &'a BlockRegistry) -> Self {
        FaceVisibilityMaskGenerator { registry }
    }

    /// Evaluates the culling rules for every face of every block in the chunk.
    ///
    /// # Arguments
    /// * `extended` - The chunk with its sampled neighbor border
    ///
    /// # Returns
    /// A mask whose bit `(side, index)` is set iff the block at `index` is not air
    /// and its `side` face is visible.
    pub fn generate(&self, extended: &ExtendedChunkData) -> FaceVisibilityMask {
        let mut mask = FaceVisibilityMask::default();
        let air = BlockType::AIR.id();

        let unknown = extended.unregistered_ids(self.registry);
        if !unknown.is_empty() {
            error!(
                "Chunk {:?} holds unregistered block ids {:?}, culling them as air",
                extended.position, unknown
            );
        }

        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                for x in 0..CHUNK_DIMENSION {
                    if extended.get(x, y, z) == air {
                        continue;
                    }
                    let index = block_index(x as usize, y as usize, z as usize);
                    for side in BlockSide::all() {
                        if extended.is_face_visible(x, y, z, side, self.registry) {
                            mask.masks[side as usize].set(index, true);
                        }
                    }
                }
            }
        }

        mask
    }
}
