//! Binary greedy meshing.
//!
//! For one block type and one face direction the mesher ANDs the type's occupancy
//! mask with the direction's visibility mask, cuts the result into 16 layers of
//! 16 rows of 16 bits, and greedily merges runs of set bits inside each layer into
//! rectangles. Rows are plain `u16`s, so finding and extending a run is a handful of
//! shifts and masks instead of a per-voxel loop.
//!
//! Layer and row axes per direction:
//!
//! | faces       | layer | row | column |
//! |-------------|-------|-----|--------|
//! | down / up   | y     | z   | x      |
//! | north/south | z     | y   | x      |
//! | west / east | x     | y   | z      |

use cgmath::{Point3, Vector3};
use log::debug;

use crate::engine_state::voxels::{
    block::{
        block_side::{Axis, BlockSide},
        properties::BlockShape,
        registry::BlockRegistry,
        BlockTypeSize,
    },
    chunk::{CHUNK_DIMENSION, CHUNK_PLANE_SIZE, CHUNK_WORDS},
    visibility::{FaceVisibilityMask, FaceVisibilityMaskGenerator},
};

use super::{binary_chunk::BinaryChunkData, quad::MeshQuad};

const DIMENSION: usize = CHUNK_DIMENSION as usize;

/// 16 layers of 16 rows of 16 bits. Bit `c` of `slices[layer][row]` is column `c`.
type Slices = [[u16; DIMENSION]; DIMENSION];

/// Extracts the 16-bit row of blocks along X starting at storage index `start`.
///
/// `start` is always a multiple of 16, so the row never straddles a word.
#[inline]
fn x_row(words: &[u64; CHUNK_WORDS], start: usize) -> u16 {
    (words[start / 64] >> (start % 64)) as u16
}

/// Cuts a chunk mask into per-layer 2D bit slices for the axis of `side`.
fn build_slices(words: &[u64; CHUNK_WORDS], side: BlockSide) -> Slices {
    let mut slices = [[0u16; DIMENSION]; DIMENSION];
    for y in 0..DIMENSION {
        for z in 0..DIMENSION {
            let row = x_row(words, z * DIMENSION + y * CHUNK_PLANE_SIZE as usize);
            if row == 0 {
                continue;
            }
            match side.axis() {
                Axis::Y => slices[y][z] = row,
                Axis::Z => slices[z][y] = row,
                Axis::X => {
                    // Transpose: each set x becomes bit z in layer x, row y.
                    let mut remaining = row;
                    while remaining != 0 {
                        let x = remaining.trailing_zeros() as usize;
                        slices[x][y] |= 1 << z;
                        remaining &= remaining - 1;
                    }
                }
            }
        }
    }
    slices
}

/// Maps a merged rectangle in a layer back to a chunk-local quad.
fn slice_quad(
    side: BlockSide,
    layer: usize,
    row: usize,
    column: usize,
    width: usize,
    height: usize,
    block_type: BlockTypeSize,
) -> MeshQuad {
    let (l, r, c, w, h) = (
        layer as i32,
        row as i32,
        column as i32,
        width as i32,
        height as i32,
    );
    let (position, size) = match side.axis() {
        Axis::Y => (Point3::new(c, l, r), Vector3::new(w, 1, h)),
        Axis::Z => (Point3::new(c, r, l), Vector3::new(w, h, 1)),
        Axis::X => (Point3::new(l, r, c), Vector3::new(1, h, w)),
    };
    MeshQuad::new(position, size, side, block_type)
}

/// Greedily merges one layer, consuming its bits.
///
/// Rows are scanned from 0 up and each row from its lowest set bit. A run of set bits
/// is taken as the quad width, then extended into following rows while every bit of
/// the run is set there. Consumed bits are cleared as the quad grows.
fn merge_slice(
    slice: &mut [u16; DIMENSION],
    layer: usize,
    side: BlockSide,
    block_type: BlockTypeSize,
    quads: &mut Vec<MeshQuad>,
) {
    for row in 0..DIMENSION {
        while slice[row] != 0 {
            let start = slice[row].trailing_zeros();
            let width = (slice[row] >> start).trailing_ones();
            let run = (((1u32 << width) - 1) << start) as u16;
            slice[row] &= !run;

            let mut height = 1;
            while row + height < DIMENSION && slice[row + height] & run == run {
                slice[row + height] &= !run;
                height += 1;
            }

            quads.push(slice_quad(
                side,
                layer,
                row,
                start as usize,
                width as usize,
                height,
                block_type,
            ));
        }
    }
}

/// Emits the quads of one block type and direction from precomputed masks.
fn quads_from_masks(
    chunk_data: &BinaryChunkData,
    visibility: &FaceVisibilityMask,
    block_type: BlockTypeSize,
    side: BlockSide,
    quads: &mut Vec<MeshQuad>,
) {
    let Some(occupancy) = chunk_data.mask(block_type) else {
        return;
    };
    let occupancy = occupancy.as_raw_slice();
    let visible = visibility.mask(side).as_raw_slice();
    let words: [u64; CHUNK_WORDS] = std::array::from_fn(|i| occupancy[i] & visible[i]);
    if words.iter().all(|word| *word == 0) {
        return;
    }

    let mut slices = build_slices(&words, side);
    for (layer, slice) in slices.iter_mut().enumerate() {
        merge_slice(slice, layer, side, block_type, quads);
    }
}

/// Turns per-type occupancy into merged quads.
///
/// The mesher only reads the registry, so one instance can be shared by reference
/// across a whole meshing pass.
pub struct BinaryGreedyMesher<'a> {
    registry: &'a BlockRegistry,
}

impl<'a> BinaryGreedyMesher<'a> {
    /// Creates a mesher using `registry` for culling and shape lookups.
    pub fn new(registry: &'a BlockRegistry) -> Self {
        BinaryGreedyMesher { registry }
    }

    fn visibility_for(
        &self,
        chunk_data: &BinaryChunkData,
        neighbors: [Option<&BinaryChunkData>; 6],
    ) -> FaceVisibilityMask {
        let extended = chunk_data.to_extended(neighbors);
        FaceVisibilityMaskGenerator::new(self.registry).generate(&extended)
    }

    /// Quads for one block type and direction of an isolated chunk.
    ///
    /// Nothing is known beyond the chunk border, so border faces are always emitted.
    pub fn generate_quads(
        &self,
        chunk_data: &BinaryChunkData,
        block_type: BlockTypeSize,
        side: BlockSide,
    ) -> Vec<MeshQuad> {
        self.generate_quads_with_neighbors(chunk_data, block_type, side, [None; 6])
    }

    /// Quads for every active type and direction of an isolated chunk.
    pub fn generate_all_quads(&self, chunk_data: &BinaryChunkData) -> Vec<MeshQuad> {
        self.generate_all_quads_with_neighbors(chunk_data, [None; 6])
    }

    /// Quads for one block type and direction, culling border faces against the
    /// given face neighbors.
    ///
    /// # Arguments
    /// * `chunk_data` - The chunk being meshed
    /// * `block_type` - The type to mesh
    /// * `side` - The face direction to mesh
    /// * `neighbors` - Face neighbors indexed by [`BlockSide`]; any may be absent
    pub fn generate_quads_with_neighbors(
        &self,
        chunk_data: &BinaryChunkData,
        block_type: BlockTypeSize,
        side: BlockSide,
        neighbors: [Option<&BinaryChunkData>; 6],
    ) -> Vec<MeshQuad> {
        let visibility = self.visibility_for(chunk_data, neighbors);
        self.generate_quads_with_mask(chunk_data, &visibility, block_type, side)
    }

    /// Quads for every active type and direction, culling border faces against the
    /// given face neighbors. This is the path used for world chunks.
    pub fn generate_all_quads_with_neighbors(
        &self,
        chunk_data: &BinaryChunkData,
        neighbors: [Option<&BinaryChunkData>; 6],
    ) -> Vec<MeshQuad> {
        let visibility = self.visibility_for(chunk_data, neighbors);
        self.generate_all_quads_with_mask(chunk_data, &visibility)
    }

    /// Quads for one type and direction from an already generated visibility mask.
    pub fn generate_quads_with_mask(
        &self,
        chunk_data: &BinaryChunkData,
        visibility: &FaceVisibilityMask,
        block_type: BlockTypeSize,
        side: BlockSide,
    ) -> Vec<MeshQuad> {
        let mut quads = Vec::new();
        quads_from_masks(chunk_data, visibility, block_type, side, &mut quads);
        quads
    }

    /// Quads for every active type and direction from an already generated
    /// visibility mask.
    ///
    /// Types drawn as [`BlockShape::Model`] are skipped; they still hide or expose
    /// their neighbors' faces through the mask.
    pub fn generate_all_quads_with_mask(
        &self,
        chunk_data: &BinaryChunkData,
        visibility: &FaceVisibilityMask,
    ) -> Vec<MeshQuad> {
        let mut quads = Vec::new();
        for &block_type in chunk_data.active_types() {
            if self.registry.shape(block_type) == BlockShape::Model {
                continue;
            }
            for side in BlockSide::all() {
                quads_from_masks(chunk_data, visibility, block_type, side, &mut quads);
            }
        }
        debug!(
            "Chunk {:?}: {} quads from {} block types",
            chunk_data.position,
            quads.len(),
            chunk_data.active_types().len()
        );
        quads
    }
}
