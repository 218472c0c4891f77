//! # Extended Chunk Data
//!
//! An 18x18x18 copy of a chunk's blocks plus a one block border sampled from the six
//! face neighbors. Local coordinates run from -1 to 16 on each axis. Border cells with
//! no neighbor chunk, and the 12 edges and 8 corners of the shell, hold air.

use cgmath::Point3;

use crate::engine_state::voxels::{
    block::{
        block_side::{Axis, BlockSide},
        block_type::BlockType,
        registry::BlockRegistry,
        BlockTypeSize,
    },
    chunk::{Chunk, CHUNK_DIMENSION, CHUNK_DIMENSION_WRAPPED, CHUNK_PLANE_SIZE_WRAPPED, CHUNK_SIZE_WRAPPED},
};

use super::culling;

/// Lists the border cells on one side of a chunk.
///
/// Each item is `(border, source)`: `border` is the position in extended coordinates
/// (one coordinate is -1 or 16) and `source` is the same cell in the neighbor chunk's
/// local coordinates.
pub fn border_positions(side: BlockSide) -> impl Iterator<Item = (Point3<i32>, Point3<i32>)> {
    let normal = side.normal();
    let layer = if side.is_negative() { -1 } else { CHUNK_DIMENSION };
    (0..CHUNK_DIMENSION).flat_map(move |a| {
        (0..CHUNK_DIMENSION).map(move |b| {
            let border = match side.axis() {
                Axis::X => Point3::new(layer, a, b),
                Axis::Y => Point3::new(a, layer, b),
                Axis::Z => Point3::new(a, b, layer),
            };
            let source = Point3::new(
                border.x - normal.x * CHUNK_DIMENSION,
                border.y - normal.y * CHUNK_DIMENSION,
                border.z - normal.z * CHUNK_DIMENSION,
            );
            (border, source)
        })
    })
}

/// A chunk with a one block border taken from its neighbors.
#[derive(Debug)]
pub struct ExtendedChunkData {
    /// The chunk coordinates of the center chunk.
    pub position: Point3<i32>,
    blocks: Vec<BlockTypeSize>,
}

impl ExtendedChunkData {
    /// Creates extended data for `position` with every cell air.
    pub fn new(position: Point3<i32>) -> Self {
        ExtendedChunkData {
            position,
            blocks: vec![BlockType::AIR.id(); CHUNK_SIZE_WRAPPED],
        }
    }

    /// Samples a chunk and its face neighbors.
    ///
    /// # Arguments
    /// * `chunk` - The center chunk
    /// * `neighbors` - Face neighbors indexed by [`BlockSide`]; `None` leaves that border air
    pub fn from_chunks(chunk: &Chunk, neighbors: [Option<&Chunk>; 6]) -> Self {
        let mut extended = Self::new(chunk.position);
        for (position, block) in chunk.iter_blocks() {
            extended.set(
                position.x as i32,
                position.y as i32,
                position.z as i32,
                block.block_type,
            );
        }
        for side in BlockSide::all() {
            if let Some(neighbor) = neighbors[side as usize] {
                extended.fill_border(side, |source| neighbor.get_block(source.x, source.y, source.z));
            }
        }
        extended
    }

    /// Writes the border cells of `side`, asking `sample` for each cell using the
    /// neighbor chunk's local coordinates.
    pub fn fill_border<F>(&mut self, side: BlockSide, mut sample: F)
    where
        F: FnMut(Point3<i32>) -> BlockTypeSize,
    {
        for (border, source) in border_positions(side) {
            self.set(border.x, border.y, border.z, sample(source));
        }
    }

    #[inline]
    fn index(x: i32, y: i32, z: i32) -> Option<usize> {
        let range = -1..=CHUNK_DIMENSION;
        if !range.contains(&x) || !range.contains(&y) || !range.contains(&z) {
            return None;
        }
        Some(
            (x + 1) as usize
                + (z + 1) as usize * CHUNK_DIMENSION_WRAPPED
                + (y + 1) as usize * CHUNK_PLANE_SIZE_WRAPPED,
        )
    }

    /// Block id at extended coordinates (-1..=16 per axis). Anything outside is air.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockTypeSize {
        match Self::index(x, y, z) {
            Some(index) => self.blocks[index],
            None => BlockType::AIR.id(),
        }
    }

    /// Sets the block id at extended coordinates. Writes outside the shell are ignored.
    pub fn set(&mut self, x: i32, y: i32, z: i32, block_type: BlockTypeSize) {
        if let Some(index) = Self::index(x, y, z) {
            self.blocks[index] = block_type;
        }
    }

    /// Distinct block ids, border included, that `registry` does not define.
    pub fn unregistered_ids(&self, registry: &BlockRegistry) -> Vec<BlockTypeSize> {
        let mut seen = [false; 256];
        let mut unknown = Vec::new();
        for &id in &self.blocks {
            if !seen[id as usize] {
                seen[id as usize] = true;
                if !registry.contains(id) {
                    unknown.push(id);
                }
            }
        }
        unknown.sort_unstable();
        unknown
    }

    /// Visibility of one face of a chunk-local block, using the sampled border as the
    /// neighbor for edge blocks.
    pub fn is_face_visible(
        &self,
        x: i32,
        y: i32,
        z: i32,
        side: BlockSide,
        registry: &BlockRegistry,
    ) -> bool {
        let normal = side.normal();
        culling::is_face_visible(
            self.get(x, y, z),
            Some(self.get(x + normal.x, y + normal.y, z + normal.z)),
            side,
            registry,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_positions_map_to_opposite_edge() {
        let west: Vec<_> = border_positions(BlockSide::WEST).collect();
        assert_eq!(west.len(), 256);
        assert!(west.iter().all(|(border, source)| border.x == -1 && source.x == 15
            && border.y == source.y && border.z == source.z));

        let up: Vec<_> = border_positions(BlockSide::UP).collect();
        assert!(up.iter().all(|(border, source)| border.y == 16 && source.y == 0));
    }

    #[test]
    fn samples_neighbor_borders() {
        let center = Chunk::empty(&Point3::new(0, 0, 0));
        let east = Chunk::filled(&Point3::new(1, 0, 0), BlockType::STONE.id());
        let mut neighbors: [Option<&Chunk>; 6] = [None; 6];
        neighbors[BlockSide::EAST as usize] = Some(&east);

        let extended = ExtendedChunkData::from_chunks(&center, neighbors);
        assert_eq!(extended.get(16, 4, 9), BlockType::STONE.id());
        assert_eq!(extended.get(-1, 4, 9), BlockType::AIR.id());
        assert_eq!(extended.get(16, 16, 9), BlockType::AIR.id());
        assert_eq!(extended.get(17, 0, 0), BlockType::AIR.id());
    }

    #[test]
    fn border_neighbors_cull_edge_faces() {
        let registry = BlockRegistry::default();
        let center = Chunk::solid(&Point3::new(0, 0, 0));
        let below = Chunk::solid(&Point3::new(0, -1, 0));
        let mut neighbors: [Option<&Chunk>; 6] = [None; 6];
        neighbors[BlockSide::DOWN as usize] = Some(&below);

        let extended = ExtendedChunkData::from_chunks(&center, neighbors);
        assert!(!extended.is_face_visible(3, 0, 3, BlockSide::DOWN, &registry));
        assert!(extended.is_face_visible(3, 15, 3, BlockSide::UP, &registry));
        // The naive test knows nothing about the chunk below.
        assert!(center.is_face_visible(3, 0, 3, BlockSide::DOWN, &registry));
    }

    #[test]
    fn unregistered_ids_are_listed_once() {
        let registry = BlockRegistry::default();
        let mut extended = ExtendedChunkData::new(Point3::new(0, 0, 0));
        assert!(extended.unregistered_ids(&registry).is_empty());

        for x in 0..16 {
            extended.set(x, 2, 2, 200);
        }
        extended.set(16, 0, 0, 150);
        extended.set(3, 3, 3, BlockType::STONE.id());
        assert_eq!(extended.unregistered_ids(&registry), vec![150, 200]);
    }
}
