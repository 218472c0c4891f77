//! Merged quads emitted by the greedy mesher.

use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::{
    block_side::{Axis, BlockSide},
    BlockTypeSize,
};

/// A merged rectangle of same-type visible faces produced by the greedy mesher.
///
/// `position` is the chunk-local block with the smallest coordinates covered by the
/// quad. `size` spans the covered blocks; the component along the face normal is
/// always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshQuad {
    /// Chunk-local minimum corner block
    pub position: Point3<i32>,
    /// Extent in blocks along each axis
    pub size: Vector3<i32>,
    /// The face direction of every face merged into this quad
    pub side: BlockSide,
    /// The block type of every face merged into this quad
    pub block_type: BlockTypeSize,
}

impl MeshQuad {
    /// Creates a new quad.
    pub fn new(
        position: Point3<i32>,
        size: Vector3<i32>,
        side: BlockSide,
        block_type: BlockTypeSize,
    ) -> Self {
        MeshQuad {
            position,
            size,
            side,
            block_type,
        }
    }

    /// Number of unit faces merged into this quad.
    pub fn area(&self) -> i32 {
        self.size.x * self.size.y * self.size.z
    }

    /// True if every size component is positive and the component along the face
    /// normal is exactly 1.
    pub fn is_planar(&self) -> bool {
        let depth = match self.side.axis() {
            Axis::X => self.size.x,
            Axis::Y => self.size.y,
            Axis::Z => self.size.z,
        };
        self.size.x > 0 && self.size.y > 0 && self.size.z > 0 && depth == 1
    }

    /// True if the quad covers the face of the chunk-local block at `block`.
    pub fn covers(&self, block: Point3<i32>) -> bool {
        (self.position.x..self.position.x + self.size.x).contains(&block.x)
            && (self.position.y..self.position.y + self.size.y).contains(&block.y)
            && (self.position.z..self.position.z + self.size.z).contains(&block.z)
    }
}
