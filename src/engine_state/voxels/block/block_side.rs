//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the axis each one faces.
//! The numeric values are the face indices used by every per-face table in the crate
//! (culling categories, visibility masks, rotations, texture names).

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [DOWN, UP, NORTH, SOUTH, WEST, EAST]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The bottom face (facing negative Y)
    DOWN = 0,

    /// The top face (facing positive Y)
    UP = 1,

    /// The north face (facing negative Z)
    NORTH = 2,

    /// The south face (facing positive Z)
    SOUTH = 3,

    /// The west face (facing negative X)
    WEST = 4,

    /// The east face (facing positive X)
    EAST = 5,
}

/// The axis a face is perpendicular to.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Axis {
    /// The X axis (west/east faces)
    X,
    /// The Y axis (down/up faces)
    Y,
    /// The Z axis (north/south faces)
    Z,
}

impl BlockSide {
    /// Returns an array containing all six block faces in index order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::DOWN,
            BlockSide::UP,
            BlockSide::NORTH,
            BlockSide::SOUTH,
            BlockSide::WEST,
            BlockSide::EAST,
        ]
    }

    /// Converts a face index (0..6) back into a `BlockSide`.
    pub fn from_index(index: usize) -> Option<BlockSide> {
        Self::all().get(index).copied()
    }

    /// Returns the face on the other side of the shared boundary.
    ///
    /// down↔up, north↔south, west↔east.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::DOWN => BlockSide::UP,
            BlockSide::UP => BlockSide::DOWN,
            BlockSide::NORTH => BlockSide::SOUTH,
            BlockSide::SOUTH => BlockSide::NORTH,
            BlockSide::WEST => BlockSide::EAST,
            BlockSide::EAST => BlockSide::WEST,
        }
    }

    /// Unit offset from a block to its neighbor across this face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::DOWN => Vector3::new(0, -1, 0),
            BlockSide::UP => Vector3::new(0, 1, 0),
            BlockSide::NORTH => Vector3::new(0, 0, -1),
            BlockSide::SOUTH => Vector3::new(0, 0, 1),
            BlockSide::WEST => Vector3::new(-1, 0, 0),
            BlockSide::EAST => Vector3::new(1, 0, 0),
        }
    }

    /// The axis this face is perpendicular to, which is also the axis the greedy
    /// mesher slices along.
    pub fn axis(self) -> Axis {
        match self {
            BlockSide::DOWN | BlockSide::UP => Axis::Y,
            BlockSide::NORTH | BlockSide::SOUTH => Axis::Z,
            BlockSide::WEST | BlockSide::EAST => Axis::X,
        }
    }

    /// True for faces pointing along a negative axis.
    pub fn is_negative(self) -> bool {
        matches!(self, BlockSide::DOWN | BlockSide::NORTH | BlockSide::WEST)
    }
}
