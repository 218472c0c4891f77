//! # Face Culling Rules
//!
//! The single decision function for "is this face drawn". The naive chunk test, the
//! bordered-data test and the precomputed mask all call [`is_face_visible`], so they
//! cannot disagree.

use crate::engine_state::voxels::block::{
    block_side::BlockSide, block_type::BlockType, properties::FaceCull, registry::BlockRegistry,
    BlockTypeSize,
};

/// Decides whether the `side` face of a `current` block is visible against `neighbor`.
///
/// # Arguments
/// * `current` - The block owning the face
/// * `neighbor` - The block across the face, or `None` when nothing is known about it
/// * `side` - The face being tested
/// * `registry` - Culling properties for both blocks
///
/// # Returns
/// `true` if the face must be drawn.
///
/// The rules, in order:
/// 1. Air has no faces.
/// 2. Unknown and air neighbors expose the face.
/// 3. A neighbor flagged `exposes_neighbors` (stairs) always exposes the face.
/// 4. A transparent block hides faces against its own type. A transparent liquid also
///    hides faces against an opaque neighbor whose touching side is full. Any other
///    transparent face is drawn.
/// 5. An opaque block facing a transparent neighbor is drawn.
/// 6. Otherwise the face is culled iff the neighbor's touching side is full and the
///    current block can be culled.
#[inline]
pub fn is_face_visible(
    current: BlockTypeSize,
    neighbor: Option<BlockTypeSize>,
    side: BlockSide,
    registry: &BlockRegistry,
) -> bool {
    let air = BlockType::AIR.id();
    if current == air {
        return false;
    }
    let neighbor = match neighbor {
        Some(neighbor) if neighbor != air => neighbor,
        _ => return true,
    };

    let neighbor_properties = registry.culling_properties(neighbor);
    if neighbor_properties.exposes_neighbors {
        return true;
    }

    let current_properties = registry.culling_properties(current);
    let neighbor_face_full = neighbor_properties.face(side.opposite()) == FaceCull::Full;

    if current_properties.is_transparent {
        if neighbor == current {
            return false;
        }
        if current_properties.is_liquid {
            return neighbor_properties.is_transparent || !neighbor_face_full;
        }
        return true;
    }

    if neighbor_properties.is_transparent {
        return true;
    }

    !(neighbor_face_full && current_properties.can_be_culled)
}
