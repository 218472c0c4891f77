//! # Visibility Module
//!
//! Face culling: the culling rule itself, the bordered chunk data it reads at chunk
//! edges, and the per-direction masks that cache its results for a whole chunk.

pub mod culling;
pub mod extended;
pub mod face_mask;

pub use extended::ExtendedChunkData;
pub use face_mask::{FaceVisibilityMask, FaceVisibilityMaskGenerator};
