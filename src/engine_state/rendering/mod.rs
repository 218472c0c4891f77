//! Rendering-side data for the voxel engine.
//!
//! Nothing here talks to a GPU. This module produces what a renderer uploads: merged
//! quads, face instances in a packed layout, and the texture layer table they index.

pub mod instance;
pub mod meshing;
pub mod texture;

// Re-export commonly used types
pub use instance::{FaceInstance, FaceInstanceRaw};
pub use meshing::{build_chunk_mesh, ChunkMesh};
pub use texture::{TextureArray, TextureProvider};
