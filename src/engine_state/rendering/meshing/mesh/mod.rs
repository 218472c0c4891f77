//! Binary greedy meshing of a single chunk.
//!
//! - `binary_chunk`: per-block-type occupancy masks
//! - `greedy`: slicing and rectangle merging over those masks
//! - `quad`: the merged rectangles the mesher emits

pub mod binary_chunk;
pub mod greedy;
pub mod quad;

pub use binary_chunk::BinaryChunkData;
pub use greedy::BinaryGreedyMesher;
pub use quad::MeshQuad;
