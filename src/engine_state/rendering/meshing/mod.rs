//! Mesh generation for voxel rendering.
//!
//! This module turns chunk data into renderable face instances. One pass over a chunk
//! runs, in order:
//! 1. face visibility masks from the bordered chunk data
//! 2. per-type occupancy masks
//! 3. binary greedy meshing into quads
//! 4. conversion of quads into face instances
//!
//! The pass is a pure function of its inputs, so it can run on any thread. Only the
//! finished [`ChunkMesh`] is handed to the renderer.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{
    block::registry::BlockRegistry,
    visibility::{ExtendedChunkData, FaceVisibilityMaskGenerator},
};

use super::{
    instance::{instance_bytes, FaceInstance},
    texture::TextureProvider,
};

pub mod converter;
pub mod mesh;

pub use converter::BinaryMeshConverter;
pub use mesh::{BinaryChunkData, BinaryGreedyMesher, MeshQuad};

/// The complete mesh of one chunk.
#[derive(Debug, Clone)]
pub struct ChunkMesh {
    /// Chunk coordinates of the meshed chunk
    pub position: Point3<i32>,
    /// Merged quads in chunk-local coordinates
    pub quads: Vec<MeshQuad>,
    /// Renderable instances, one per quad of a registered block type
    pub faces: Vec<FaceInstance>,
}

impl ChunkMesh {
    /// Number of merged quads.
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// True if the chunk has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Packed instance data for an instance buffer.
    pub fn instance_bytes(&self) -> Vec<u8> {
        instance_bytes(&self.faces)
    }
}

/// Runs the full meshing pass over one chunk.
///
/// # Arguments
/// * `extended` - The chunk with its neighbor border already sampled
/// * `registry` - Block properties and texture names
/// * `textures` - Source of texture array layers
///
/// # Returns
/// The chunk's quads and face instances.
pub fn build_chunk_mesh<P: TextureProvider + ?Sized>(
    extended: &ExtendedChunkData,
    registry: &BlockRegistry,
    textures: &mut P,
) -> ChunkMesh {
    let start = Instant::now();

    let visibility = FaceVisibilityMaskGenerator::new(registry).generate(extended);
    let chunk_data = BinaryChunkData::from_extended(extended);
    let quads = BinaryGreedyMesher::new(registry).generate_all_quads_with_mask(&chunk_data, &visibility);
    let faces = BinaryMeshConverter::new(registry).convert_all_quads(&quads, extended.position, textures);

    debug!(
        "Meshed chunk {:?}: {} visible faces merged into {} quads in {:?}",
        extended.position,
        visibility.visible_face_count(),
        quads.len(),
        start.elapsed()
    );

    ChunkMesh {
        position: extended.position,
        quads,
        faces,
    }
}
