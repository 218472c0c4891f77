//! # Mesh Tasks
//!
//! A task is one unit of meshing work. It owns everything it reads, so it can be moved
//! to a worker thread without holding any lock on world data.
//!
//! ## Task Lifecycle
//! 1. The owner of the world samples a chunk into an [`ExtendedChunkData`]
//! 2. A [`ChunkMeshTask`] is published via `MeshWorkerPool::publish_task()`
//! 3. A worker calls [`ChunkMeshTask::process`] with its [`WorkerContext`]
//! 4. The finished [`ChunkMesh`] is collected on the owning thread

use std::sync::Arc;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::{
            meshing::{build_chunk_mesh, ChunkMesh},
            texture::TextureArray,
        },
        voxels::{block::registry::BlockRegistry, visibility::ExtendedChunkData},
    },
};

/// Shared state every worker meshes against.
#[derive(Clone)]
pub struct WorkerContext {
    /// Immutable block properties and texture names
    pub registry: Arc<BlockRegistry>,
    /// Texture layer table shared with the renderer
    pub textures: MtResource<TextureArray>,
}

impl WorkerContext {
    /// Bundles a registry and a texture table.
    pub fn new(registry: Arc<BlockRegistry>, textures: MtResource<TextureArray>) -> Self {
        WorkerContext { registry, textures }
    }
}

/// Rebuilds the mesh of one chunk.
pub struct ChunkMeshTask {
    extended: ExtendedChunkData,
}

impl ChunkMeshTask {
    /// Creates a task meshing the sampled chunk.
    pub fn new(extended: ExtendedChunkData) -> Self {
        ChunkMeshTask { extended }
    }

    /// Chunk coordinates of the chunk this task meshes.
    pub fn position(&self) -> cgmath::Point3<i32> {
        self.extended.position
    }

    /// Runs the full meshing pass.
    ///
    /// The returned mesh is complete; nothing of it is visible to other threads before
    /// this returns.
    pub fn process(self, context: &mut WorkerContext) -> ChunkMesh {
        build_chunk_mesh(&self.extended, &context.registry, &mut context.textures)
    }
}
