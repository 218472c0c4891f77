//! # Engine State Module
//!
//! Ties the voxel world, the block registry, the texture table and the mesh workers
//! together.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world and the latest mesh of every chunk
//! * `rendering` - Greedy meshing and conversion into renderable face instances
//! * `spatial` - Bounding boxes and octrees over loaded chunks
//! * `task_management` - Background mesh workers
//! * `voxels` - Blocks, chunks, face culling and the world
//!
//! ## Mesh Updates
//!
//! Chunks are meshed off-thread. At most one task per chunk is in flight: a chunk that
//! becomes dirty again while its mesh is being built is republished when that result
//! arrives, so an older result can never replace a newer one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, warn};

use crate::core::{config::EngineConfig, MtResource};
use rendering::{meshing::ChunkMesh, texture::TextureArray};
use task_management::{
    task::{ChunkMeshTask, WorkerContext},
    MeshWorkerPool,
};
use voxels::{
    block::{registry::BlockRegistry, BlockTypeSize},
    world::World,
};

pub mod rendering;
pub mod spatial;
pub mod task_management;
pub mod voxels;

/// Totals over every chunk mesh held by an [`EngineState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Chunks with a mesh
    pub chunks: usize,
    /// Merged quads
    pub quads: usize,
    /// Face instances
    pub faces: usize,
    /// Packed instance buffer size
    pub instance_bytes: usize,
}

/// The world and everything needed to keep its meshes current.
pub struct EngineState {
    /// The voxel world containing all chunk data
    pub world: World,
    /// Block properties shared with the mesh workers
    pub registry: Arc<BlockRegistry>,
    /// Texture layer table shared with the mesh workers
    pub textures: MtResource<TextureArray>,
    /// Background mesh workers
    pub task_manager: MeshWorkerPool,
    meshes: HashMap<Point3<i32>, ChunkMesh>,
    in_flight: HashSet<Point3<i32>>,
    remesh_after_flight: HashSet<Point3<i32>>,
}

impl EngineState {
    /// Creates an engine with an empty world sized by `config`.
    pub fn new(config: &EngineConfig, registry: BlockRegistry) -> Self {
        let registry = Arc::new(registry);
        let textures = MtResource::new(TextureArray::from_registry(&registry));
        let task_manager = MeshWorkerPool::new(
            config.mesh_workers,
            WorkerContext::new(registry.clone(), textures.clone()),
        );
        EngineState {
            world: World::from_config(config),
            registry,
            textures,
            task_manager,
            meshes: HashMap::new(),
            in_flight: HashSet::new(),
            remesh_after_flight: HashSet::new(),
        }
    }

    /// Generates every chunk of the world and schedules their meshes.
    ///
    /// # Returns
    /// The number of chunks generated.
    pub fn generate_world(&mut self) -> usize {
        let added = self.world.generate_all();
        for position in &added {
            self.schedule_mesh(*position);
        }
        added.len()
    }

    /// Schedules a mesh rebuild for a loaded chunk.
    ///
    /// # Returns
    /// `false` if the chunk is not loaded.
    pub fn schedule_mesh(&mut self, position: Point3<i32>) -> bool {
        if self.in_flight.contains(&position) {
            self.remesh_after_flight.insert(position);
            return true;
        }
        let Some(extended) = self.world.extended_data(position) else {
            return false;
        };
        self.in_flight.insert(position);
        self.task_manager.publish_task(ChunkMeshTask::new(extended));
        true
    }

    /// Sets a block in world block coordinates and schedules every chunk it dirties.
    ///
    /// # Returns
    /// The number of chunks scheduled.
    pub fn set_block(&mut self, position: Point3<i32>, block_type: BlockTypeSize) -> usize {
        let dirty = self.world.set_block(position, block_type);
        for chunk in &dirty {
            self.schedule_mesh(*chunk);
        }
        dirty.len()
    }

    /// Collects finished meshes without blocking.
    ///
    /// # Returns
    /// The number of meshes received.
    pub fn process_tasks(&mut self) -> usize {
        let meshes = self.task_manager.process_completed_tasks();
        let received = self.store_meshes(meshes);
        self.recover_dropped_tasks();
        received
    }

    /// Blocks until every scheduled mesh, including reschedules, is built.
    ///
    /// # Returns
    /// The number of meshes received.
    pub fn finish_tasks(&mut self) -> usize {
        let mut received = 0;
        loop {
            let meshes = self.task_manager.drain();
            received += self.store_meshes(meshes);
            self.recover_dropped_tasks();
            if self.task_manager.is_idle() {
                break;
            }
        }
        received
    }

    /// Releases chunks whose tasks a dead worker lost, republishing them while any
    /// worker is left.
    fn recover_dropped_tasks(&mut self) {
        let dropped = self.task_manager.take_dropped_tasks();
        if dropped.is_empty() {
            return;
        }
        let retry = self.task_manager.live_worker_count() > 0;
        for position in dropped {
            self.in_flight.remove(&position);
            self.remesh_after_flight.remove(&position);
            if retry {
                self.schedule_mesh(position);
            } else {
                warn!("Chunk {:?} left without a mesh, no worker is running", position);
            }
        }
    }

    fn store_meshes(&mut self, meshes: Vec<ChunkMesh>) -> usize {
        let count = meshes.len();
        for mesh in meshes {
            let position = mesh.position;
            self.in_flight.remove(&position);
            debug!("Chunk {:?} mesh ready with {} faces", position, mesh.faces.len());
            self.meshes.insert(position, mesh);
            if self.remesh_after_flight.remove(&position) {
                self.schedule_mesh(position);
            }
        }
        count
    }

    /// The latest mesh of a chunk.
    pub fn mesh_at(&self, position: Point3<i32>) -> Option<&ChunkMesh> {
        self.meshes.get(&position)
    }

    /// Totals over all held meshes.
    pub fn stats(&self) -> MeshStats {
        self.meshes.values().fold(MeshStats::default(), |stats, mesh| MeshStats {
            chunks: stats.chunks + 1,
            quads: stats.quads + mesh.quad_count(),
            faces: stats.faces + mesh.faces.len(),
            instance_bytes: stats.instance_bytes
                + mesh.faces.len() * std::mem::size_of::<rendering::instance::FaceInstanceRaw>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, world::ChunkGenerationMethod};

    fn config(generation: ChunkGenerationMethod) -> EngineConfig {
        EngineConfig {
            world_radius_chunks: 1,
            world_height_chunks: 1,
            chunk_generation: generation,
            mesh_workers: 2,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn generated_world_is_fully_meshed() {
        let mut engine = EngineState::new(&config(ChunkGenerationMethod::Solid), BlockRegistry::default());
        assert_eq!(engine.generate_world(), 4);
        assert_eq!(engine.finish_tasks(), 4);

        let stats = engine.stats();
        assert_eq!(stats.chunks, 4);
        // A 2x1x2 block of solid chunks: each chunk shows its four outer faces
        // (up, down and two sides), one 16x16 quad each.
        assert_eq!(stats.quads, 16);
        assert_eq!(stats.faces, 16);
        assert_eq!(stats.instance_bytes, 16 * 60);
    }

    #[test]
    fn edits_remesh_the_touched_chunks() {
        let mut engine = EngineState::new(&config(ChunkGenerationMethod::Empty), BlockRegistry::default());
        engine.generate_world();
        engine.finish_tasks();
        assert_eq!(engine.stats().quads, 0);

        assert_eq!(engine.set_block(Point3::new(3, -13, 3), BlockType::STONE.id()), 1);
        // Edit again while the first rebuild may still be in flight.
        engine.set_block(Point3::new(4, -13, 3), BlockType::STONE.id());
        engine.finish_tasks();

        let mesh = engine.mesh_at(Point3::new(0, -1, 0)).unwrap();
        assert_eq!(mesh.quad_count(), 6);
        assert!(mesh.quads.iter().any(|quad| quad.size.x == 2));
        assert!(engine.task_manager.is_idle());
    }

    #[test]
    fn unloaded_chunks_are_not_scheduled() {
        let mut engine = EngineState::new(&config(ChunkGenerationMethod::Empty), BlockRegistry::default());
        assert!(!engine.schedule_mesh(Point3::new(9, 9, 9)));
        assert_eq!(engine.process_tasks(), 0);
    }

    #[test]
    fn chunks_lost_to_a_dead_worker_are_remeshed() {
        let mut engine = EngineState::new(&config(ChunkGenerationMethod::Solid), BlockRegistry::default());
        engine.task_manager.disconnect_worker(0);
        engine.generate_world();
        assert_eq!(engine.finish_tasks(), 4);
        assert_eq!(engine.stats().chunks, 4);
        assert!(engine.in_flight.is_empty());
    }

    #[test]
    fn chunks_are_released_when_every_worker_is_gone() {
        let mut engine = EngineState::new(&config(ChunkGenerationMethod::Solid), BlockRegistry::default());
        engine.task_manager.disconnect_worker(0);
        engine.task_manager.disconnect_worker(1);
        engine.generate_world();
        assert_eq!(engine.finish_tasks(), 0);
        assert!(engine.in_flight.is_empty());
        assert!(engine.remesh_after_flight.is_empty());
        // A later request is published again instead of waiting on a lost task.
        assert!(engine.schedule_mesh(Point3::new(0, -1, 0)));
        assert!(engine.in_flight.contains(&Point3::new(0, -1, 0)));
        assert_eq!(engine.process_tasks(), 0);
        assert!(engine.in_flight.is_empty());
    }
}
