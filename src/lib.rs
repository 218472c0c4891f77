#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Mesher
//!
//! Chunk meshing for a block-based voxel world: face culling, binary greedy meshing,
//! conversion of merged quads into renderable face instances, and an octree index over
//! loaded chunks.
//!
//! ## Key Modules
//!
//! * `core` - Shared resources and configuration
//! * `engine_state` - Blocks, chunks, meshing, spatial indexing and mesh workers
//!
//! ## Pipeline
//!
//! For each chunk:
//! 1. Sample the chunk and a one block border from its neighbors
//! 2. Decide the visibility of every block face
//! 3. Build one occupancy bitmask per block type
//! 4. Greedily merge visible faces into quads
//! 5. Turn quads into face instances with texture layers
//!
//! ## Usage
//!
//! ```no_run
//! fn main() {
//!     voxel_mesher::run();
//! }
//! ```

use cgmath::{Point3, Vector3};
use log::{error, info, warn};
use web_time::Instant;

use crate::core::config::EngineConfig;
use crate::engine_state::{
    voxels::block::{block_type::BlockType, registry::BlockRegistry},
    EngineState,
};

pub mod core;
pub mod engine_state;

/// Generates a world from the config named by `VOXEL_MESHER_CONFIG`, meshes it on the
/// worker pool and logs mesh statistics and a sample raycast.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{}, using default config", err);
            EngineConfig::default()
        }
    };
    info!("Config: {:?}", config);

    let mut engine = EngineState::new(&config, BlockRegistry::default());

    let start = Instant::now();
    let generated = engine.generate_world();
    info!("Generated {} chunks in {:?}", generated, start.elapsed());

    let start = Instant::now();
    let received = engine.finish_tasks();
    let stats = engine.stats();
    info!(
        "Meshed {} chunks in {:?}: {} quads, {} face instances, {} instance bytes, {} texture layers",
        received,
        start.elapsed(),
        stats.quads,
        stats.faces,
        stats.instance_bytes,
        engine.textures.read().len()
    );

    let bounds = *engine.world.octree().bounds();
    let origin = Point3::new(0.5, bounds.max.y - 0.5, 0.5);
    let direction = Vector3::new(0.0, -1.0, 0.0);
    let reach = bounds.max.y - bounds.min.y;
    match engine.world.raycast(origin, direction, reach) {
        Some(hit) => {
            info!(
                "Raycast from {:?} hit block {} at {:?} after {:.2} blocks",
                origin, hit.block_type, hit.block_position, hit.distance
            );
            let edit_id = engine.registry.id_of(&config.edit_block).unwrap_or_else(|| {
                warn!("Unknown edit block {:?}, using air", config.edit_block);
                BlockType::AIR.id()
            });
            let dirty = engine.set_block(hit.block_position, edit_id);
            engine.finish_tasks();
            info!(
                "Replaced it with {}, remeshed {} chunks: {} quads total",
                config.edit_block,
                dirty,
                engine.stats().quads
            );
        }
        None => info!("Raycast from {:?} hit nothing", origin),
    }
}
