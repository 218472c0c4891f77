//! # Engine Configuration
//!
//! Runtime settings for world generation, spatial indexing and mesh workers.
//! Every field has a default, so a config file only needs to name what it changes.
//!
//! ```
//! use voxel_mesher::core::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "mesh_workers": 4 }"#).unwrap();
//! assert_eq!(config.mesh_workers, 4);
//! assert_eq!(config.octree.max_depth, EngineConfig::default().octree.max_depth);
//! ```

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::{spatial::octree::OctreeConfig, voxels::world::ChunkGenerationMethod};

/// Environment variable naming a JSON config file read by [`crate::run`].
pub const CONFIG_PATH_ENV: &str = "VOXEL_MESHER_CONFIG";

/// Errors raised while loading an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The config file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chunks generated in each horizontal direction around the origin.
    pub world_radius_chunks: i32,
    /// Vertical chunk layers generated, starting at chunk y = -1.
    pub world_height_chunks: i32,
    /// How new chunks are filled.
    pub chunk_generation: ChunkGenerationMethod,
    /// Seed for noise based terrain.
    pub seed: u32,
    /// Number of background mesh worker threads.
    pub mesh_workers: usize,
    /// Subdivision limits for the chunk octree.
    pub octree: OctreeConfig,
    /// Registry name of the block written where the sample raycast in [`crate::run`] hits.
    pub edit_block: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            world_radius_chunks: 2,
            world_height_chunks: 2,
            chunk_generation: ChunkGenerationMethod::Perlin,
            seed: 0,
            mesh_workers: 2,
            octree: OctreeConfig::default(),
            edit_block: "air".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], falling back to defaults when the
    /// variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }
}
