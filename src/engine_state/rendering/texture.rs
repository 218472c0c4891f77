//! Texture layer bookkeeping.
//!
//! Block faces reference textures by name. The renderer stores all block textures in
//! one texture array, so meshing needs a stable layer index per name. Loading the
//! images is the renderer's business; this module only hands out indices.

use std::collections::HashMap;

use log::debug;

use crate::core::MtResource;
use crate::engine_state::voxels::block::{block_side::BlockSide, registry::BlockRegistry};

/// Supplies a texture array layer for a texture name.
pub trait TextureProvider {
    /// Returns the layer of `path`, registering it with the next free layer if new.
    ///
    /// The same path always yields the same layer for the lifetime of the provider.
    fn get_or_register_texture(&mut self, path: &str) -> u32;
}

/// Name to layer table for a texture array.
///
/// Layers are assigned sequentially from 0 in registration order.
#[derive(Debug, Default, Clone)]
pub struct TextureArray {
    layers: HashMap<String, u32>,
    names: Vec<String>,
}

impl TextureArray {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with every face texture of every registered block already
    /// registered, in block id then face order.
    ///
    /// Pre-registering keeps layer indices independent of the order in which chunks
    /// happen to be meshed.
    pub fn from_registry(registry: &BlockRegistry) -> Self {
        let mut array = Self::new();
        for id in 1..registry.len() {
            for side in BlockSide::all() {
                if let Some(name) = registry.block_texture(id as _, side) {
                    array.get_or_register_texture(name);
                }
            }
        }
        debug!("Registered {} block textures", array.len());
        array
    }

    /// The layer of a name, if registered.
    pub fn layer_of(&self, path: &str) -> Option<u32> {
        self.layers.get(path).copied()
    }

    /// Texture names indexed by layer. This is the order the renderer loads images in.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of registered layers.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TextureProvider for TextureArray {
    fn get_or_register_texture(&mut self, path: &str) -> u32 {
        if let Some(layer) = self.layers.get(path) {
            return *layer;
        }
        let layer = self.names.len() as u32;
        self.layers.insert(path.to_string(), layer);
        self.names.push(path.to_string());
        layer
    }
}

/// Lets worker threads share one table.
impl<T: TextureProvider + Send + Sync + 'static> TextureProvider for MtResource<T> {
    fn get_or_register_texture(&mut self, path: &str) -> u32 {
        self.write().get_or_register_texture(path)
    }
}
