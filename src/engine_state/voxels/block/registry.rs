//! # Block Registry Module
//!
//! The registry is the table of block definitions, indexed by stored block id. It is
//! built once at startup and then shared read-only by every meshing thread, usually
//! behind an `Arc`.
//!
//! ## JSON Format
//!
//! ```json
//! {
//!   "blocks": [
//!     { "name": "air", "culling": { "faces": ["none","none","none","none","none","none"],
//!                                   "is_transparent": true, "can_be_culled": false } },
//!     { "name": "grass", "textures": { "top": "grass_top", "bottom": "dirt", "side": "grass_side" } }
//!   ]
//! }
//! ```
//!
//! The array position is the block id, so the first entry must be air.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    block_side::BlockSide,
    block_type::BlockType,
    properties::{BlockCullingProperties, BlockShape},
    BlockTypeSize,
};

/// Maximum number of block definitions a registry can hold (one byte of id space).
pub const MAX_BLOCK_TYPES: usize = BlockTypeSize::MAX as usize + 1;

/// Errors raised while building a [`BlockRegistry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry JSON could not be parsed.
    #[error("failed to parse block registry: {0}")]
    Parse(#[from] serde_json::Error),

    /// Id 0 is missing or does not behave like air.
    #[error("block id 0 must be an air block, found {0:?}")]
    InvalidAir(Option<String>),

    /// More definitions than fit in a block id.
    #[error("registry has {0} blocks, at most {MAX_BLOCK_TYPES} are supported")]
    TooManyBlocks(usize),

    /// Two definitions share a name.
    #[error("block name {0:?} is defined more than once")]
    DuplicateName(String),
}

/// Texture names for the faces of a block.
///
/// `top` and `bottom` override the up and down faces, `side` the four horizontal
/// faces, and `all` covers anything not overridden.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceTextures {
    /// Texture used for every face without a more specific entry.
    pub all: Option<String>,
    /// Texture of the up face.
    pub top: Option<String>,
    /// Texture of the down face.
    pub bottom: Option<String>,
    /// Texture of the north, south, west and east faces.
    pub side: Option<String>,
}

impl FaceTextures {
    /// One texture on every face.
    pub fn uniform(name: &str) -> Self {
        FaceTextures {
            all: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Separate top, bottom and side textures.
    pub fn top_bottom_side(top: &str, bottom: &str, side: &str) -> Self {
        FaceTextures {
            all: None,
            top: Some(top.to_string()),
            bottom: Some(bottom.to_string()),
            side: Some(side.to_string()),
        }
    }

    /// Resolves the texture name of one face, if any entry covers it.
    pub fn resolve(&self, side: BlockSide) -> Option<&str> {
        let specific = match side {
            BlockSide::UP => self.top.as_deref(),
            BlockSide::DOWN => self.bottom.as_deref(),
            BlockSide::NORTH | BlockSide::SOUTH | BlockSide::WEST | BlockSide::EAST => {
                self.side.as_deref()
            }
        };
        specific.or(self.all.as_deref())
    }
}

/// Everything the engine knows about one block type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Unique lowercase name.
    pub name: String,
    /// Face culling behavior.
    #[serde(default)]
    pub culling: BlockCullingProperties,
    /// How the block is drawn.
    #[serde(default)]
    pub shape: BlockShape,
    /// Per-face texture names. Faces with no entry use the block name.
    #[serde(default)]
    pub textures: FaceTextures,
}

impl BlockDefinition {
    /// Creates a definition with explicit culling properties and textures.
    pub fn new(name: &str, culling: BlockCullingProperties, textures: FaceTextures) -> Self {
        BlockDefinition {
            name: name.to_string(),
            culling,
            shape: BlockShape::Cube,
            textures,
        }
    }

    /// Sets the drawing shape.
    pub fn with_shape(mut self, shape: BlockShape) -> Self {
        self.shape = shape;
        self
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    blocks: Vec<BlockDefinition>,
}

/// Immutable table of block definitions, indexed by block id.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    definitions: Vec<BlockDefinition>,
}

impl BlockRegistry {
    /// Builds a registry, validating the air entry, the size and name uniqueness.
    pub fn new(definitions: Vec<BlockDefinition>) -> Result<Self, RegistryError> {
        match definitions.first() {
            Some(air) if air.culling.is_air_like() => {}
            other => return Err(RegistryError::InvalidAir(other.map(|d| d.name.clone()))),
        }
        if definitions.len() > MAX_BLOCK_TYPES {
            return Err(RegistryError::TooManyBlocks(definitions.len()));
        }
        let mut names = HashSet::new();
        for definition in &definitions {
            if !names.insert(definition.name.as_str()) {
                return Err(RegistryError::DuplicateName(definition.name.clone()));
            }
        }
        Ok(BlockRegistry { definitions })
    }

    /// Parses and validates a registry from JSON.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Self::new(file.blocks)
    }

    /// Number of registered block types, air included.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// A registry always holds at least air, so this is never true for a built registry.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the definition of a block id, if registered.
    pub fn definition(&self, id: BlockTypeSize) -> Option<&BlockDefinition> {
        self.definitions.get(id as usize)
    }

    /// True if the id has a definition.
    pub fn contains(&self, id: BlockTypeSize) -> bool {
        (id as usize) < self.definitions.len()
    }

    /// Finds the id of a block by name.
    ///
    /// Built-in names resolve without a scan when the registry keeps them at their
    /// built-in id.
    pub fn id_of(&self, name: &str) -> Option<BlockTypeSize> {
        if let Some(block_type) = BlockType::from_name(name) {
            let id = block_type.id();
            if self.definition(id).is_some_and(|definition| definition.name == name) {
                return Some(id);
            }
        }
        self.definitions
            .iter()
            .position(|definition| definition.name == name)
            .map(|index| index as BlockTypeSize)
    }

    /// Culling properties of a block id.
    ///
    /// Unregistered ids read as air. This runs once per face in the mesh pass, so it
    /// does not log; [`FaceVisibilityMaskGenerator`] reports bad ids once per chunk.
    ///
    /// [`FaceVisibilityMaskGenerator`]: crate::engine_state::voxels::visibility::FaceVisibilityMaskGenerator
    #[inline]
    pub fn culling_properties(&self, id: BlockTypeSize) -> &BlockCullingProperties {
        match self.definitions.get(id as usize) {
            Some(definition) => &definition.culling,
            None => &BlockCullingProperties::AIR,
        }
    }

    /// Shorthand for the transparency flag of a block id.
    pub fn is_transparent(&self, id: BlockTypeSize) -> bool {
        self.culling_properties(id).is_transparent
    }

    /// Shorthand for the `can_be_culled` flag of a block id.
    pub fn can_be_culled(&self, id: BlockTypeSize) -> bool {
        self.culling_properties(id).can_be_culled
    }

    /// Drawing shape of a block id. Unregistered ids report `Cube`.
    pub fn shape(&self, id: BlockTypeSize) -> BlockShape {
        self.definition(id)
            .map(|definition| definition.shape)
            .unwrap_or_default()
    }

    /// Texture name for one face of a block, or `None` for unregistered ids.
    pub fn block_texture(&self, id: BlockTypeSize, side: BlockSide) -> Option<&str> {
        let definition = self.definition(id)?;
        Some(
            definition
                .textures
                .resolve(side)
                .unwrap_or(definition.name.as_str()),
        )
    }

    fn builtin_definition(block_type: BlockType) -> BlockDefinition {
        use BlockCullingProperties as P;
        match block_type {
            BlockType::AIR => BlockDefinition::new("air", P::AIR, FaceTextures::default()),
            BlockType::DIRT => BlockDefinition::new("dirt", P::OPAQUE_CUBE, FaceTextures::uniform("dirt")),
            BlockType::GRASS => BlockDefinition::new(
                "grass",
                P::OPAQUE_CUBE,
                FaceTextures::top_bottom_side("grass_top", "dirt", "grass_side"),
            ),
            BlockType::WOOD => BlockDefinition::new(
                "wood",
                P::OPAQUE_CUBE,
                FaceTextures::top_bottom_side("log_top", "log_top", "log_side"),
            ),
            BlockType::STONE => BlockDefinition::new("stone", P::OPAQUE_CUBE, FaceTextures::uniform("stone")),
            BlockType::SAND => BlockDefinition::new("sand", P::OPAQUE_CUBE, FaceTextures::uniform("sand")),
            BlockType::LEAVES => BlockDefinition::new("leaves", P::TRANSPARENT_CUBE, FaceTextures::uniform("leaves")),
            BlockType::GLASS => BlockDefinition::new("glass", P::TRANSPARENT_CUBE, FaceTextures::uniform("glass")),
            BlockType::WATER => BlockDefinition::new("water", P::LIQUID, FaceTextures::uniform("water")),
            BlockType::OAK_STAIRS => {
                BlockDefinition::new("oak_stairs", P::STAIRS, FaceTextures::uniform("planks"))
                    .with_shape(BlockShape::Model)
            }
        }
    }
}

impl Default for BlockRegistry {
    /// The built-in blocks, one per [`BlockType`] variant.
    fn default() -> Self {
        let definitions = (0..super::block_type::BLOCK_TYPE_COUNT as BlockTypeSize)
            .filter_map(BlockType::from_id)
            .map(Self::builtin_definition)
            .collect();
        BlockRegistry { definitions }
    }
}
