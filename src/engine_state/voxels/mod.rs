//! # Voxel Engine Core
//!
//! This module contains the core voxel engine functionality, providing the foundation
//! for representing, manipulating, and rendering a voxel-based world.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Defines individual voxel types, properties, and behaviors
//! * **Chunk**: Manages fixed-size 3D arrays of blocks for efficient memory use and processing
//! * **Visibility**: Decides which block faces can be seen, per face or per whole chunk
//! * **World**: Coordinates chunks and provides a unified interface for the entire voxel space
//!
//! ## Data Flow
//!
//! 1. World receives requests for block access or modification
//! 2. World delegates to the chunk holding the block and reports which meshes are dirty
//! 3. Dirty chunks are sampled with their neighbor borders for remeshing

pub mod block;
pub mod chunk;
pub mod visibility;
pub mod world;
