//! # Core Module
//!
//! Shared plumbing used throughout the crate.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//! - `config`: Engine configuration loaded from JSON

pub mod config;
pub mod mt_resource;

pub use mt_resource::MtResource;
