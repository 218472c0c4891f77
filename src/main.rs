//! # Voxel Mesher Entry Point
//!
//! Calls into the library's `run()` function, which generates a small world, meshes it
//! on the worker pool and logs the results.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_mesher::run();
}
