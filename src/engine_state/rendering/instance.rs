//! Renderable face instances.
//!
//! Every merged quad becomes one instance of a unit square. The renderer draws the
//! square in its local XY plane facing +Z, scales it, rotates it onto the block face
//! and moves it to the anchor position.

use cgmath::{Quaternion, Vector3};

/// One textured face ready for the renderer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FaceInstance {
    /// World-space anchor of the unit square's local origin
    pub position: Vector3<f32>,
    /// Rotation from the local +Z facing square onto the block face
    pub rotation: Quaternion<f32>,
    /// Local width, height and depth scale
    pub scale: Vector3<f32>,
    /// Texture rectangle in pixels: `[u_min, v_min, u_max, v_max]`
    pub uv: [f32; 4],
    /// Layer in the block texture array
    pub texture_layer: u32,
}

/// GPU layout of a [`FaceInstance`].
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Rotation: 4x f32, x y z w (16 bytes)
/// - Scale: 3x f32 (12 bytes)
/// - UV: 4x f32 (16 bytes)
/// - Texture layer: u32 (4 bytes)
///
/// Total size: 60 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FaceInstanceRaw {
    position: [f32; 3],
    rotation: [f32; 4],
    scale: [f32; 3],
    uv: [f32; 4],
    texture_layer: u32,
}

impl FaceInstance {
    /// Packs the instance for upload to an instance buffer.
    pub fn to_raw(&self) -> FaceInstanceRaw {
        FaceInstanceRaw {
            position: self.position.into(),
            rotation: [
                self.rotation.v.x,
                self.rotation.v.y,
                self.rotation.v.z,
                self.rotation.s,
            ],
            scale: self.scale.into(),
            uv: self.uv,
            texture_layer: self.texture_layer,
        }
    }
}

/// Packs many instances into one byte buffer.
pub fn instance_bytes(instances: &[FaceInstance]) -> Vec<u8> {
    let raw: Vec<FaceInstanceRaw> = instances.iter().map(FaceInstance::to_raw).collect();
    bytemuck::cast_slice(&raw).to_vec()
}
