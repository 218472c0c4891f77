//! Conversion of mesher quads into renderable face instances.

use cgmath::{Deg, Point3, Quaternion, Rotation3, Vector3};
use log::warn;

use crate::engine_state::{
    rendering::{instance::FaceInstance, texture::TextureProvider},
    voxels::{
        block::{block_side::BlockSide, registry::BlockRegistry},
        chunk::CHUNK_DIMENSION,
    },
};

use super::mesh::quad::MeshQuad;

/// Pixel size of one block texture tile.
pub const TEXTURE_TILE_SIZE: f32 = 16.0;

/// Which components of the quad size are added to the quad position to reach the
/// corner the rotated unit square is anchored at. Indexed by [`BlockSide`].
const ANCHOR_CORNERS: [[i32; 3]; 6] = [
    [0, 0, 0], // DOWN
    [0, 1, 1], // UP
    [1, 0, 0], // NORTH
    [0, 0, 1], // SOUTH
    [0, 0, 0], // WEST
    [1, 0, 1], // EAST
];

/// Rotation taking the local +Z facing unit square onto a face direction.
pub fn face_rotation(side: BlockSide) -> Quaternion<f32> {
    match side {
        BlockSide::DOWN => Quaternion::from_angle_x(Deg(90.0)),
        BlockSide::UP => Quaternion::from_angle_x(Deg(-90.0)),
        BlockSide::NORTH => Quaternion::from_angle_y(Deg(180.0)),
        BlockSide::SOUTH => Quaternion::new(1.0, 0.0, 0.0, 0.0),
        BlockSide::WEST => Quaternion::from_angle_y(Deg(-90.0)),
        BlockSide::EAST => Quaternion::from_angle_y(Deg(90.0)),
    }
}

/// The quad's in-plane size as local (width, height).
fn face_extent(quad: &MeshQuad) -> (i32, i32) {
    match quad.side {
        BlockSide::DOWN | BlockSide::UP => (quad.size.x, quad.size.z),
        BlockSide::NORTH | BlockSide::SOUTH => (quad.size.x, quad.size.y),
        BlockSide::WEST | BlockSide::EAST => (quad.size.z, quad.size.y),
    }
}

/// Maps [`MeshQuad`]s to [`FaceInstance`]s.
pub struct BinaryMeshConverter<'a> {
    registry: &'a BlockRegistry,
}

impl<'a> BinaryMeshConverter<'a> {
    /// Creates a converter resolving texture names through `registry`.
    pub fn new(registry: &'a BlockRegistry) -> Self {
        BinaryMeshConverter { registry }
    }

    /// Converts one quad.
    ///
    /// # Arguments
    /// * `quad` - The quad in chunk-local coordinates
    /// * `chunk_position` - Chunk coordinates of the quad's chunk
    /// * `textures` - Source of texture array layers
    ///
    /// # Returns
    /// One face instance, or nothing if the quad's block type is not registered.
    pub fn convert_quad_to_faces<P: TextureProvider + ?Sized>(
        &self,
        quad: &MeshQuad,
        chunk_position: Point3<i32>,
        textures: &mut P,
    ) -> Vec<FaceInstance> {
        let Some(texture_name) = self.registry.block_texture(quad.block_type, quad.side) else {
            warn!(
                "Skipping quad with unregistered block type {} at {:?}",
                quad.block_type, quad.position
            );
            return Vec::new();
        };
        let texture_layer = textures.get_or_register_texture(texture_name);

        let corner = ANCHOR_CORNERS[quad.side as usize];
        let anchor = Vector3::new(
            (chunk_position.x * CHUNK_DIMENSION + quad.position.x + corner[0] * quad.size.x) as f32,
            (chunk_position.y * CHUNK_DIMENSION + quad.position.y + corner[1] * quad.size.y) as f32,
            (chunk_position.z * CHUNK_DIMENSION + quad.position.z + corner[2] * quad.size.z) as f32,
        );

        let (width, height) = face_extent(quad);

        vec![FaceInstance {
            position: anchor,
            rotation: face_rotation(quad.side),
            scale: Vector3::new(width as f32, height as f32, 1.0),
            uv: [
                0.0,
                0.0,
                TEXTURE_TILE_SIZE * width as f32,
                TEXTURE_TILE_SIZE * height as f32,
            ],
            texture_layer,
        }]
    }

    /// Converts every quad of a chunk, skipping quads of unregistered types.
    pub fn convert_all_quads<P: TextureProvider + ?Sized>(
        &self,
        quads: &[MeshQuad],
        chunk_position: Point3<i32>,
        textures: &mut P,
    ) -> Vec<FaceInstance> {
        let mut faces = Vec::with_capacity(quads.len());
        for quad in quads {
            faces.extend(self.convert_quad_to_faces(quad, chunk_position, &mut *textures));
        }
        faces
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Rotation;

    use super::*;
    use crate::engine_state::{
        rendering::texture::TextureArray,
        voxels::block::{block_side::Axis, block_type::BlockType},
    };

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
    }

    /// World-space corners of the unit square after scale, rotation and translation.
    fn corners(face: &FaceInstance) -> [Vector3<f32>; 4] {
        [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].map(|(u, v)| {
            let local = Vector3::new(u * face.scale.x, v * face.scale.y, 0.0);
            face.position + face.rotation.rotate_vector(local)
        })
    }

    #[test]
    fn rotations_turn_local_normal_onto_face_normal() {
        for side in BlockSide::all() {
            let normal = side.normal().cast::<f32>().unwrap();
            let rotated = face_rotation(side).rotate_vector(Vector3::unit_z());
            assert!(close(rotated, normal), "{side:?}: {rotated:?}");
        }
    }

    #[test]
    fn instances_cover_the_quad_face() {
        let registry = BlockRegistry::default();
        let converter = BinaryMeshConverter::new(&registry);
        let mut textures = TextureArray::new();
        let stone = BlockType::STONE.id();

        for side in BlockSide::all() {
            let size = match side.axis() {
                Axis::X => Vector3::new(1, 3, 2),
                Axis::Y => Vector3::new(2, 1, 3),
                Axis::Z => Vector3::new(2, 3, 1),
            };
            let quad = MeshQuad::new(Point3::new(4, 5, 6), size, side, stone);
            let faces = converter.convert_quad_to_faces(&quad, Point3::new(1, 0, -1), &mut textures);
            assert_eq!(faces.len(), 1);

            // Expected face rectangle in world space.
            let min = Vector3::new(16.0 + 4.0, 5.0, -16.0 + 6.0);
            let max = min + size.cast::<f32>().unwrap();
            let plane = if side.is_negative() { min } else { max };

            for corner in corners(&faces[0]) {
                for axis in 0..3 {
                    assert!(corner[axis] >= min[axis] - 1e-4 && corner[axis] <= max[axis] + 1e-4);
                }
                match side.axis() {
                    Axis::X => {
                        assert!((corner.x - plane.x).abs() < 1e-4)
                    }
                    Axis::Y => {
                        assert!((corner.y - plane.y).abs() < 1e-4)
                    }
                    Axis::Z => {
                        assert!((corner.z - plane.z).abs() < 1e-4)
                    }
                }
            }
        }
    }

    #[test]
    fn merged_quads_tile_their_texture() {
        let registry = BlockRegistry::default();
        let converter = BinaryMeshConverter::new(&registry);
        let mut textures = TextureArray::new();
        let quad = MeshQuad::new(
            Point3::new(0, 15, 0),
            Vector3::new(4, 1, 3),
            BlockSide::UP,
            BlockType::GRASS.id(),
        );
        let faces = converter.convert_quad_to_faces(&quad, Point3::new(0, 0, 0), &mut textures);
        assert_eq!(faces[0].uv, [0.0, 0.0, 64.0, 48.0]);
        assert_eq!(faces[0].scale, Vector3::new(4.0, 3.0, 1.0));
        assert_eq!(faces[0].position, Vector3::new(0.0, 16.0, 3.0));
        assert_eq!(Some(faces[0].texture_layer), textures.layer_of("grass_top"));
    }

    #[test]
    fn grass_sides_use_their_own_textures() {
        let registry = BlockRegistry::default();
        let converter = BinaryMeshConverter::new(&registry);
        let mut textures = TextureArray::new();
        let grass = BlockType::GRASS.id();
        let quads: Vec<_> = BlockSide::all()
            .into_iter()
            .map(|side| MeshQuad::new(Point3::new(0, 0, 0), Vector3::new(1, 1, 1), side, grass))
            .collect();
        let faces = converter.convert_all_quads(&quads, Point3::new(0, 0, 0), &mut textures);
        assert_eq!(faces.len(), 6);
        assert_eq!(textures.len(), 3);
        assert_eq!(faces[BlockSide::DOWN as usize].texture_layer, textures.layer_of("dirt").unwrap());
        assert_eq!(faces[BlockSide::EAST as usize].texture_layer, textures.layer_of("grass_side").unwrap());
    }

    #[test]
    fn unknown_block_type_yields_nothing() {
        let registry = BlockRegistry::default();
        let converter = BinaryMeshConverter::new(&registry);
        let mut textures = TextureArray::new();
        let quads = vec![
            MeshQuad::new(Point3::new(0, 0, 0), Vector3::new(1, 1, 1), BlockSide::UP, 250),
            MeshQuad::new(Point3::new(1, 0, 0), Vector3::new(1, 1, 1), BlockSide::UP, BlockType::SAND.id()),
        ];
        let faces = converter.convert_all_quads(&quads, Point3::new(0, 0, 0), &mut textures);
        assert_eq!(faces.len(), 1);
        assert!(textures.layer_of("sand").is_some());
    }
}
