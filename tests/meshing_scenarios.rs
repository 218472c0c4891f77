use cgmath::{Point3, Vector3};
use voxel_mesher::engine_state::{
    rendering::{
        meshing::{build_chunk_mesh, BinaryChunkData, BinaryGreedyMesher, MeshQuad},
        texture::TextureArray,
    },
    spatial::{Aabb, Octree, OctreeConfig},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType, registry::BlockRegistry},
        chunk::{Chunk, CHUNK_DIMENSION},
        visibility::ExtendedChunkData,
    },
};

fn quads_of(chunk: &Chunk, registry: &BlockRegistry) -> Vec<MeshQuad> {
    BinaryGreedyMesher::new(registry).generate_all_quads(&BinaryChunkData::from_chunk(chunk))
}

fn chunk_with(blocks: &[(i32, i32, i32, BlockType)]) -> Chunk {
    let mut chunk = Chunk::empty(&Point3::new(0, 0, 0));
    for &(x, y, z, block_type) in blocks {
        chunk.set_block_type(x, y, z, block_type);
    }
    chunk
}

fn face_shown(quads: &[MeshQuad], block: Point3<i32>, side: BlockSide) -> bool {
    quads
        .iter()
        .any(|quad| quad.side == side && quad.covers(block))
}

#[test]
fn solid_chunk_is_six_full_quads() {
    let registry = BlockRegistry::default();
    for block_type in [BlockType::DIRT, BlockType::STONE, BlockType::GLASS] {
        let chunk = Chunk::filled(&Point3::new(0, 0, 0), block_type.id());
        let quads = quads_of(&chunk, &registry);
        assert_eq!(quads.len(), 6, "{block_type:?}");
        for side in BlockSide::all() {
            let quad = quads.iter().find(|quad| quad.side == side).unwrap();
            assert_eq!(quad.area(), CHUNK_DIMENSION * CHUNK_DIMENSION);
        }
    }
}

#[test]
fn adjacent_water_hides_its_shared_face() {
    let registry = BlockRegistry::default();
    let chunk = chunk_with(&[(5, 5, 5, BlockType::WATER), (6, 5, 5, BlockType::WATER)]);
    let quads = quads_of(&chunk, &registry);
    assert!(!face_shown(&quads, Point3::new(5, 5, 5), BlockSide::EAST));
    assert!(!face_shown(&quads, Point3::new(6, 5, 5), BlockSide::WEST));
    assert!(face_shown(&quads, Point3::new(5, 5, 5), BlockSide::WEST));
    assert!(face_shown(&quads, Point3::new(6, 5, 5), BlockSide::EAST));
    assert_eq!(quads.len(), 6);
}

#[test]
fn water_against_stone_shows_only_the_stone_face() {
    let registry = BlockRegistry::default();
    let chunk = chunk_with(&[(5, 5, 5, BlockType::WATER), (6, 5, 5, BlockType::STONE)]);
    let quads = quads_of(&chunk, &registry);
    assert!(!face_shown(&quads, Point3::new(5, 5, 5), BlockSide::EAST));
    assert!(face_shown(&quads, Point3::new(6, 5, 5), BlockSide::WEST));
}

#[test]
fn every_quad_is_a_flat_rectangle() {
    let registry = BlockRegistry::default();
    let chunks = [
        Chunk::random(&Point3::new(0, 0, 0), 11),
        Chunk::perlin(&Point3::new(1, 0, -2), 3),
        Chunk::checkerboard(&Point3::new(0, 0, 0)),
    ];
    for chunk in &chunks {
        for quad in quads_of(chunk, &registry) {
            assert!(quad.is_planar(), "{quad:?}");
            let end = quad.position + quad.size;
            assert!(quad.position.x >= 0 && quad.position.y >= 0 && quad.position.z >= 0);
            assert!(end.x <= CHUNK_DIMENSION && end.y <= CHUNK_DIMENSION && end.z <= CHUNK_DIMENSION);
        }
    }
}

#[test]
fn binary_data_agrees_with_the_chunk() {
    let chunk = Chunk::random(&Point3::new(4, -1, 2), 99);
    let data = BinaryChunkData::from_chunk(&chunk);
    for x in 0..CHUNK_DIMENSION {
        for y in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                let stored = chunk.get_block(x, y, z);
                for block_type in 0..10 {
                    assert_eq!(
                        data.has_block_at(x, y, z, block_type),
                        stored == block_type,
                        "({x}, {y}, {z}) type {block_type}"
                    );
                }
            }
        }
    }
}

#[test]
fn octree_region_queries_match_intersection() {
    let mut rng = fastrand::Rng::with_seed(42);
    let root = Aabb::new(Point3::new(-128.0, -128.0, -128.0), Point3::new(128.0, 128.0, 128.0));
    let mut octree = Octree::new(
        root,
        OctreeConfig {
            max_depth: 5,
            max_objects_per_node: 4,
        },
    );

    let mut stored = Vec::new();
    for id in 0..500u32 {
        let min = Point3::new(
            rng.f32() * 240.0 - 120.0,
            rng.f32() * 240.0 - 120.0,
            rng.f32() * 240.0 - 120.0,
        );
        let bounds = Aabb::from_min_size(min, Vector3::new(rng.f32() * 8.0, rng.f32() * 8.0, rng.f32() * 8.0));
        assert!(octree.insert(bounds, id));
        stored.push((bounds, id));
    }

    assert_eq!(octree.query_region(&root).len(), stored.len());
    let far = Aabb::new(Point3::new(500.0, 500.0, 500.0), Point3::new(510.0, 510.0, 510.0));
    assert!(octree.query_region(&far).is_empty());

    for _ in 0..40 {
        let min = Point3::new(rng.f32() * 200.0 - 100.0, rng.f32() * 200.0 - 100.0, rng.f32() * 200.0 - 100.0);
        let region = Aabb::from_min_size(min, Vector3::new(30.0, 30.0, 30.0));
        let mut found: Vec<u32> = octree.query_region(&region).into_iter().copied().collect();
        found.sort_unstable();
        let expected: Vec<u32> = stored
            .iter()
            .filter(|(bounds, _)| bounds.intersects(&region))
            .map(|(_, id)| *id)
            .collect();
        assert_eq!(found, expected);
    }

    for (bounds, id) in stored.iter().filter(|(_, id)| id % 2 == 0) {
        assert!(octree.remove(bounds, id));
    }
    let remaining = octree.query_region(&root);
    assert_eq!(remaining.len(), 250);
    assert!(remaining.iter().all(|id| **id % 2 == 1));
}

#[test]
fn two_by_two_slab_merges_into_one_top_quad() {
    let registry = BlockRegistry::default();
    let chunk = chunk_with(&[
        (0, 0, 0, BlockType::STONE),
        (1, 0, 0, BlockType::STONE),
        (0, 0, 1, BlockType::STONE),
        (1, 0, 1, BlockType::STONE),
    ]);
    let quads = quads_of(&chunk, &registry);
    let up: Vec<&MeshQuad> = quads.iter().filter(|quad| quad.side == BlockSide::UP).collect();
    assert_eq!(up.len(), 1);
    assert_eq!(up[0].position, Point3::new(0, 0, 0));
    assert_eq!(up[0].size, Vector3::new(2, 1, 2));
    assert_eq!(quads.len(), 6);
}

#[test]
fn merging_beats_one_quad_per_face() {
    let registry = BlockRegistry::default();
    let chunk = Chunk::from_fn(&Point3::new(0, 0, 0), |x, y, z| {
        if (4..12).contains(&x) && (4..12).contains(&y) && (4..12).contains(&z) {
            BlockType::SAND.id()
        } else {
            BlockType::AIR.id()
        }
    });
    let quads = quads_of(&chunk, &registry);
    assert!(quads.len() < 8 * 8 * 8 * 6);
    assert_eq!(quads.len(), 6);
    assert!(quads.iter().all(|quad| quad.area() == 64));
}

#[test]
fn stairs_never_hide_their_neighbors() {
    let registry = BlockRegistry::default();
    for block_type in [BlockType::STONE, BlockType::GLASS, BlockType::WATER] {
        let chunk = chunk_with(&[(5, 5, 5, block_type), (6, 5, 5, BlockType::OAK_STAIRS)]);
        let quads = quads_of(&chunk, &registry);
        assert!(face_shown(&quads, Point3::new(5, 5, 5), BlockSide::EAST), "{block_type:?}");
        // Stairs are drawn as models, not merged quads.
        assert!(quads.iter().all(|quad| quad.block_type != BlockType::OAK_STAIRS.id()));
    }
}

#[test]
fn neighbor_chunks_hide_border_faces() {
    let registry = BlockRegistry::default();
    let center = Chunk::solid(&Point3::new(0, 0, 0));
    let east = Chunk::solid(&Point3::new(1, 0, 0));
    let mut neighbors = [None; 6];
    neighbors[BlockSide::EAST as usize] = Some(&east);

    let extended = ExtendedChunkData::from_chunks(&center, neighbors);
    let mesh = build_chunk_mesh(&extended, &registry, &mut TextureArray::from_registry(&registry));
    assert_eq!(mesh.quad_count(), 5);
    assert!(mesh.quads.iter().all(|quad| quad.side != BlockSide::EAST));
    assert_eq!(mesh.faces.len(), 5);
}

fn east_border_quads(center: BlockType, east: BlockType) -> Vec<MeshQuad> {
    let registry = BlockRegistry::default();
    let mut chunk = Chunk::empty(&Point3::new(0, 0, 0));
    chunk.set_block_type(15, 5, 5, center);
    let mut neighbor = Chunk::empty(&Point3::new(1, 0, 0));
    neighbor.set_block_type(0, 5, 5, east);

    let neighbor_data = BinaryChunkData::from_chunk(&neighbor);
    let mut neighbors = [None; 6];
    neighbors[BlockSide::EAST as usize] = Some(&neighbor_data);
    BinaryGreedyMesher::new(&registry).generate_quads_with_neighbors(
        &BinaryChunkData::from_chunk(&chunk),
        center.id(),
        BlockSide::EAST,
        neighbors,
    )
}

#[test]
fn water_across_a_chunk_border() {
    let border = Point3::new(15, 5, 5);
    // Same liquid on both sides of the border.
    assert!(!face_shown(&east_border_quads(BlockType::WATER, BlockType::WATER), border, BlockSide::EAST));
    // A full opaque face hides the water surface.
    assert!(!face_shown(&east_border_quads(BlockType::WATER, BlockType::STONE), border, BlockSide::EAST));
    // A different transparent block does not.
    assert!(face_shown(&east_border_quads(BlockType::WATER, BlockType::GLASS), border, BlockSide::EAST));
    // Stone next to water keeps its face.
    assert!(face_shown(&east_border_quads(BlockType::STONE, BlockType::WATER), border, BlockSide::EAST));
}

#[test]
fn stairs_across_a_chunk_border_expose_the_face() {
    let border = Point3::new(15, 5, 5);
    assert!(!face_shown(&east_border_quads(BlockType::STONE, BlockType::STONE), border, BlockSide::EAST));
    for block_type in [BlockType::STONE, BlockType::GLASS, BlockType::WATER] {
        let quads = east_border_quads(block_type, BlockType::OAK_STAIRS);
        assert!(face_shown(&quads, border, BlockSide::EAST), "{block_type:?}");
    }
}
