use lode_world::ChunkCoord;
use proptest::prelude::*;

proptest! {
    // world coordinate = chunk base + local cell, for any chunk size.
    #[test]
    fn world_to_chunk_round_trips(
        wx in -100_000i32..100_000,
        wz in -100_000i32..100_000,
        size in prop_oneof![Just(16usize), Just(32), Just(64)],
    ) {
        let coord = ChunkCoord::of_world(wx, wz, size);
        let (lx, lz) = ChunkCoord::local_of_world(wx, wz, size);
        let (bx, bz) = coord.world_base(size);
        prop_assert!(lx < size && lz < size);
        prop_assert_eq!(bx + lx as i32, wx);
        prop_assert_eq!(bz + lz as i32, wz);
    }

    #[test]
    fn every_cell_of_a_chunk_maps_back_to_it(
        cx in -1_000i32..1_000,
        cz in -1_000i32..1_000,
        lx in 0usize..64,
        lz in 0usize..64,
    ) {
        let coord = ChunkCoord::new(cx, cz);
        let (bx, bz) = coord.world_base(64);
        prop_assert_eq!(
            ChunkCoord::of_world(bx + lx as i32, bz + lz as i32, 64),
            coord
        );
    }
}
