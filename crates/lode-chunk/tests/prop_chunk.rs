use lode_blocks::Block;
use lode_chunk::VoxelGrid;
use proptest::prelude::*;

fn dim() -> impl Strategy<Value = usize> {
    1usize..=8
}

fn some_block() -> impl Strategy<Value = Block> {
    prop_oneof![
        Just(Block::Sand),
        Just(Block::Dirt),
        Just(Block::Grass),
        Just(Block::Log),
        Just(Block::Leaves),
        Just(Block::Torch),
    ]
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(size in dim()) {
        let g = VoxelGrid::new(size);
        let expect = size * size * size;
        let mut seen = vec![false; expect];
        for z in 0..size { for y in 0..size { for x in 0..size {
            let i = g.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // set writes through to the flat storage read back by get
    #[test]
    fn set_is_visible_through_get_and_blocks(
        size in dim(),
        b in some_block(),
        seed in any::<u64>(),
    ) {
        let mut g = VoxelGrid::new(size);
        let x = (seed % size as u64) as usize;
        let y = ((seed >> 8) % size as u64) as usize;
        let z = ((seed >> 16) % size as u64) as usize;
        g.set(x, y, z, b);
        prop_assert_eq!(g.get(x, y, z), b);
        prop_assert_eq!(g.blocks()[g.idx(x, y, z)], b);
    }

    // signed lookup agrees with bounds, air outside
    #[test]
    fn get_or_air_matches_bounds(size in dim(), wx in -10i32..20, wy in -10i32..20, wz in -10i32..20) {
        let mut g = VoxelGrid::new(size);
        for z in 0..size { for y in 0..size { for x in 0..size {
            g.set(x, y, z, Block::Dirt);
        }}}
        let s = size as i32;
        let inside = (0..s).contains(&wx) && (0..s).contains(&wy) && (0..s).contains(&wz);
        let expect = if inside { Block::Dirt } else { Block::Air };
        prop_assert_eq!(g.get_or_air(wx, wy, wz), expect);
    }

    // a fully solid grid exposes exactly the shell
    #[test]
    fn exposure_marks_exactly_the_shell(size in 2usize..=6) {
        let mut g = VoxelGrid::new(size);
        for z in 0..size { for y in 0..size { for x in 0..size {
            g.set(x, y, z, Block::Grass);
        }}}
        for z in 0..size { for y in 0..size { for x in 0..size {
            let on_shell = x == 0 || y == 0 || z == 0
                || x == size - 1 || y == size - 1 || z == size - 1;
            prop_assert_eq!(g.is_exposed(x, y, z), on_shell);
        }}}
    }
}
