//! CPU-side surface extraction: exposed-cube instances and water surfaces.
#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::time::Instant;

use lode_blocks::Block;
use lode_chunk::{ChunkSnapshot, VoxelGrid};
use lode_geom::{Mat4, Vec3};
use lode_lighting::{LightParams, LightVolume, NeighborHalo, propagate};

mod water;

pub use water::{WaterSurface, build_water_surfaces};

/// One visible voxel: world-space position plus its translation-only model
/// matrix for instanced drawing.
#[derive(Clone, Debug)]
pub struct Cube {
    pub world_pos: Vec3,
    pub model: Mat4,
    pub block: Block,
}

/// Result of one chunk rebuild, handed from a worker to the main thread in a
/// single move; the receiver uploads and takes full ownership.
pub struct CubeData {
    pub cubes: Vec<Cube>,
    pub instances: HashMap<Block, Vec<Mat4>>,
    pub light: LightVolume,
    pub rev: u64,
    pub t_mesh_ms: u32,
    pub t_light_ms: u32,
}

/// Rebuilds the visible-cube set and light volume for a chunk snapshot.
///
/// A cell is emitted iff it holds a renderable solid block and at least one
/// 6-connected neighbor is open. Vertical out-of-bounds is always open; at
/// horizontal seams the halo decides, and an absent halo cell counts as open
/// so unloaded-neighbor borders stay visible until the neighbor streams in.
pub fn build_cube_data(snap: &ChunkSnapshot, halo: &NeighborHalo, params: LightParams) -> CubeData {
    let grid = &snap.grid;
    let size = grid.size;
    let (base_x, base_z) = snap.coord.world_base(size);
    let t0 = Instant::now();
    let mut cubes = Vec::new();
    let mut instances: HashMap<Block, Vec<Mat4>> = HashMap::new();
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let b = grid.get(x, y, z);
                if b.is_air() || b.is_water() {
                    continue;
                }
                if !is_exposed_with_halo(grid, halo, x, y, z) {
                    continue;
                }
                let pos = Vec3::new((base_x + x as i32) as f32, y as f32, (base_z + z as i32) as f32);
                let model = Mat4::translation(pos);
                instances.entry(b).or_default().push(model);
                cubes.push(Cube {
                    world_pos: pos,
                    model,
                    block: b,
                });
            }
        }
    }
    let t_mesh_ms = elapsed_ms(t0);
    let t1 = Instant::now();
    let light = propagate(grid, &snap.torches, halo, params);
    let t_light_ms = elapsed_ms(t1);
    log::trace!(
        "rebuilt chunk ({}, {}): {} cubes, {} block types, mesh {t_mesh_ms} ms, light {t_light_ms} ms",
        snap.coord.cx,
        snap.coord.cz,
        cubes.len(),
        instances.len()
    );
    CubeData {
        cubes,
        instances,
        light,
        rev: snap.rev,
        t_mesh_ms,
        t_light_ms,
    }
}

fn elapsed_ms(t0: Instant) -> u32 {
    t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

fn is_exposed_with_halo(grid: &VoxelGrid, halo: &NeighborHalo, x: usize, y: usize, z: usize) -> bool {
    let s = grid.size as i32;
    let (x, y, z) = (x as i32, y as i32, z as i32);
    const N: [(i32, i32, i32); 6] = [
        (1, 0, 0),
        (-1, 0, 0),
        (0, 1, 0),
        (0, -1, 0),
        (0, 0, 1),
        (0, 0, -1),
    ];
    N.iter().any(|&(dx, dy, dz)| {
        let (nx, ny, nz) = (x + dx, y + dy, z + dz);
        if ny < 0 || ny >= s {
            return true;
        }
        if nx < 0 || nx >= s || nz < 0 || nz >= s {
            return match halo.get(nx, ny, nz) {
                Some(b) => b.is_air() || b.is_water(),
                None => true,
            };
        }
        let nb = grid.get(nx as usize, ny as usize, nz as usize);
        nb.is_air() || nb.is_water()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lode_blocks::Block;
    use lode_world::ChunkCoord;
    use std::collections::HashSet;

    fn snapshot_of(grid: VoxelGrid, coord: ChunkCoord) -> ChunkSnapshot {
        ChunkSnapshot {
            coord,
            grid,
            torches: HashSet::new(),
            rev: 0,
        }
    }

    fn slab(size: usize, layers: usize) -> VoxelGrid {
        let mut g = VoxelGrid::new(size);
        for z in 0..size {
            for y in 0..layers {
                for x in 0..size {
                    g.set(x, y, z, Block::Grass);
                }
            }
        }
        g
    }

    #[test]
    fn two_layer_slab_emits_both_layers() {
        // 4x4 slab, 2 layers: top layer open above, bottom layer open below
        // (vertical out-of-bounds), so all 32 cells are visible.
        let snap = snapshot_of(slab(4, 2), ChunkCoord::new(0, 0));
        let data = build_cube_data(&snap, &NeighborHalo::empty(), LightParams::default());
        assert_eq!(data.cubes.len(), 32);
        let total: usize = data.instances.values().map(|v| v.len()).sum();
        assert_eq!(total, 32);
    }

    #[test]
    fn buried_cells_are_never_emitted() {
        let snap = snapshot_of(slab(4, 4), ChunkCoord::new(0, 0));
        let data = build_cube_data(&snap, &NeighborHalo::empty(), LightParams::default());
        let interior_pos = Vec3::new(1.0, 1.0, 1.0);
        assert!(
            !data
                .cubes
                .iter()
                .any(|c| (c.world_pos - interior_pos).length_sq() < 1e-6)
        );
        // Exhaustive check against the exposure rule.
        for c in &data.cubes {
            let (x, y, z) = (c.world_pos.x as usize, c.world_pos.y as usize, c.world_pos.z as usize);
            assert!(snap.grid.is_exposed(x, y, z));
        }
    }

    #[test]
    fn solid_halo_hides_seam_faces() {
        // Single solid cell at the x=0 edge, one layer up so the bottom
        // neighbor is in-grid. Without a halo its -X face is open; a solid
        // halo layer closes it.
        let mut g = VoxelGrid::new(4);
        g.set(0, 1, 1, Block::Dirt);
        let snap = snapshot_of(g, ChunkCoord::new(0, 0));

        let open = build_cube_data(&snap, &NeighborHalo::empty(), LightParams::default());
        assert_eq!(open.cubes.len(), 1);

        // Fully bury the cell: halo on -X, grid solids on the other sides.
        let mut g = VoxelGrid::new(4);
        g.set(0, 1, 1, Block::Dirt);
        g.set(1, 1, 1, Block::Dirt);
        g.set(0, 0, 1, Block::Dirt);
        g.set(0, 2, 1, Block::Dirt);
        g.set(0, 1, 0, Block::Dirt);
        g.set(0, 1, 2, Block::Dirt);
        let snap = snapshot_of(g, ChunkCoord::new(0, 0));
        let mut halo = NeighborHalo::empty();
        halo.insert(-1, 1, 1, Block::Dirt);
        let closed = build_cube_data(&snap, &halo, LightParams::default());
        assert!(
            !closed
                .cubes
                .iter()
                .any(|c| c.world_pos.x == 0.0 && c.world_pos.y == 1.0 && c.world_pos.z == 1.0),
            "cell buried by halo must not be emitted"
        );
    }

    #[test]
    fn bottom_layer_is_always_exposed() {
        // Vertical out-of-bounds counts as open, so a y=0 cell keeps its
        // bottom face even when every in-grid and halo neighbor is solid.
        let mut g = VoxelGrid::new(4);
        g.set(0, 0, 1, Block::Dirt);
        g.set(1, 0, 1, Block::Dirt);
        g.set(0, 1, 1, Block::Dirt);
        g.set(0, 0, 0, Block::Dirt);
        g.set(0, 0, 2, Block::Dirt);
        let snap = snapshot_of(g, ChunkCoord::new(0, 0));
        let mut halo = NeighborHalo::empty();
        halo.insert(-1, 0, 1, Block::Dirt);
        let data = build_cube_data(&snap, &halo, LightParams::default());
        assert!(
            data.cubes
                .iter()
                .any(|c| c.world_pos.x == 0.0 && c.world_pos.y == 0.0 && c.world_pos.z == 1.0),
            "floor cell stays exposed through the open bottom"
        );
    }

    #[test]
    fn model_matrices_use_chunk_world_origin() {
        let mut g = VoxelGrid::new(4);
        g.set(1, 0, 2, Block::Sand);
        let snap = snapshot_of(g, ChunkCoord::new(-1, 2));
        let data = build_cube_data(&snap, &NeighborHalo::empty(), LightParams::default());
        assert_eq!(data.cubes.len(), 1);
        let t = data.cubes[0].model.translation_part();
        assert_eq!((t.x, t.y, t.z), (-3.0, 0.0, 10.0));
    }

    #[test]
    fn torch_light_lands_in_cube_data() {
        let mut g = VoxelGrid::new(8);
        g.set(2, 2, 2, Block::Torch);
        let mut torches = HashSet::new();
        torches.insert((2usize, 2usize, 2usize));
        let snap = ChunkSnapshot {
            coord: ChunkCoord::new(0, 0),
            grid: g,
            torches,
            rev: 3,
        };
        let data = build_cube_data(&snap, &NeighborHalo::empty(), LightParams::default());
        assert_eq!(data.rev, 3);
        assert_eq!(data.light.at(2, 2, 2), 1.0);
        assert!((data.light.at(3, 2, 2) - 0.8).abs() < 1e-6);
        assert!((data.light.at(4, 2, 2) - 0.64).abs() < 1e-6);
    }
}
