//! Per-chunk voxel state: grid storage, terrain generation, edit operations.
#![forbid(unsafe_code)]

use std::collections::HashSet;

use lode_blocks::Block;
use lode_world::{ChunkCoord, TreeGenerator, WorldGen};

mod voxel_grid;

pub use voxel_grid::VoxelGrid;

/// CPU model of one chunk: the voxel grid plus the registries edits touch.
/// Mutation bumps `rev`; a chunk counts as modified until a cube-data rebuild
/// computed from revision `r` is applied while `rev` is still `r`.
pub struct ChunkVoxels {
    pub coord: ChunkCoord,
    grid: VoxelGrid,
    torches: HashSet<(usize, usize, usize)>,
    trees: TreeGenerator,
    rev: u64,
    applied_rev: u64,
}

/// Read-only copy of chunk state taken under the chunk lock; background
/// rebuilds work from this so edits landing mid-rebuild are not lost, they
/// just keep the chunk modified for the next cycle.
#[derive(Clone)]
pub struct ChunkSnapshot {
    pub coord: ChunkCoord,
    pub grid: VoxelGrid,
    pub torches: HashSet<(usize, usize, usize)>,
    pub rev: u64,
}

impl ChunkVoxels {
    pub fn size(&self) -> usize {
        self.grid.size
    }

    #[inline]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    #[inline]
    pub fn block_at(&self, x: usize, y: usize, z: usize) -> Block {
        self.grid.get(x, y, z)
    }

    /// Occupancy test used by the raycast edit path.
    #[inline]
    pub fn is_solid_at(&self, x: usize, y: usize, z: usize) -> bool {
        self.grid.get(x, y, z).is_solid()
    }

    pub fn torches(&self) -> &HashSet<(usize, usize, usize)> {
        &self.torches
    }

    /// Places `block` at an empty cell. Rejects out-of-bounds targets and
    /// occupied cells with `false`, leaving all state untouched.
    pub fn add_cube(&mut self, x: i32, y: i32, z: i32, block: Block) -> bool {
        if block.is_air() || !self.grid.in_bounds(x, y, z) {
            return false;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if !self.grid.get(x, y, z).is_air() {
            return false;
        }
        self.grid.set(x, y, z, block);
        if block == Block::Torch {
            self.torches.insert((x, y, z));
        }
        self.rev += 1;
        true
    }

    /// Clears an occupied cell. Tree cells are also erased from the tree
    /// registry so a later regeneration will not restore them.
    pub fn remove_cube(&mut self, x: i32, y: i32, z: i32) -> bool {
        if !self.grid.in_bounds(x, y, z) {
            return false;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if self.grid.get(x, y, z).is_air() {
            return false;
        }
        self.grid.set(x, y, z, Block::Air);
        self.torches.remove(&(x, y, z));
        self.trees.remove_tree_cube_at(x, y, z);
        self.rev += 1;
        true
    }

    /// Forces a rebuild on the next update tick without changing any voxel.
    /// Used when a neighbor streams in and the shared seam needs relighting.
    pub fn mark_modified(&mut self) {
        self.rev += 1;
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.rev != self.applied_rev
    }

    pub fn snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot {
            coord: self.coord,
            grid: self.grid.clone(),
            torches: self.torches.clone(),
            rev: self.rev,
        }
    }

    /// Records that a rebuild computed from revision `rev` was applied. Only
    /// clears the modified state when no edit arrived since the snapshot.
    pub fn complete_apply(&mut self, rev: u64) {
        if self.rev == rev {
            self.applied_rev = rev;
        }
    }

    /// Re-writes registered trunk and crown cells into the grid. Idempotent;
    /// cells removed via [`ChunkVoxels::remove_cube`] stay removed.
    pub fn reapply_trees(&mut self) {
        let cells: Vec<(usize, usize, usize, Block)> = self
            .trees
            .trunk_cells()
            .map(|&(x, y, z)| (x, y, z, Block::Log))
            .chain(
                self.trees
                    .crown_cells()
                    .map(|&(x, y, z)| (x, y, z, Block::Leaves)),
            )
            .collect();
        for (x, y, z, b) in cells {
            if self.grid.get(x, y, z).is_air() {
                self.grid.set(x, y, z, b);
            }
        }
    }

    pub fn tree_cell_count(&self) -> usize {
        self.trees.trunk_cells().count() + self.trees.crown_cells().count()
    }
}

/// Generates the full CPU state for a chunk: banded terrain from the height
/// field, then deterministic trees written into the grid. Pure CPU work, safe
/// to run on any thread. Repeated calls with the same inputs match exactly.
pub fn generate_chunk(world_gen: &WorldGen, coord: ChunkCoord) -> ChunkVoxels {
    let size = world_gen.chunk_size;
    let (base_x, base_z) = coord.world_base(size);
    let sampler = world_gen.height_sampler();
    let mut grid = VoxelGrid::new(size);
    let mut heights = vec![-1i32; size * size];
    for z in 0..size {
        for x in 0..size {
            let h = sampler.column_height(base_x + x as i32, base_z + z as i32);
            heights[z * size + x] = h;
            let top = h.min(size as i32 - 1);
            for y in 0..=top {
                grid.set(x, y as usize, z, world_gen.surface_block(y));
            }
        }
    }
    let mut trees = TreeGenerator::new(world_gen.seed, world_gen.trees.clone());
    trees.generate(size, (base_x, base_z), |x, z| heights[z * size + x]);
    for &(x, y, z) in trees.trunk_cells() {
        grid.set(x, y, z, Block::Log);
    }
    for &(x, y, z) in trees.crown_cells() {
        if grid.get(x, y, z).is_air() {
            grid.set(x, y, z, Block::Leaves);
        }
    }
    ChunkVoxels {
        coord,
        grid,
        torches: HashSet::new(),
        trees,
        rev: 0,
        applied_rev: 0,
    }
}
