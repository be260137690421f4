//! Torch light propagation and neighbor halo gathering across chunk seams.
#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use lode_blocks::Block;
use lode_chunk::{ChunkVoxels, VoxelGrid};
use lode_world::ChunkCoord;

/// 1-cell border of neighbor voxels in padded local coordinates: x and z range
/// over -1..=size, y over 0..size. Cells from missing neighbors are simply
/// absent and read as unlit air.
#[derive(Clone, Debug, Default)]
pub struct NeighborHalo {
    cells: HashMap<(i32, i32, i32), Block>,
}

impl NeighborHalo {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<Block> {
        self.cells.get(&(x, y, z)).copied()
    }

    pub fn insert(&mut self, x: i32, y: i32, z: i32, b: Block) {
        self.cells.insert((x, y, z), b);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(i32, i32, i32), &Block)> {
        self.cells.iter()
    }
}

/// Collects the seam-adjacent voxels of the 8 neighbors of `coord`. Axis
/// neighbors contribute a full face layer, diagonal neighbors only the shared
/// edge column. `lookup` resolves a neighbor to its chunk; each neighbor's
/// lock is held only while its layer is copied.
pub fn gather_halo<F>(coord: ChunkCoord, size: usize, lookup: F) -> NeighborHalo
where
    F: Fn(ChunkCoord) -> Option<Arc<Mutex<ChunkVoxels>>>,
{
    let mut halo = NeighborHalo::empty();
    let s = size as i32;
    for dx in -1i32..=1 {
        for dz in -1i32..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            let Some(chunk) = lookup(coord.offset(dx, dz)) else {
                continue;
            };
            let guard = chunk.lock().unwrap();
            // Local coordinate range inside the neighbor, and the padded
            // position it maps to: an axis offset selects the adjacent face
            // layer, a diagonal offset collapses both axes to one column.
            let xs: Vec<(usize, i32)> = match dx {
                -1 => vec![(size - 1, -1)],
                1 => vec![(0, s)],
                _ => (0..size).map(|x| (x, x as i32)).collect(),
            };
            let zs: Vec<(usize, i32)> = match dz {
                -1 => vec![(size - 1, -1)],
                1 => vec![(0, s)],
                _ => (0..size).map(|z| (z, z as i32)).collect(),
            };
            for &(lx, px) in &xs {
                for &(lz, pz) in &zs {
                    for y in 0..size {
                        let b = guard.block_at(lx, y, lz);
                        if !b.is_air() {
                            halo.insert(px, y as i32, pz, b);
                        }
                    }
                }
            }
        }
    }
    halo
}

#[derive(Clone, Copy, Debug)]
pub struct LightParams {
    pub attenuation: f32,
    pub floor: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            attenuation: 0.8,
            floor: 0.01,
        }
    }
}

impl From<&lode_world::worldgen::Lighting> for LightParams {
    fn from(cfg: &lode_world::worldgen::Lighting) -> Self {
        Self {
            attenuation: cfg.attenuation,
            floor: cfg.floor,
        }
    }
}

/// Per-cell light levels for one chunk, flattened (z, y, x)-major to match
/// the 3-D texture upload layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LightVolume {
    pub size: usize,
    data: Vec<f32>,
}

impl LightVolume {
    #[inline]
    pub fn at(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[(z * self.size + y) * self.size + x]
    }

    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.data
    }
}

/// Flood-fills torch light through a 1-cell-padded copy of the chunk. Seeds
/// are the chunk's own torches plus any emitting cells in the halo, each at
/// the block's emission level. Each step multiplies by the attenuation; a
/// cell's value is
/// overwritten only by a larger one, so the result is independent of queue
/// order and reproducible for identical inputs. Light reaches the faces of
/// solid cells but only continues through air.
pub fn propagate(
    grid: &VoxelGrid,
    torches: &HashSet<(usize, usize, usize)>,
    halo: &NeighborHalo,
    params: LightParams,
) -> LightVolume {
    let size = grid.size;
    let n = size + 2;
    let pidx = |x: usize, y: usize, z: usize| (z * n + y) * n + x;

    // Padded occupancy: interior from the grid, border from the halo. Border
    // y layers have no source and stay air.
    let mut conducts = vec![true; n * n * n];
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                conducts[pidx(x + 1, y + 1, z + 1)] = grid.get(x, y, z).conducts_light();
            }
        }
    }
    for (&(hx, hy, hz), &b) in halo.iter() {
        let (px, py, pz) = ((hx + 1) as usize, (hy + 1) as usize, (hz + 1) as usize);
        conducts[pidx(px, py, pz)] = b.conducts_light();
    }

    let mut levels = vec![0.0f32; n * n * n];
    let mut queue: VecDeque<(usize, usize, usize)> = VecDeque::new();
    for &(tx, ty, tz) in torches {
        let e = grid.get(tx, ty, tz).emission();
        if e > 0.0 {
            levels[pidx(tx + 1, ty + 1, tz + 1)] = e;
            queue.push_back((tx + 1, ty + 1, tz + 1));
        }
    }
    for (&(hx, hy, hz), &b) in halo.iter() {
        let e = b.emission();
        if e > 0.0 {
            let (px, py, pz) = ((hx + 1) as usize, (hy + 1) as usize, (hz + 1) as usize);
            levels[pidx(px, py, pz)] = e;
            queue.push_back((px, py, pz));
        }
    }

    while let Some((x, y, z)) = queue.pop_front() {
        let cur = levels[pidx(x, y, z)];
        if cur < params.floor {
            continue;
        }
        let next = cur * params.attenuation;
        let (xi, yi, zi) = (x as i32, y as i32, z as i32);
        const N: [(i32, i32, i32); 6] = [
            (1, 0, 0),
            (-1, 0, 0),
            (0, 1, 0),
            (0, -1, 0),
            (0, 0, 1),
            (0, 0, -1),
        ];
        for &(dx, dy, dz) in &N {
            let (nx, ny, nz) = (xi + dx, yi + dy, zi + dz);
            if nx < 0 || ny < 0 || nz < 0 || nx >= n as i32 || ny >= n as i32 || nz >= n as i32 {
                continue;
            }
            let (nx, ny, nz) = (nx as usize, ny as usize, nz as usize);
            let i = pidx(nx, ny, nz);
            if next > levels[i] {
                levels[i] = next;
                if conducts[i] {
                    queue.push_back((nx, ny, nz));
                }
            }
        }
    }

    // Strip the halo, keeping the interior in upload order.
    let mut data = vec![0.0f32; size * size * size];
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                data[(z * size + y) * size + x] = levels[pidx(x + 1, y + 1, z + 1)];
            }
        }
    }
    LightVolume { size, data }
}
