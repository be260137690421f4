use std::collections::VecDeque;

use lode_blocks::Block;
use lode_chunk::VoxelGrid;
use lode_geom::Vec3;

/// One contiguous water body at a single level: a flat quad per cell plus a
/// centroid for the renderer's transparency sorting.
#[derive(Clone, Debug)]
pub struct WaterSurface {
    pub block: Block,
    /// Local cells covered by this surface, one quad each.
    pub cells: Vec<(usize, usize, usize)>,
    /// World-space height of the quads: cell bottom plus the fill height.
    pub surface_y: f32,
    pub centroid: Vec3,
}

/// Water occupancy for a cell: explicit water blocks in the grid, plus a
/// synthesized full source in any air cell on the sea-level layer so the
/// ocean reads as an unbroken plane.
#[inline]
fn water_at(grid: &VoxelGrid, water_level: i32, x: usize, y: usize, z: usize) -> Option<Block> {
    let b = grid.get(x, y, z);
    if b.is_water() {
        Some(b)
    } else if b.is_air() && y as i32 == water_level {
        Some(Block::WaterSource)
    } else {
        None
    }
}

/// Groups water cells into connected components over 4-connected horizontal
/// neighbors of the same sub-variant (source vs. flowing never merge) and
/// emits one surface per component. `base` is the chunk's world cell origin.
pub fn build_water_surfaces(
    grid: &VoxelGrid,
    base: (i32, i32),
    water_level: i32,
) -> Vec<WaterSurface> {
    let size = grid.size;
    let mut processed = vec![false; size * size * size];
    let mut surfaces = Vec::new();
    for z in 0..size {
        for y in 0..size {
            for x in 0..size {
                let idx = grid.idx(x, y, z);
                if processed[idx] {
                    continue;
                }
                let Some(kind) = water_at(grid, water_level, x, y, z) else {
                    continue;
                };
                processed[idx] = true;
                let mut cells = Vec::new();
                let mut queue = VecDeque::new();
                queue.push_back((x, y, z));
                while let Some((cx, cy, cz)) = queue.pop_front() {
                    cells.push((cx, cy, cz));
                    for &(dx, dz) in &[(1i32, 0i32), (-1, 0), (0, 1), (0, -1)] {
                        let (nx, nz) = (cx as i32 + dx, cz as i32 + dz);
                        if nx < 0 || nz < 0 || nx >= size as i32 || nz >= size as i32 {
                            continue;
                        }
                        let (nx, nz) = (nx as usize, nz as usize);
                        let nidx = grid.idx(nx, cy, nz);
                        if processed[nidx] {
                            continue;
                        }
                        if water_at(grid, water_level, nx, cy, nz) == Some(kind) {
                            processed[nidx] = true;
                            queue.push_back((nx, cy, nz));
                        }
                    }
                }
                let inv = 1.0 / cells.len() as f32;
                let mut centroid = Vec3::ZERO;
                for &(cx, cy, cz) in &cells {
                    centroid = centroid
                        + Vec3::new(
                            (base.0 + cx as i32) as f32,
                            cy as f32,
                            (base.1 + cz as i32) as f32,
                        ) * inv;
                }
                let fill = kind.water_fill_height().unwrap_or(1.0);
                let surface_y = y as f32 - 0.5 + fill;
                surfaces.push(WaterSurface {
                    block: kind,
                    cells,
                    surface_y,
                    centroid,
                });
            }
        }
    }
    surfaces
}
