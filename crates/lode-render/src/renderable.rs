use std::sync::{Arc, Mutex};

use lode_chunk::ChunkVoxels;
use lode_geom::{Aabb, Frustum, Vec3};
use lode_mesh::WaterSurface;
use lode_world::ChunkCoord;

use crate::ChunkGraphics;

/// The unit the engine streams, culls, and draws: CPU voxels behind their
/// lock, the uploaded GPU state, and the water surfaces of the last rebuild.
pub struct RenderableChunk {
    pub coord: ChunkCoord,
    pub chunk: Arc<Mutex<ChunkVoxels>>,
    pub graphics: ChunkGraphics,
    pub water: Vec<WaterSurface>,
    pub bbox: Aabb,
    pub culled: bool,
}

impl RenderableChunk {
    pub fn new(
        chunk: Arc<Mutex<ChunkVoxels>>,
        graphics: ChunkGraphics,
        water: Vec<WaterSurface>,
        coord: ChunkCoord,
        size: usize,
    ) -> Self {
        Self {
            coord,
            chunk,
            graphics,
            water,
            bbox: chunk_bounds(coord, size),
            culled: false,
        }
    }

    /// Per-frame frustum test; culled chunks skip draw calls but still get
    /// their background rebuild cycle.
    pub fn update_culled(&mut self, frustum: &Frustum) {
        self.culled = !frustum.contains_bounding_box(&self.bbox);
    }
}

/// World-space bounds of a chunk; cubes are unit-sized and centered on their
/// cell coordinates, so the box extends half a cell past the cell range.
pub fn chunk_bounds(coord: ChunkCoord, size: usize) -> Aabb {
    let (bx, bz) = coord.world_base(size);
    let s = size as f32;
    let min = Vec3::new(bx as f32 - 0.5, -0.5, bz as f32 - 0.5);
    Aabb::new(min, min + Vec3::new(s, s, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_the_cell_centers() {
        let bb = chunk_bounds(ChunkCoord::new(-1, 2), 64);
        assert!(bb.contains_point(Vec3::new(-64.0, 0.0, 128.0)));
        assert!(bb.contains_point(Vec3::new(-1.0, 63.0, 191.0)));
        assert!(!bb.contains_point(Vec3::new(0.5, 0.0, 128.0)));
    }
}
