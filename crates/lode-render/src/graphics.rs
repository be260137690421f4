use std::collections::HashMap;

use lode_blocks::Block;
use lode_geom::Vec3;
use lode_mesh::{CubeData, WaterSurface};

use crate::{BufferId, GeometryId, GraphicsDevice, ShaderSink, TextureId};

/// GPU assets shared by every chunk: the single unit-cube geometry all
/// instanced draws reference.
pub struct RenderResources {
    pub cube: GeometryId,
}

impl RenderResources {
    pub fn create(device: &mut dyn GraphicsDevice) -> Self {
        Self {
            cube: device.create_cube_geometry(),
        }
    }

    pub fn dispose(self, device: &mut dyn GraphicsDevice) {
        device.dispose_geometry(self.cube);
    }
}

struct WaterMesh {
    buffer: BufferId,
    vertex_count: usize,
    block: Block,
    centroid: Vec3,
}

/// GPU-side state of one chunk: per-block-type instance buffers, the 3-D
/// light texture, and one vertex buffer per water surface. Holds no voxel
/// logic; it only uploads what the mesh crate computed and draws it.
pub struct ChunkGraphics {
    instances: HashMap<Block, (BufferId, usize)>,
    light: Option<TextureId>,
    water: Vec<WaterMesh>,
}

impl ChunkGraphics {
    /// No uploaded state yet. Used when a saved chunk is promoted back into
    /// the loaded set: it draws nothing until its first rebuild lands.
    pub fn empty() -> Self {
        Self {
            instances: HashMap::new(),
            light: None,
            water: Vec::new(),
        }
    }

    pub fn upload(
        device: &mut dyn GraphicsDevice,
        data: &CubeData,
        water: &[WaterSurface],
        base: (i32, i32),
    ) -> Self {
        let mut instances = HashMap::new();
        for (&block, transforms) in &data.instances {
            if transforms.is_empty() {
                continue;
            }
            let buf = device.create_instance_buffer(transforms);
            instances.insert(block, (buf, transforms.len()));
        }
        let light = Some(device.create_light_texture(data.light.size, data.light.samples()));
        let water = water
            .iter()
            .filter(|s| !s.cells.is_empty())
            .map(|s| {
                let verts = water_surface_vertices(s, base);
                WaterMesh {
                    buffer: device.create_vertex_buffer(&verts),
                    vertex_count: verts.len() / 3,
                    block: s.block,
                    centroid: s.centroid,
                }
            })
            .collect();
        Self {
            instances,
            light,
            water,
        }
    }

    /// Replaces all uploaded state with a fresh rebuild result, releasing the
    /// previous buffers first.
    pub fn apply(
        &mut self,
        device: &mut dyn GraphicsDevice,
        data: &CubeData,
        water: &[WaterSurface],
        base: (i32, i32),
    ) {
        self.dispose(device);
        *self = Self::upload(device, data, water, base);
    }

    /// Instanced draw of every cube of `block`. No-op when the chunk has no
    /// instances of that type.
    pub fn render_by_type(
        &self,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderSink,
        resources: &RenderResources,
        block: Block,
    ) {
        let Some(&(buffer, count)) = self.instances.get(&block) else {
            return;
        };
        if let Some(tex) = self.light {
            shader.set_texture("light_volume", tex);
        }
        shader.set_i32("block_type", block as i32);
        device.draw_instanced(resources.cube, buffer, count);
    }

    /// Draws every water surface of the chunk, farthest centroid first so
    /// transparency composes correctly.
    pub fn render_water(
        &self,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderSink,
        eye: Vec3,
    ) {
        let mut order: Vec<&WaterMesh> = self.water.iter().collect();
        order.sort_by(|a, b| {
            let da = (a.centroid - eye).length_sq();
            let db = (b.centroid - eye).length_sq();
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });
        for mesh in order {
            shader.set_f32("fill_height", mesh.block.water_fill_height().unwrap_or(1.0));
            device.draw_triangles(mesh.buffer, mesh.vertex_count);
        }
    }

    pub fn has_instances_of(&self, block: Block) -> bool {
        self.instances.contains_key(&block)
    }

    pub fn water_surface_count(&self) -> usize {
        self.water.len()
    }

    /// Releases every GPU handle. Must run on the context thread before the
    /// chunk is demoted or the graphics object dropped.
    pub fn dispose(&mut self, device: &mut dyn GraphicsDevice) {
        for (_, (buf, _)) in self.instances.drain() {
            device.dispose_buffer(buf);
        }
        if let Some(tex) = self.light.take() {
            device.dispose_texture(tex);
        }
        for mesh in self.water.drain(..) {
            device.dispose_buffer(mesh.buffer);
        }
    }
}

/// Two triangles per covered cell, lying flat at the surface height.
fn water_surface_vertices(surface: &WaterSurface, base: (i32, i32)) -> Vec<f32> {
    let mut verts = Vec::with_capacity(surface.cells.len() * 18);
    let y = surface.surface_y;
    for &(x, _, z) in &surface.cells {
        let wx = (base.0 + x as i32) as f32;
        let wz = (base.1 + z as i32) as f32;
        let (x0, x1) = (wx - 0.5, wx + 0.5);
        let (z0, z1) = (wz - 0.5, wz + 0.5);
        let quad = [
            [x0, y, z0],
            [x1, y, z0],
            [x1, y, z1],
            [x0, y, z0],
            [x1, y, z1],
            [x0, y, z1],
        ];
        for v in quad {
            verts.extend_from_slice(&v);
        }
    }
    verts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingDevice;
    use lode_chunk::{ChunkSnapshot, VoxelGrid};
    use lode_lighting::{LightParams, NeighborHalo};
    use lode_mesh::{build_cube_data, build_water_surfaces};
    use lode_world::ChunkCoord;
    use std::collections::HashSet;

    fn sample_data() -> (CubeData, Vec<WaterSurface>) {
        let mut grid = VoxelGrid::new(4);
        grid.set(0, 0, 0, Block::Dirt);
        grid.set(1, 0, 0, Block::Grass);
        grid.set(2, 0, 0, Block::Grass);
        let snap = ChunkSnapshot {
            coord: ChunkCoord::new(0, 0),
            grid,
            torches: HashSet::new(),
            rev: 0,
        };
        let data = build_cube_data(&snap, &NeighborHalo::empty(), LightParams::default());
        let water = build_water_surfaces(&snap.grid, (0, 0), 2);
        (data, water)
    }

    #[test]
    fn upload_creates_one_buffer_per_block_type() {
        let mut dev = RecordingDevice::new();
        let (data, water) = sample_data();
        let gfx = ChunkGraphics::upload(&mut dev, &data, &water, (0, 0));
        assert!(gfx.has_instances_of(Block::Dirt));
        assert!(gfx.has_instances_of(Block::Grass));
        assert!(!gfx.has_instances_of(Block::Sand));
        assert_eq!(gfx.water_surface_count(), 1);
        assert_eq!(dev.live_textures(), 1);
        // dirt + grass instance buffers, one water vertex buffer
        assert_eq!(dev.live_buffers(), 3);
    }

    #[test]
    fn dispose_releases_everything() {
        let mut dev = RecordingDevice::new();
        let (data, water) = sample_data();
        let mut gfx = ChunkGraphics::upload(&mut dev, &data, &water, (0, 0));
        gfx.dispose(&mut dev);
        assert_eq!(dev.live_buffers(), 0);
        assert_eq!(dev.live_textures(), 0);
    }

    #[test]
    fn apply_swaps_buffers_without_leaking() {
        let mut dev = RecordingDevice::new();
        let (data, water) = sample_data();
        let mut gfx = ChunkGraphics::upload(&mut dev, &data, &water, (0, 0));
        let before = dev.live_buffers() + dev.live_textures();
        gfx.apply(&mut dev, &data, &water, (0, 0));
        assert_eq!(dev.live_buffers() + dev.live_textures(), before);
        gfx.dispose(&mut dev);
        assert_eq!(dev.live_buffers() + dev.live_textures(), 0);
    }

    #[test]
    fn render_by_type_draws_only_present_types() {
        let mut dev = RecordingDevice::new();
        let resources = RenderResources::create(&mut dev);
        let (data, water) = sample_data();
        let gfx = ChunkGraphics::upload(&mut dev, &data, &water, (0, 0));
        let mut shader = crate::RecordingShader::new();
        gfx.render_by_type(&mut dev, &mut shader, &resources, Block::Grass);
        gfx.render_by_type(&mut dev, &mut shader, &resources, Block::Torch);
        assert_eq!(dev.instanced_draws(), 1);
    }

    #[test]
    fn water_sorts_far_to_near() {
        let mut dev = RecordingDevice::new();
        let mut grid = VoxelGrid::new(8);
        grid.set(0, 1, 0, Block::WaterSource);
        grid.set(7, 1, 7, Block::WaterSource);
        let water = build_water_surfaces(&grid, (0, 0), -1);
        assert_eq!(water.len(), 2);
        let snap = ChunkSnapshot {
            coord: ChunkCoord::new(0, 0),
            grid,
            torches: HashSet::new(),
            rev: 0,
        };
        let data = build_cube_data(&snap, &NeighborHalo::empty(), LightParams::default());
        let gfx = ChunkGraphics::upload(&mut dev, &data, &water, (0, 0));
        let mut shader = crate::RecordingShader::new();
        gfx.render_water(&mut dev, &mut shader, Vec3::ZERO);
        // Upload creates vertex buffers in surface order; the flood fill
        // finds (0,1,0) before (7,1,7), and the draw must reverse that for
        // an eye at the origin.
        let created = dev.vertex_buffers_created();
        let draws = dev.triangle_draw_buffers();
        assert_eq!(draws, vec![created[1], created[0]]);
    }
}
