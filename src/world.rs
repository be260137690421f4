use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use lode_blocks::Block;
use lode_chunk::ChunkVoxels;
use lode_geom::{Frustum, Vec3};
use lode_lighting::gather_halo;
use lode_render::{
    ChunkGraphics, GraphicsDevice, RenderResources, RenderableChunk, ShaderSink,
};
use lode_runtime::{ChunkLoader, ChunkUpdater, Runtime};
use lode_world::{ChunkCoord, WorldGen};

use crate::camera::Camera;
use crate::raycast::{RayHit, raycast_first_hit_with_face};

/// Per-tick snapshot of the streaming machinery, for logging and overlays.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamingStats {
    pub loaded: usize,
    pub saved: usize,
    pub updating: usize,
    pub generating: bool,
    pub culled: usize,
}

/// Top-level orchestrator: owns the chunk registry, drives streaming around
/// the camera, dispatches background rebuilds, and issues draw calls.
///
/// Registry invariant: a coordinate lives in at most one of `loaded` and
/// `saved`; `updaters` keys a subset of `loaded`. Chunks are generated once
/// and only ever frozen to `saved`, never destroyed before the world itself.
pub struct World {
    world_gen: Arc<WorldGen>,
    size: usize,
    render_distance: i32,
    runtime: Runtime,
    loader: ChunkLoader,
    loaded: HashMap<ChunkCoord, RenderableChunk>,
    saved: HashMap<ChunkCoord, Arc<Mutex<ChunkVoxels>>>,
    updaters: HashMap<ChunkCoord, ChunkUpdater>,
    resources: RenderResources,
    last_camera_chunk: Option<ChunkCoord>,
    window_dirty: bool,
}

impl World {
    pub fn new(device: &mut dyn GraphicsDevice, world_gen: Arc<WorldGen>, render_distance: i32) -> Self {
        let runtime = Runtime::new(world_gen.clone());
        Self::with_runtime(device, world_gen, render_distance, runtime)
    }

    pub fn with_runtime(
        device: &mut dyn GraphicsDevice,
        world_gen: Arc<WorldGen>,
        render_distance: i32,
        runtime: Runtime,
    ) -> Self {
        let size = world_gen.chunk_size;
        Self {
            world_gen,
            size,
            render_distance,
            runtime,
            loader: ChunkLoader::new(),
            loaded: HashMap::new(),
            saved: HashMap::new(),
            updaters: HashMap::new(),
            resources: RenderResources::create(device),
            last_camera_chunk: None,
            window_dirty: false,
        }
    }

    /// One engine tick: merge finished background work, adjust the streaming
    /// window to the camera, then kick off rebuilds for modified chunks.
    /// Never blocks on a worker.
    pub fn update(&mut self, device: &mut dyn GraphicsDevice, camera_pos: Vec3) {
        self.merge_gen_results(device);
        self.apply_update_results(device);
        self.stream_window(device, camera_pos);
        self.launch_updates();
    }

    fn window_coords(&self, center: ChunkCoord) -> Vec<ChunkCoord> {
        let rd = self.render_distance;
        let mut coords = Vec::with_capacity(((2 * rd + 1) * (2 * rd + 1)) as usize);
        for dx in -rd..=rd {
            for dz in -rd..=rd {
                coords.push(center.offset(dx, dz));
            }
        }
        coords
    }

    fn in_window(&self, coord: ChunkCoord, center: ChunkCoord) -> bool {
        (coord.cx - center.cx).abs() <= self.render_distance
            && (coord.cz - center.cz).abs() <= self.render_distance
    }

    fn stream_window(&mut self, device: &mut dyn GraphicsDevice, camera_pos: Vec3) {
        let cam = ChunkCoord::of_world(
            camera_pos.x.floor() as i32,
            camera_pos.z.floor() as i32,
            self.size,
        );
        if self.last_camera_chunk != Some(cam) {
            self.last_camera_chunk = Some(cam);
            self.window_dirty = true;
            // Promote frozen chunks re-entering the window: CPU state is
            // preserved verbatim, GPU state is rebuilt by the next update.
            for coord in self.window_coords(cam) {
                if let Some(chunk) = self.saved.remove(&coord) {
                    chunk.lock().unwrap().mark_modified();
                    self.loaded.insert(
                        coord,
                        RenderableChunk::new(
                            chunk,
                            ChunkGraphics::empty(),
                            Vec::new(),
                            coord,
                            self.size,
                        ),
                    );
                    self.updaters.insert(coord, ChunkUpdater::new(coord));
                }
            }
        }
        // A batch launch refused while another was in flight is retried once
        // the runway clears, so window holes self-correct.
        if self.window_dirty && !self.loader.is_generating() {
            let missing: Vec<ChunkCoord> = self
                .window_coords(cam)
                .into_iter()
                .filter(|c| !self.loaded.contains_key(c) && !self.saved.contains_key(c))
                .collect();
            if missing.is_empty() {
                self.window_dirty = false;
            } else if let Some(job_id) = self.loader.launch_generation(&self.runtime, missing) {
                log::debug!("launched generation batch {job_id}");
                self.window_dirty = false;
            }
        }
        // Evict chunks that left the window, deferring any with a rebuild in
        // flight to a later tick.
        let evict: Vec<ChunkCoord> = self
            .loaded
            .keys()
            .filter(|&&c| !self.in_window(c, cam))
            .filter(|c| !self.updaters.get(*c).is_some_and(|u| u.is_updating()))
            .copied()
            .collect();
        for coord in evict {
            if let Some(mut rc) = self.loaded.remove(&coord) {
                rc.graphics.dispose(device);
                self.updaters.remove(&coord);
                self.saved.insert(coord, rc.chunk);
                log::trace!("froze chunk ({}, {})", coord.cx, coord.cz);
            }
        }
    }

    fn merge_gen_results(&mut self, device: &mut dyn GraphicsDevice) {
        for res in self.runtime.drain_gen_results() {
            self.loader.complete(res.job_id);
            let count = res.chunks.len();
            for gc in res.chunks {
                let coord = gc.voxels.coord;
                if self.loaded.contains_key(&coord) || self.saved.contains_key(&coord) {
                    continue;
                }
                let base = coord.world_base(self.size);
                let graphics = ChunkGraphics::upload(device, &gc.data, &gc.water, base);
                let chunk = Arc::new(Mutex::new(gc.voxels));
                // The batch was built without halos; relight both sides of
                // every seam that now has two loaded chunks.
                let mut has_neighbor = false;
                for n in coord.neighbors8() {
                    if let Some(rc) = self.loaded.get(&n) {
                        rc.chunk.lock().unwrap().mark_modified();
                        has_neighbor = true;
                    }
                }
                if has_neighbor {
                    chunk.lock().unwrap().mark_modified();
                }
                self.loaded.insert(
                    coord,
                    RenderableChunk::new(chunk, graphics, gc.water, coord, self.size),
                );
                self.updaters.insert(coord, ChunkUpdater::new(coord));
            }
            log::debug!(
                "merged generation batch {} ({count} chunks, {} ms, gen {} ms)",
                res.job_id,
                res.t_total_ms,
                res.t_gen_ms
            );
        }
    }

    fn apply_update_results(&mut self, device: &mut dyn GraphicsDevice) {
        for res in self.runtime.drain_update_results() {
            if let Some(u) = self.updaters.get_mut(&res.coord) {
                u.complete();
            }
            let Some(rc) = self.loaded.get_mut(&res.coord) else {
                continue;
            };
            let base = res.coord.world_base(self.size);
            rc.graphics.apply(device, &res.data, &res.water, base);
            rc.chunk.lock().unwrap().complete_apply(res.data.rev);
            rc.water = res.water;
            log::trace!(
                "applied rebuild of ({}, {}) in {} ms (mesh {} ms, light {} ms)",
                res.coord.cx,
                res.coord.cz,
                res.t_total_ms,
                res.data.t_mesh_ms,
                res.data.t_light_ms
            );
        }
    }

    fn launch_updates(&mut self) {
        let coords: Vec<ChunkCoord> = self.loaded.keys().copied().collect();
        for coord in coords {
            let Some(rc) = self.loaded.get(&coord) else {
                continue;
            };
            if !rc.chunk.lock().unwrap().is_modified() {
                continue;
            }
            let Some(updater) = self.updaters.get_mut(&coord) else {
                continue;
            };
            if updater.is_updating() {
                continue;
            }
            let loaded = &self.loaded;
            let saved = &self.saved;
            let halo = gather_halo(coord, self.size, |c| {
                loaded
                    .get(&c)
                    .map(|r| r.chunk.clone())
                    .or_else(|| saved.get(&c).cloned())
            });
            updater.launch_update(&self.runtime, rc.chunk.clone(), halo);
        }
    }

    /// Frustum-tests every loaded chunk once; culled chunks keep updating in
    /// the background but skip draw calls.
    pub fn cull(&mut self, frustum: &Frustum) {
        for rc in self.loaded.values_mut() {
            rc.update_culled(frustum);
        }
    }

    /// Draws all visible chunks: opaque instanced cubes grouped by type,
    /// then water surfaces back to front.
    pub fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        shader: &mut dyn ShaderSink,
        camera: &Camera,
    ) {
        shader.set_mat4("view", &camera.view_matrix());
        shader.set_mat4("projection", &camera.projection_matrix());
        shader.set_vec3("camera_pos", camera.position);
        for rc in self.loaded.values() {
            if rc.culled {
                continue;
            }
            let (bx, bz) = rc.coord.world_base(self.size);
            shader.set_vec3("chunk_origin", Vec3::new(bx as f32, 0.0, bz as f32));
            for &block in &Block::RENDERABLE {
                rc.graphics.render_by_type(device, shader, &self.resources, block);
            }
        }
        for rc in self.loaded.values() {
            if !rc.culled {
                rc.graphics.render_water(device, shader, camera.position);
            }
        }
    }

    fn occupancy_at(&self, wx: i32, wy: i32, wz: i32) -> bool {
        if wy < 0 || wy >= self.size as i32 {
            return false;
        }
        let coord = ChunkCoord::of_world(wx, wz, self.size);
        let (lx, lz) = ChunkCoord::local_of_world(wx, wz, self.size);
        let chunk = self
            .loaded
            .get(&coord)
            .map(|r| &r.chunk)
            .or_else(|| self.saved.get(&coord));
        match chunk {
            Some(c) => c.lock().unwrap().is_solid_at(lx, wy as usize, lz),
            // Not streamed in yet: the ray passes through.
            None => false,
        }
    }

    fn raycast(&self, camera: &Camera, max_dist: f32) -> Option<RayHit> {
        raycast_first_hit_with_face(
            camera.position,
            camera.forward(),
            max_dist,
            |x, y, z| self.occupancy_at(x, y, z),
        )
    }

    /// Places `block` against the face the camera is looking at. False when
    /// nothing is hit or the target cell is occupied or unloaded.
    pub fn add_cube_from_raycast(&mut self, camera: &Camera, max_dist: f32, block: Block) -> bool {
        let Some(hit) = self.raycast(camera, max_dist) else {
            return false;
        };
        self.edit_at(hit.bx + hit.nx, hit.by + hit.ny, hit.bz + hit.nz, Some(block))
    }

    /// Removes the block the camera is looking at.
    pub fn remove_cube_from_raycast(&mut self, camera: &Camera, max_dist: f32) -> bool {
        let Some(hit) = self.raycast(camera, max_dist) else {
            return false;
        };
        self.edit_at(hit.bx, hit.by, hit.bz, None)
    }

    fn edit_at(&mut self, wx: i32, wy: i32, wz: i32, block: Option<Block>) -> bool {
        if wy < 0 || wy >= self.size as i32 {
            return false;
        }
        let coord = ChunkCoord::of_world(wx, wz, self.size);
        let (lx, lz) = ChunkCoord::local_of_world(wx, wz, self.size);
        let Some(chunk) = self
            .loaded
            .get(&coord)
            .map(|r| r.chunk.clone())
            .or_else(|| self.saved.get(&coord).cloned())
        else {
            return false;
        };
        let ok = {
            let mut guard = chunk.lock().unwrap();
            match block {
                Some(b) => guard.add_cube(lx as i32, wy, lz as i32, b),
                None => guard.remove_cube(lx as i32, wy, lz as i32),
            }
        };
        if ok {
            self.mark_seam_neighbors(coord, lx, lz);
            log::debug!(
                "{} cube at ({wx}, {wy}, {wz})",
                if block.is_some() { "added" } else { "removed" }
            );
        }
        ok
    }

    /// An edit on a border cell changes the halo its neighbors see.
    fn mark_seam_neighbors(&mut self, coord: ChunkCoord, lx: usize, lz: usize) {
        let last = self.size - 1;
        let dxs: &[i32] = match lx {
            0 => &[-1, 0],
            x if x == last => &[0, 1],
            _ => &[0],
        };
        let dzs: &[i32] = match lz {
            0 => &[-1, 0],
            z if z == last => &[0, 1],
            _ => &[0],
        };
        for &dx in dxs {
            for &dz in dzs {
                if dx == 0 && dz == 0 {
                    continue;
                }
                if let Some(rc) = self.loaded.get(&coord.offset(dx, dz)) {
                    rc.chunk.lock().unwrap().mark_modified();
                }
            }
        }
    }

    /// World-space block lookup across loaded and frozen chunks.
    pub fn block_at_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        if wy < 0 || wy >= self.size as i32 {
            return None;
        }
        let coord = ChunkCoord::of_world(wx, wz, self.size);
        let (lx, lz) = ChunkCoord::local_of_world(wx, wz, self.size);
        self.loaded
            .get(&coord)
            .map(|r| &r.chunk)
            .or_else(|| self.saved.get(&coord))
            .map(|c| c.lock().unwrap().block_at(lx, wy as usize, lz))
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.contains_key(&coord)
    }

    pub fn is_saved(&self, coord: ChunkCoord) -> bool {
        self.saved.contains_key(&coord)
    }

    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        self.loaded.keys().copied().collect()
    }

    pub fn saved_coords(&self) -> Vec<ChunkCoord> {
        self.saved.keys().copied().collect()
    }

    pub fn world_gen(&self) -> &WorldGen {
        &self.world_gen
    }

    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            loaded: self.loaded.len(),
            saved: self.saved.len(),
            updating: self.updaters.values().filter(|u| u.is_updating()).count(),
            generating: self.loader.is_generating(),
            culled: self.loaded.values().filter(|rc| rc.culled).count(),
        }
    }

    /// Releases every GPU handle, consuming the world. Must run on the
    /// context thread.
    pub fn dispose(mut self, device: &mut dyn GraphicsDevice) {
        for rc in self.loaded.values_mut() {
            rc.graphics.dispose(device);
        }
        self.resources.dispose(device);
    }
}
