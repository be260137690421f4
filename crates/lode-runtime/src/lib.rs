//! Background job queues for chunk generation and rebuilds.
#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, select, unbounded};
use lode_chunk::{ChunkVoxels, generate_chunk};
use lode_lighting::{LightParams, NeighborHalo};
use lode_mesh::{CubeData, WaterSurface, build_cube_data, build_water_surfaces};
use lode_world::{ChunkCoord, WorldGen};
use rayon::ThreadPoolBuilder;

mod loader;
mod updater;

pub use loader::ChunkLoader;
pub use updater::ChunkUpdater;

/// Batch generation request: the streaming window coordinates that are not
/// yet present. One batch is in flight at a time (see [`ChunkLoader`]).
pub struct GenJob {
    pub coords: Vec<ChunkCoord>,
    pub job_id: u64,
}

/// One freshly generated chunk plus its first mesh and light build, computed
/// without neighbor halos; seams are corrected by the relight pass the
/// orchestrator schedules after merging.
pub struct GeneratedChunk {
    pub voxels: ChunkVoxels,
    pub data: CubeData,
    pub water: Vec<WaterSurface>,
}

pub struct GenResult {
    pub chunks: Vec<GeneratedChunk>,
    pub job_id: u64,
    pub t_gen_ms: u32,
    pub t_total_ms: u32,
}

/// Rebuild request for one loaded chunk. The snapshot is taken on the worker
/// under the chunk's own lock; edits racing with the snapshot simply leave
/// the chunk modified for the next cycle.
pub struct UpdateJob {
    pub coord: ChunkCoord,
    pub chunk: Arc<Mutex<ChunkVoxels>>,
    pub halo: NeighborHalo,
}

pub struct UpdateResult {
    pub coord: ChunkCoord,
    pub data: CubeData,
    pub water: Vec<WaterSurface>,
    pub t_total_ms: u32,
}

/// Worker pool plus the four queue endpoints. Workers prefer rebuild jobs
/// (edit latency) over generation batches, and drain both lanes to
/// completion before shutting down when the senders drop.
pub struct Runtime {
    gen_tx: Sender<GenJob>,
    gen_res_rx: Receiver<GenResult>,
    upd_tx: Sender<UpdateJob>,
    upd_res_rx: Receiver<UpdateResult>,
    q_gen: Arc<AtomicUsize>,
    q_upd: Arc<AtomicUsize>,
    pub workers: usize,
    _pool: Arc<rayon::ThreadPool>,
}

impl Runtime {
    pub fn new(world_gen: Arc<WorldGen>) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .saturating_sub(1)
            .max(1);
        Self::with_workers(world_gen, workers)
    }

    pub fn with_workers(world_gen: Arc<WorldGen>, workers: usize) -> Self {
        let (gen_tx, gen_rx) = unbounded::<GenJob>();
        let (gen_res_tx, gen_res_rx) = unbounded::<GenResult>();
        let (upd_tx, upd_rx) = unbounded::<UpdateJob>();
        let (upd_res_tx, upd_res_rx) = unbounded::<UpdateResult>();
        let q_gen = Arc::new(AtomicUsize::new(0));
        let q_upd = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("lode-worker-{i}"))
                .build()
                .expect("worker pool"),
        );
        for _ in 0..workers {
            let gen_rx = gen_rx.clone();
            let gen_res_tx = gen_res_tx.clone();
            let upd_rx = upd_rx.clone();
            let upd_res_tx = upd_res_tx.clone();
            let world_gen = world_gen.clone();
            let q_gen = q_gen.clone();
            let q_upd = q_upd.clone();
            pool.spawn(move || {
                loop {
                    // Rebuilds first: they answer visible edits.
                    if let Ok(job) = upd_rx.try_recv() {
                        q_upd.fetch_sub(1, Ordering::Relaxed);
                        process_update(job, &world_gen, &upd_res_tx);
                        continue;
                    }
                    select! {
                        recv(upd_rx) -> job => match job {
                            Ok(job) => {
                                q_upd.fetch_sub(1, Ordering::Relaxed);
                                process_update(job, &world_gen, &upd_res_tx);
                            }
                            Err(_) => break,
                        },
                        recv(gen_rx) -> job => match job {
                            Ok(job) => {
                                q_gen.fetch_sub(1, Ordering::Relaxed);
                                process_gen(job, &world_gen, &gen_res_tx);
                            }
                            Err(_) => break,
                        },
                    }
                }
            });
        }
        Self {
            gen_tx,
            gen_res_rx,
            upd_tx,
            upd_res_rx,
            q_gen,
            q_upd,
            workers,
            _pool: pool,
        }
    }

    pub fn submit_gen(&self, job: GenJob) {
        self.q_gen.fetch_add(1, Ordering::Relaxed);
        let _ = self.gen_tx.send(job);
    }

    pub fn submit_update(&self, job: UpdateJob) {
        self.q_upd.fetch_add(1, Ordering::Relaxed);
        let _ = self.upd_tx.send(job);
    }

    /// Non-blocking drain of finished generation batches.
    pub fn drain_gen_results(&self) -> Vec<GenResult> {
        self.gen_res_rx.try_iter().collect()
    }

    /// Non-blocking drain of finished rebuilds.
    pub fn drain_update_results(&self) -> Vec<UpdateResult> {
        self.upd_res_rx.try_iter().collect()
    }

    pub fn queued_gen(&self) -> usize {
        self.q_gen.load(Ordering::Relaxed)
    }

    pub fn queued_updates(&self) -> usize {
        self.q_upd.load(Ordering::Relaxed)
    }
}

fn process_gen(job: GenJob, world_gen: &WorldGen, tx: &Sender<GenResult>) {
    let t0 = Instant::now();
    let params = LightParams::from(&world_gen.lighting);
    let mut chunks = Vec::with_capacity(job.coords.len());
    let mut t_gen_ms = 0u32;
    for coord in job.coords {
        let tg = Instant::now();
        let voxels = generate_chunk(world_gen, coord);
        t_gen_ms = t_gen_ms.saturating_add(tg.elapsed().as_millis().min(u128::from(u32::MAX)) as u32);
        let snap = voxels.snapshot();
        let data = build_cube_data(&snap, &NeighborHalo::empty(), params);
        let base = coord.world_base(world_gen.chunk_size);
        let water = build_water_surfaces(&snap.grid, base, world_gen.water_level);
        chunks.push(GeneratedChunk {
            voxels,
            data,
            water,
        });
    }
    let t_total_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    let _ = tx.send(GenResult {
        chunks,
        job_id: job.job_id,
        t_gen_ms,
        t_total_ms,
    });
}

fn process_update(job: UpdateJob, world_gen: &WorldGen, tx: &Sender<UpdateResult>) {
    let t0 = Instant::now();
    let params = LightParams::from(&world_gen.lighting);
    let snap = {
        let guard = job.chunk.lock().unwrap();
        guard.snapshot()
    };
    let data = build_cube_data(&snap, &job.halo, params);
    let base = job.coord.world_base(world_gen.chunk_size);
    let water = build_water_surfaces(&snap.grid, base, world_gen.water_level);
    let t_total_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
    let _ = tx.send(UpdateResult {
        coord: job.coord,
        data,
        water,
        t_total_ms,
    });
}
