use std::sync::{Arc, Mutex};

use lode_chunk::ChunkVoxels;
use lode_lighting::NeighborHalo;
use lode_world::ChunkCoord;

use crate::{Runtime, UpdateJob};

/// Per-chunk rebuild guard: at most one recompute in flight per chunk.
/// Eviction of the chunk must be deferred while `is_updating` is true so the
/// worker's target is never torn down under it.
pub struct ChunkUpdater {
    coord: ChunkCoord,
    in_flight: bool,
}

impl ChunkUpdater {
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            in_flight: false,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn is_updating(&self) -> bool {
        self.in_flight
    }

    /// Submits a rebuild unless one is already running for this chunk.
    pub fn launch_update(
        &mut self,
        rt: &Runtime,
        chunk: Arc<Mutex<ChunkVoxels>>,
        halo: NeighborHalo,
    ) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        rt.submit_update(UpdateJob {
            coord: self.coord,
            chunk,
            halo,
        });
        true
    }

    /// Called once the rebuild's result has been applied on the main thread.
    pub fn complete(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lode_chunk::generate_chunk;
    use lode_world::{WorldGen, WorldGenConfig};

    #[test]
    fn overlapping_launches_are_refused() {
        let wg = Arc::new(WorldGen::from_config(&WorldGenConfig::default()));
        let rt = Runtime::with_workers(wg.clone(), 1);
        let coord = ChunkCoord::new(0, 0);
        let chunk = Arc::new(Mutex::new(generate_chunk(&wg, coord)));
        let mut updater = ChunkUpdater::new(coord);
        assert!(updater.launch_update(&rt, chunk.clone(), NeighborHalo::empty()));
        assert!(updater.is_updating());
        assert!(!updater.launch_update(&rt, chunk, NeighborHalo::empty()));
        updater.complete();
        assert!(!updater.is_updating());
    }
}
