use lode_world::ChunkCoord;

use crate::{GenJob, Runtime};

/// Guard for the single in-flight streaming generation batch. The world asks
/// it to launch a batch when the camera crosses a chunk border; a request
/// while one is already running is refused and retried on a later tick.
pub struct ChunkLoader {
    next_job_id: u64,
    in_flight: Option<u64>,
}

impl ChunkLoader {
    pub fn new() -> Self {
        Self {
            next_job_id: 1,
            in_flight: None,
        }
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Submits a generation batch unless one is already running. Returns the
    /// job id on success.
    pub fn launch_generation(&mut self, rt: &Runtime, coords: Vec<ChunkCoord>) -> Option<u64> {
        if self.in_flight.is_some() || coords.is_empty() {
            return None;
        }
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        self.in_flight = Some(job_id);
        rt.submit_gen(GenJob { coords, job_id });
        Some(job_id)
    }

    /// Marks a batch finished. Results from a stale id are still merged by
    /// the caller; they only clear the guard if they are the current batch.
    pub fn complete(&mut self, job_id: u64) {
        if self.in_flight == Some(job_id) {
            self.in_flight = None;
        }
    }
}

impl Default for ChunkLoader {
    fn default() -> Self {
        Self::new()
    }
}
