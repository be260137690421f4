use std::collections::HashSet;

use crate::worldgen::Trees;

/// Deterministic per-chunk tree placement. Trunk and crown cells are kept in
/// persistent sets so regeneration after an edit replays the same trees minus
/// whatever was removed, instead of re-rolling placement.
pub struct TreeGenerator {
    seed: i32,
    params: Trees,
    trunks: HashSet<(usize, usize, usize)>,
    crowns: HashSet<(usize, usize, usize)>,
    crowned: HashSet<(usize, usize)>,
}

impl TreeGenerator {
    pub fn new(seed: i32, params: Trees) -> Self {
        Self {
            seed,
            params,
            trunks: HashSet::new(),
            crowns: HashSet::new(),
            crowned: HashSet::new(),
        }
    }

    /// Rolls tree placement for every column of the chunk. Only the first call
    /// populates the sets; later calls (regeneration after edits) are no-ops so
    /// removed tree cells stay removed.
    ///
    /// `surface` maps local (x, z) to the highest solid cell y, negative when
    /// the column is empty. `base` is the chunk's world-space cell origin, used
    /// to key the hash so placement is stable across reloads.
    pub fn generate<F>(&mut self, size: usize, base: (i32, i32), surface: F)
    where
        F: Fn(usize, usize) -> i32,
    {
        if !self.trunks.is_empty() || !self.crowned.is_empty() {
            return;
        }
        for x in 0..size {
            for z in 0..size {
                let wx = base.0 + x as i32;
                let wz = base.1 + z as i32;
                if rand01(self.seed, wx, wz, 0) >= self.params.probability as f64 {
                    continue;
                }
                let surf = surface(x, z);
                if surf <= self.params.min_surface_y {
                    continue;
                }
                let span = (self.params.trunk_max - self.params.trunk_min + 1).max(1);
                let height = self.params.trunk_min
                    + (rand01(self.seed, wx, wz, 1) * span as f64) as i32;
                self.place_tree(size, x, surf as usize, z, height as usize);
            }
        }
    }

    fn place_tree(&mut self, size: usize, x: usize, surf: usize, z: usize, height: usize) {
        let top = surf + height;
        if top + 2 >= size {
            return;
        }
        for y in surf + 1..=top {
            self.trunks.insert((x, y, z));
        }
        self.crowned.insert((x, z));
        // Hollow leaf shell around the trunk top: squared radius in (2, 4],
        // skipping the trunk column at and below the top.
        let (tx, ty, tz) = (x as i32, top as i32, z as i32);
        for dx in -2i32..=2 {
            for dy in -2i32..=2 {
                for dz in -2i32..=2 {
                    let d2 = dx * dx + dy * dy + dz * dz;
                    if d2 <= 2 || d2 > 4 {
                        continue;
                    }
                    if dx == 0 && dz == 0 && dy <= 0 {
                        continue;
                    }
                    let (cx, cy, cz) = (tx + dx, ty + dy, tz + dz);
                    if cx < 0 || cy < 0 || cz < 0 {
                        continue;
                    }
                    let (cx, cy, cz) = (cx as usize, cy as usize, cz as usize);
                    if cx >= size || cy >= size || cz >= size {
                        continue;
                    }
                    self.crowns.insert((cx, cy, cz));
                }
            }
        }
    }

    #[inline]
    pub fn is_trunk(&self, x: usize, y: usize, z: usize) -> bool {
        self.trunks.contains(&(x, y, z))
    }

    #[inline]
    pub fn is_crown(&self, x: usize, y: usize, z: usize) -> bool {
        self.crowns.contains(&(x, y, z))
    }

    /// Erases one tree cell so regeneration will not bring it back. Returns
    /// true if the cell belonged to a tree.
    pub fn remove_tree_cube_at(&mut self, x: usize, y: usize, z: usize) -> bool {
        self.trunks.remove(&(x, y, z)) || self.crowns.remove(&(x, y, z))
    }

    pub fn trunk_cells(&self) -> impl Iterator<Item = &(usize, usize, usize)> {
        self.trunks.iter()
    }

    pub fn crown_cells(&self) -> impl Iterator<Item = &(usize, usize, usize)> {
        self.crowns.iter()
    }
}

/// Stable per-column random in [0, 1), FNV-1a over (seed, wx, wz, salt).
fn rand01(seed: i32, wx: i32, wz: i32, salt: u64) -> f64 {
    let mut h: u64 = 0xcbf29ce484222325;
    let mut write = |v: u64| {
        h ^= v;
        h = h.wrapping_mul(0x100000001b3);
    };
    write(seed as u32 as u64);
    write(wx as u32 as u64);
    write(wz as u32 as u64);
    write(salt);
    (h >> 11) as f64 / (1u64 << 53) as f64
}
