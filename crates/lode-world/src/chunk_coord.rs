use serde::{Deserialize, Serialize};

/// Identifies one chunk in the 2-D chunk grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Chunk owning the given world cell, via floor division.
    #[inline]
    pub fn of_world(wx: i32, wz: i32, chunk_size: usize) -> Self {
        let s = chunk_size as i32;
        Self {
            cx: wx.div_euclid(s),
            cz: wz.div_euclid(s),
        }
    }

    /// Chunk-local cell index of a world coordinate (negative-safe modulo).
    #[inline]
    pub fn local_of_world(wx: i32, wz: i32, chunk_size: usize) -> (usize, usize) {
        let s = chunk_size as i32;
        (wx.rem_euclid(s) as usize, wz.rem_euclid(s) as usize)
    }

    /// World-space origin of this chunk.
    #[inline]
    pub fn world_base(self, chunk_size: usize) -> (i32, i32) {
        let s = chunk_size as i32;
        (self.cx * s, self.cz * s)
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    /// The eight surrounding coordinates, axis-aligned first.
    pub fn neighbors8(self) -> [ChunkCoord; 8] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
            self.offset(1, 1),
            self.offset(1, -1),
            self.offset(-1, 1),
            self.offset(-1, -1),
        ]
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_division_handles_negatives() {
        assert_eq!(ChunkCoord::of_world(0, 0, 64), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::of_world(63, 63, 64), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::of_world(64, 0, 64), ChunkCoord::new(1, 0));
        assert_eq!(ChunkCoord::of_world(-1, -64, 64), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::of_world(-65, 0, 64), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn local_index_is_negative_safe() {
        assert_eq!(ChunkCoord::local_of_world(-1, -64, 64), (63, 0));
        assert_eq!(ChunkCoord::local_of_world(65, -65, 64), (1, 63));
    }

    #[test]
    fn base_and_local_recompose_world() {
        for &(wx, wz) in &[(0, 0), (-1, -1), (200, -137), (-4096, 63)] {
            let c = ChunkCoord::of_world(wx, wz, 64);
            let (bx, bz) = c.world_base(64);
            let (lx, lz) = ChunkCoord::local_of_world(wx, wz, 64);
            assert_eq!(bx + lx as i32, wx);
            assert_eq!(bz + lz as i32, wz);
        }
    }
}
