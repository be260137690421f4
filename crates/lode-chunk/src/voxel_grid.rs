use lode_blocks::Block;

/// Dense cubic block volume. Flattened (z, y, x)-major, x fastest; the same
/// order is used when light volumes are extracted for upload, so the two stay
/// aligned by construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    pub size: usize,
    blocks: Vec<Block>,
}

impl VoxelGrid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            blocks: vec![Block::Air; size * size * size],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.size + y) * self.size + x
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        let s = self.size as i32;
        x >= 0 && x < s && y >= 0 && y < s && z >= 0 && z < s
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, b: Block) {
        let i = self.idx(x, y, z);
        self.blocks[i] = b;
    }

    /// Signed-coordinate lookup; out-of-bounds reads as air.
    #[inline]
    pub fn get_or_air(&self, x: i32, y: i32, z: i32) -> Block {
        if self.in_bounds(x, y, z) {
            self.get(x as usize, y as usize, z as usize)
        } else {
            Block::Air
        }
    }

    /// True iff at least one 6-connected neighbor is air or out of bounds.
    /// Drives surface extraction: buried cells are never meshed.
    pub fn is_exposed(&self, x: usize, y: usize, z: usize) -> bool {
        let (x, y, z) = (x as i32, y as i32, z as i32);
        const N: [(i32, i32, i32); 6] = [
            (1, 0, 0),
            (-1, 0, 0),
            (0, 1, 0),
            (0, -1, 0),
            (0, 0, 1),
            (0, 0, -1),
        ];
        N.iter().any(|&(dx, dy, dz)| {
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);
            !self.in_bounds(nx, ny, nz) || self.get(nx as usize, ny as usize, nz as usize).is_air()
        })
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}
