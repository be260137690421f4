use fastnoise_lite::{FastNoiseLite, NoiseType};
use lode_blocks::Block;

use crate::worldgen::{Mode, WorldGenConfig};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorldGenMode {
    Normal,
    Flat { thickness: i32 },
}

/// Shared, immutable world definition. Noise state is per-sampler (see
/// [`WorldGen::height_sampler`]) so worker threads never share noise objects.
pub struct WorldGen {
    pub chunk_size: usize,
    pub seed: i32,
    pub mode: WorldGenMode,
    pub height: crate::worldgen::Height,
    pub surface: crate::worldgen::Surface,
    pub water_level: i32,
    pub trees: crate::worldgen::Trees,
    pub lighting: crate::worldgen::Lighting,
}

impl WorldGen {
    pub fn from_config(cfg: &WorldGenConfig) -> Self {
        let mode = match cfg.mode {
            Mode::Normal => WorldGenMode::Normal,
            Mode::Flat => WorldGenMode::Flat {
                thickness: cfg.flat.thickness,
            },
        };
        Self {
            chunk_size: cfg.chunk_size,
            seed: cfg.seed,
            mode,
            height: cfg.height.clone(),
            surface: cfg.surface.clone(),
            water_level: cfg.water.level,
            trees: cfg.trees.clone(),
            lighting: cfg.lighting.clone(),
        }
    }

    /// Builds a fresh sampler; cheap enough to create per generation job.
    pub fn height_sampler(&self) -> HeightSampler {
        let noise = match self.mode {
            WorldGenMode::Flat { .. } => None,
            WorldGenMode::Normal => {
                let mut n = FastNoiseLite::with_seed(self.seed);
                n.set_noise_type(Some(NoiseType::OpenSimplex2));
                n.set_frequency(Some(self.height.frequency));
                Some(n)
            }
        };
        HeightSampler {
            noise,
            mode: self.mode,
            chunk_size: self.chunk_size,
            offset: self.height.offset,
            scale: self.height.scale,
            shift: self.height.shift,
        }
    }

    /// Band block for a solid cell at absolute height `y`.
    #[inline]
    pub fn surface_block(&self, y: i32) -> Block {
        if y < self.surface.sand_max {
            Block::Sand
        } else if y < self.surface.dirt_max {
            Block::Dirt
        } else {
            Block::Grass
        }
    }

    #[inline]
    pub fn is_flat(&self) -> bool {
        matches!(self.mode, WorldGenMode::Flat { .. })
    }
}

/// 2-D coherent-noise height field: one column height per world (x, z).
pub struct HeightSampler {
    noise: Option<FastNoiseLite>,
    mode: WorldGenMode,
    chunk_size: usize,
    offset: f32,
    scale: f32,
    shift: i32,
}

impl HeightSampler {
    /// Highest solid cell y for the column at world (wx, wz); may be negative,
    /// in which case the column is empty.
    pub fn column_height(&self, wx: i32, wz: i32) -> i32 {
        match self.mode {
            WorldGenMode::Flat { thickness } => thickness - 1,
            WorldGenMode::Normal => {
                let n = self
                    .noise
                    .as_ref()
                    .map(|noise| noise.get_noise_2d(wx as f32, wz as f32))
                    .unwrap_or(0.0);
                ((n + self.offset) * self.scale * self.chunk_size as f32 / 2.0).floor() as i32
                    + self.shift
            }
        }
    }
}
