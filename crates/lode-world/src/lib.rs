//! Procedural world definition: chunk coordinates, height field, trees.
#![forbid(unsafe_code)]

mod chunk_coord;
mod terrain;
mod trees;
pub mod worldgen;

pub use chunk_coord::ChunkCoord;
pub use terrain::{HeightSampler, WorldGen, WorldGenMode};
pub use trees::TreeGenerator;
pub use worldgen::WorldGenConfig;

/// Default chunk edge length in cells; chunks are `CHUNK_SIZE`^3 volumes.
pub const CHUNK_SIZE: usize = 64;
