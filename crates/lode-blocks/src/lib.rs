//! Block type tags and their static properties.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

/// Per-cell block tag. `Air` means "no block".
///
/// Water carries two sub-variants with different fill heights so flowing
/// water renders lower than a source block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    #[default]
    Air,
    Sand,
    Dirt,
    Grass,
    Log,
    Leaves,
    Torch,
    WaterSource,
    WaterFlowing,
}

impl Block {
    /// Every renderable (non-air) block tag, in instanced-draw dispatch order.
    pub const RENDERABLE: [Block; 8] = [
        Block::Sand,
        Block::Dirt,
        Block::Grass,
        Block::Log,
        Block::Leaves,
        Block::Torch,
        Block::WaterSource,
        Block::WaterFlowing,
    ];

    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, Block::Air)
    }

    #[inline]
    pub fn is_water(self) -> bool {
        matches!(self, Block::WaterSource | Block::WaterFlowing)
    }

    /// Occupies its cell for raycast/exposure purposes.
    #[inline]
    pub fn is_solid(self) -> bool {
        !self.is_air()
    }

    /// Light BFS only travels through air; everything else just receives a
    /// face value.
    #[inline]
    pub fn conducts_light(self) -> bool {
        self.is_air()
    }

    /// Emitted light level in [0, 1].
    #[inline]
    pub fn emission(self) -> f32 {
        match self {
            Block::Torch => 1.0,
            _ => 0.0,
        }
    }

    /// Fraction of the cell a water block fills, `None` for non-water.
    #[inline]
    pub fn water_fill_height(self) -> Option<f32> {
        match self {
            Block::WaterSource => Some(1.0),
            Block::WaterFlowing => Some(0.75),
            _ => None,
        }
    }

    /// Stable snake_case name, matching the serde representation used in
    /// config files and log lines.
    pub fn name(self) -> &'static str {
        match self {
            Block::Air => "air",
            Block::Sand => "sand",
            Block::Dirt => "dirt",
            Block::Grass => "grass",
            Block::Log => "log",
            Block::Leaves => "leaves",
            Block::Torch => "torch",
            Block::WaterSource => "water_source",
            Block::WaterFlowing => "water_flowing",
        }
    }
}
