use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

/// World generation parameters, loadable from a toml file. Every field has a
/// default so a partial (or missing) file still yields a usable config.
#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub water: Water,
    #[serde(default)]
    pub trees: Trees,
    #[serde(default)]
    pub lighting: Lighting,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            chunk_size: default_chunk_size(),
            mode: Mode::Normal,
            flat: Flat::default(),
            height: Height::default(),
            surface: Surface::default(),
            water: Water::default(),
            trees: Trees::default(),
            lighting: Lighting::default(),
        }
    }
}

impl WorldGenConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        let cfg: WorldGenConfig = toml::from_str(&text)?;
        Ok(cfg)
    }
}

fn default_seed() -> i32 {
    1337
}
fn default_chunk_size() -> usize {
    crate::CHUNK_SIZE
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Flat,
}
fn default_mode() -> Mode {
    Mode::Normal
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    #[serde(default = "default_flat_thickness")]
    pub thickness: i32,
}
fn default_flat_thickness() -> i32 {
    2
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            thickness: default_flat_thickness(),
        }
    }
}

/// Column height mapping: `floor((noise + offset) * scale * size / 2) + shift`.
#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_height_offset")]
    pub offset: f32,
    #[serde(default = "default_height_scale")]
    pub scale: f32,
    #[serde(default = "default_height_shift")]
    pub shift: i32,
}
fn default_height_freq() -> f32 {
    0.02
}
fn default_height_offset() -> f32 {
    1.1
}
fn default_height_scale() -> f32 {
    0.7
}
fn default_height_shift() -> i32 {
    -3
}
impl Default for Height {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            offset: default_height_offset(),
            scale: default_height_scale(),
            shift: default_height_shift(),
        }
    }
}

/// Biome banding by absolute y: below `sand_max` sand, below `dirt_max` dirt,
/// grass above.
#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_sand_max")]
    pub sand_max: i32,
    #[serde(default = "default_dirt_max")]
    pub dirt_max: i32,
}
fn default_sand_max() -> i32 {
    11
}
fn default_dirt_max() -> i32 {
    14
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            sand_max: default_sand_max(),
            dirt_max: default_dirt_max(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Water {
    #[serde(default = "default_water_level")]
    pub level: i32,
}
fn default_water_level() -> i32 {
    10
}
impl Default for Water {
    fn default() -> Self {
        Self {
            level: default_water_level(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trees {
    #[serde(default = "default_tree_probability")]
    pub probability: f32,
    #[serde(default = "default_trunk_min")]
    pub trunk_min: i32,
    #[serde(default = "default_trunk_max")]
    pub trunk_max: i32,
    /// Columns whose surface is at or below this never grow trees.
    #[serde(default = "default_min_surface_y")]
    pub min_surface_y: i32,
}
fn default_tree_probability() -> f32 {
    0.02
}
fn default_trunk_min() -> i32 {
    4
}
fn default_trunk_max() -> i32 {
    7
}
fn default_min_surface_y() -> i32 {
    16
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            probability: default_tree_probability(),
            trunk_min: default_trunk_min(),
            trunk_max: default_trunk_max(),
            min_surface_y: default_min_surface_y(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Lighting {
    #[serde(default = "default_attenuation")]
    pub attenuation: f32,
    #[serde(default = "default_light_floor")]
    pub floor: f32,
}
fn default_attenuation() -> f32 {
    0.8
}
fn default_light_floor() -> f32 {
    0.01
}
impl Default for Lighting {
    fn default() -> Self {
        Self {
            attenuation: default_attenuation(),
            floor: default_light_floor(),
        }
    }
}
