//! Level configuration and the seed → segments pipeline.

use cavewar_core::{SimTick, Theme};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cave::{CaveGenerator, CaveLayout, CaveParams};
use crate::debris::DebrisSettings;
use crate::segment::Segment;
use crate::voxelize::voxelize;

/// World geometry and terrain tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// World width in pixels.
    pub world_width: u32,
    /// World height in pixels.
    pub world_height: u32,
    /// Tile edge in pixels.
    pub tile_size: u32,
    /// Floor thickness in tiles.
    pub floor_thickness: u32,
    /// Hit points of a fresh destructible segment.
    pub voxel_max_health: f32,
    /// Delay before a destroyed segment may come back.
    pub regeneration_seconds: f64,
    /// Cosmetic debris tuning.
    pub debris: DebrisSettings,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            world_width: 3840,
            world_height: 2160,
            tile_size: 32,
            floor_thickness: 2,
            voxel_max_health: 50.0,
            regeneration_seconds: 10.0,
            debris: DebrisSettings::default(),
        }
    }
}

impl LevelConfig {
    pub fn tile(&self) -> f32 {
        self.tile_size as f32
    }

    /// Y coordinate of the floor's top edge.
    pub fn floor_y(&self) -> f32 {
        self.world_height as f32 - (self.floor_thickness * self.tile_size) as f32
    }

    /// Height between the ceiling row and the floor.
    pub fn playable_height(&self) -> f32 {
        self.floor_y() - self.tile()
    }

    pub fn grid_width(&self) -> usize {
        (self.world_width / self.tile_size.max(1)) as usize
    }

    pub fn grid_height(&self) -> usize {
        (self.playable_height().max(0.0) / self.tile().max(1.0)).floor() as usize
    }

    /// Regeneration delay in simulation ticks.
    pub fn regeneration_ticks(&self) -> u64 {
        SimTick::ticks_for_seconds(self.regeneration_seconds)
    }

    pub fn cave_params(&self) -> CaveParams {
        CaveParams {
            width: self.grid_width(),
            height: self.grid_height(),
            ..CaveParams::default()
        }
    }
}

/// A generated level ready to be loaded into a [`crate::Terrain`].
#[derive(Debug, Clone)]
pub struct Level {
    pub seed: i32,
    pub theme: Theme,
    pub layout: CaveLayout,
    pub segments: Vec<Segment>,
}

impl Level {
    /// Segments that can take damage.
    pub fn destructible_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_voxel()).count()
    }
}

/// Generate the cave for `seed` and voxelize it.
pub fn build_level(seed: i32, theme: Theme, config: &LevelConfig) -> Level {
    let layout = CaveGenerator::with_params(seed, config.cave_params()).generate();
    let segments = voxelize(&layout.grid, config, theme);
    let level = Level {
        seed,
        theme,
        layout,
        segments,
    };
    info!(
        seed,
        theme = theme.as_str(),
        segments = level.segments.len(),
        destructible = level.destructible_count(),
        tunnels = level.layout.main_tunnels.len(),
        "level built"
    );
    level
}
