use cavewar_world::{DebrisSettings, LevelConfig};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{info, warn};

pub const DEFAULT_ARENA_PATH: &str = "config/arena.toml";

/// Smallest cave grid the generator's carving passes fit into.
const MIN_GRID_WIDTH: usize = 40;
const MIN_GRID_HEIGHT: usize = 24;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    /// World width in pixels.
    pub world_width: u32,
    /// World height in pixels.
    pub world_height: u32,
    /// Tile edge in pixels.
    pub tile_size: u32,
    /// Floor thickness in tiles.
    pub floor_thickness: u32,
    pub voxel_max_health: f32,
    /// Seconds before a destroyed wall may come back.
    pub regeneration_seconds: f64,
    pub debris: DebrisSettings,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        let level = LevelConfig::default();
        Self {
            world_width: level.world_width,
            world_height: level.world_height,
            tile_size: level.tile_size,
            floor_thickness: level.floor_thickness,
            voxel_max_health: level.voxel_max_health,
            regeneration_seconds: level.regeneration_seconds,
            // The headless run exercises the debris pool; the game ships it off.
            debris: DebrisSettings {
                enabled: true,
                ..level.debris
            },
        }
    }
}

impl ArenaConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        let cfg = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ArenaConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    ArenaConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_ARENA_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    info!("Arena config not found at {}. Using defaults", path.display());
                }
                ArenaConfig::default()
            }
        };
        cfg.validated()
    }

    /// Replace geometry the generator cannot work with by the defaults.
    fn validated(self) -> Self {
        let level = self.level();
        let health_ok = self.voxel_max_health.is_finite() && self.voxel_max_health > 0.0;
        let regen_ok = self.regeneration_seconds.is_finite() && self.regeneration_seconds >= 0.0;
        let grid_ok = self.tile_size > 0
            && level.grid_width() >= MIN_GRID_WIDTH
            && level.grid_height() >= MIN_GRID_HEIGHT;
        if health_ok && regen_ok && grid_ok {
            return self;
        }
        warn!(
            grid_width = level.grid_width(),
            grid_height = level.grid_height(),
            health = self.voxel_max_health,
            regeneration_seconds = self.regeneration_seconds,
            "arena config out of range. Using defaults"
        );
        ArenaConfig {
            debris: self.debris,
            ..ArenaConfig::default()
        }
    }

    /// Level settings every peer builds from.
    pub fn level(&self) -> LevelConfig {
        LevelConfig {
            world_width: self.world_width,
            world_height: self.world_height,
            tile_size: self.tile_size,
            floor_thickness: self.floor_thickness,
            voxel_max_health: self.voxel_max_health,
            regeneration_seconds: self.regeneration_seconds,
            debris: self.debris.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = ArenaConfig::load_from_path(Path::new("does/not/exist.toml"));
        assert_eq!(cfg, ArenaConfig::default());
        assert_eq!(cfg.level().regeneration_ticks(), 600);
        assert!(cfg.debris.enabled);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_temp("regeneration_seconds = 2.5\n[debris]\nmax_particles = 10\n");
        let cfg = ArenaConfig::load_from_path(file.path());
        assert_eq!(cfg.regeneration_seconds, 2.5);
        assert_eq!(cfg.debris.max_particles, 10);
        assert_eq!(cfg.tile_size, 32);
        assert_eq!(cfg.level().regeneration_ticks(), 150);
    }

    #[test]
    fn malformed_file_falls_back() {
        let file = write_temp("tile_size = \"big\"");
        assert_eq!(ArenaConfig::load_from_path(file.path()), ArenaConfig::default());
    }

    #[test]
    fn degenerate_geometry_falls_back() {
        let file = write_temp("tile_size = 0\n");
        assert_eq!(ArenaConfig::load_from_path(file.path()).tile_size, 32);
        let file = write_temp("world_width = 320\n");
        assert_eq!(ArenaConfig::load_from_path(file.path()).world_width, 3840);
    }
}
