//! Runtime configuration for the minimap engine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Read-only runtime flags controlling the sweep, persistence gating, and
/// the worker pool.
///
/// Loaded once at startup (typically from the mod's JSON config file) and
/// treated as immutable by the engine core. Missing fields fall back to
/// their defaults, so partial config files stay valid across versions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Upper bound on cache entries evaluated per sweep. This is the
    /// backpressure knob: per-tick cost stays bounded no matter how large
    /// the cache grows.
    pub chunks_per_tick: usize,
    /// Squared planar block distance inside which a chunk counts as visible.
    pub max_chunk_save_dist_sq: i64,
    /// True when connected to a multiplayer server.
    pub multiplayer: bool,
    /// Persist chunks to region files in single-player worlds.
    pub region_file_output_enabled_sp: bool,
    /// Persist chunks to region files on multiplayer servers.
    pub region_file_output_enabled_mp: bool,
    /// Number of background worker threads.
    pub background_workers: usize,
    /// Maximum number of chunks held in the rotating cache.
    pub chunk_cache_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            chunks_per_tick: 5,
            max_chunk_save_dist_sq: 128 * 128,
            multiplayer: false,
            region_file_output_enabled_sp: true,
            region_file_output_enabled_mp: true,
            background_workers: 2,
            chunk_cache_capacity: 1024,
        }
    }
}

impl MapConfig {
    /// Loads a config from a JSON file, applying defaults for absent fields.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    /// True when region persistence is enabled for the current play mode.
    pub fn persistence_enabled(&self) -> bool {
        if self.multiplayer {
            self.region_file_output_enabled_mp
        } else {
            self.region_file_output_enabled_sp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: MapConfig =
            serde_json::from_str(r#"{ "chunks_per_tick": 9, "multiplayer": true }"#).unwrap();
        assert_eq!(config.chunks_per_tick, 9);
        assert!(config.multiplayer);
        assert_eq!(config.max_chunk_save_dist_sq, 128 * 128);
        assert_eq!(config.chunk_cache_capacity, 1024);
    }

    #[test]
    fn from_file_round_trips() {
        let mut config = MapConfig::default();
        config.background_workers = 7;
        config.region_file_output_enabled_mp = false;

        let path = std::env::temp_dir().join(format!("map-config-{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        let loaded = MapConfig::from_file(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.background_workers, 7);
        assert!(!loaded.region_file_output_enabled_mp);
    }

    #[test]
    fn persistence_gate_follows_play_mode() {
        let mut config = MapConfig::default();
        config.multiplayer = false;
        config.region_file_output_enabled_sp = false;
        config.region_file_output_enabled_mp = true;
        assert!(!config.persistence_enabled());

        config.multiplayer = true;
        assert!(config.persistence_enabled());
    }
}
