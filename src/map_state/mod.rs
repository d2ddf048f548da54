//! # Map State Module
//!
//! The minimap engine proper: the chunk cache and manager, the background
//! task system, the two task kinds, and the collaborator interfaces the host
//! game engine plugs into.
//!
//! ## Key Components
//!
//! * `MapState` - the central coordinator embedding applications talk to
//! * `cache` - the rotating chunk cache
//! * `chunk` - chunk coordinates, snapshots, and the live-chunk interface
//! * `chunk_manager` - the per-tick sweep and persistence orchestration
//! * `task_management` - the background worker pool
//! * `tasks` - chunk save and surface update work units
//! * `region` / `tile_image` - persistence and map-bitmap collaborators
//! * `overlay` - process-wide chunk activity registry for the debug overlay
//!
//! ## Data Flow
//!
//! 1. The host reports chunk loads/unloads and ticks to `MapState`
//! 2. The chunk manager sweeps a bounded slice of the cache per tick,
//!    snapshots visible chunks, and enqueues batched tasks
//! 3. Workers merge snapshots into region persistence and redraw the tile
//!    image
//! 4. `process_tasks`, called from the tick loop, completes finished tasks
//!    on the main thread

use std::sync::Arc;

pub mod cache;
pub mod chunk;
pub mod chunk_manager;
pub mod config;
pub mod overlay;
pub mod region;
pub mod task_management;
pub mod tasks;
pub mod tile_image;

#[cfg(test)]
pub(crate) mod test_util;

use chunk::{ChunkAccess, ChunkCoord, ChunkSnapshot, PlayerPositionSource};
use chunk_manager::ChunkManager;
use config::MapConfig;
use region::RegionStore;
use task_management::TaskManager;
use tile_image::TileImageSurface;

/// The central coordinator of the minimap engine.
///
/// Owns the worker pool and the chunk manager and wires the host's chunk
/// events, tick loop, and shutdown into them. One `MapState` serves one
/// loaded world; `close` it on world change and build a fresh one.
pub struct MapState {
    config: MapConfig,
    task_manager: Arc<TaskManager>,
    chunk_manager: ChunkManager,
}

impl MapState {
    /// Builds the engine from a config and the host's collaborators.
    pub fn new(
        config: MapConfig,
        store: Arc<dyn RegionStore>,
        tile: Arc<dyn TileImageSurface>,
        player: Arc<dyn PlayerPositionSource>,
    ) -> Self {
        let task_manager = Arc::new(TaskManager::new(config.background_workers));
        let chunk_manager = ChunkManager::new(
            config.clone(),
            task_manager.clone(),
            store,
            tile,
            player,
        );
        Self {
            config,
            task_manager,
            chunk_manager,
        }
    }

    /// Handles a chunk-load event from the host.
    ///
    /// Returns whether the chunk was newly tracked. Also stamps the overlay
    /// registry.
    pub fn add_chunk(&self, chunk: Arc<dyn ChunkAccess>) -> bool {
        overlay::load(ChunkCoord::of(chunk.as_ref()));
        self.chunk_manager.add_chunk(chunk)
    }

    /// Handles a chunk-unload event from the host.
    pub fn remove_chunk(&self, coord: ChunkCoord) {
        overlay::unload(coord);
        self.chunk_manager.remove_chunk(coord);
    }

    /// Advances the per-tick protocol by one game tick.
    pub fn on_tick(&self) {
        self.chunk_manager.on_tick();
    }

    /// Pumps the task system: completes finished background work on the
    /// calling (main) thread and dispatches queued tasks to idle workers.
    /// Call once per tick or frame.
    pub fn process_tasks(&self) {
        self.task_manager.process_completed_tasks();
        self.task_manager.process_queued_tasks();
    }

    /// Enqueues an update for externally supplied snapshots, bypassing the
    /// cache sweep.
    pub fn force_chunks(&self, snapshots: Vec<Option<ChunkSnapshot>>) {
        self.chunk_manager.force_chunks(snapshots);
    }

    /// Flushes every currently viewed chunk to persistence without removing
    /// anything from the cache. Used on world save.
    pub fn save_chunks(&self) {
        self.chunk_manager.save_chunks();
    }

    /// Shuts the engine down for this world: flushes every viewed chunk,
    /// empties the cache, and clears the overlay registry.
    ///
    /// Only the *enqueueing* of the flush is synchronous; keep pumping
    /// [`Self::process_tasks`] (or let the host drain workers) to finish the
    /// writes.
    pub fn close(&self) {
        self.chunk_manager.close();
        overlay::clear();
    }

    /// The engine's runtime configuration.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Direct access to the chunk manager, for diagnostics and the debug
    /// overlay.
    pub fn chunk_manager(&self) -> &ChunkManager {
        &self.chunk_manager
    }
}
