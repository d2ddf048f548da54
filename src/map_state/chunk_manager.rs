//! # Chunk Manager
//!
//! The orchestrator of the chunk pipeline: owns the rotating cache, decides
//! per tick which chunks are visible, snapshots them, and enqueues background
//! work.
//!
//! ## Per-Tick Protocol
//!
//! Every 16th tick is reserved for the underground pass, which this engine
//! does not carry; on all other ticks the manager sweeps up to
//! `chunks_per_tick` cache entries. Each swept entry is classified against
//! the save distance (within range: visible and viewed; out of range: no
//! longer visible, viewed stays), visible non-empty chunks are snapshotted,
//! and the whole sweep is enqueued as one batched update task.
//!
//! ## Persistence Rules
//!
//! A chunk is saved if and only if it is viewed at the moment it leaves the
//! cache - by removal, by displacement from `put`, or by the shutdown flush.
//! Saves are additionally gated by the play-mode persistence toggle and the
//! chunk emptiness check; an empty chunk carries no map data and is never
//! snapshotted.
//!
//! ## Locking
//!
//! All mutating operations serialize on one [`MtResource`] guarding the
//! cache, the closed flag, and the tick counter, since the host may invoke
//! them from chunk-event callbacks and the tick loop on different threads.
//! The lock is never held while waiting on workers - task submission is
//! fire-and-forget.

use std::sync::Arc;
use std::sync::RwLockWriteGuard;

use log::debug;

use crate::core::MtResource;

use super::cache::{CachedChunk, ChunkFlags, RotatingChunkCache};
use super::chunk::{ChunkAccess, ChunkCoord, ChunkSnapshot, PlayerPositionSource};
use super::config::MapConfig;
use super::region::RegionStore;
use super::task_management::TaskExecutor;
use super::tasks::{SaveChunkTask, UpdateSurfaceChunksTask};
use super::tile_image::TileImageSurface;

struct ManagerState {
    cache: RotatingChunkCache,
    closed: bool,
    tick_counter: u64,
}

/// Tracks live chunks and turns them into background persistence and
/// tile-image work.
///
/// A closed manager rejects new chunks and ignores every other mutating
/// call; `close` itself flushes all viewed entries first, so no viewed chunk
/// is lost on shutdown or world change.
pub struct ChunkManager {
    state: MtResource<ManagerState>,
    config: MapConfig,
    executor: Arc<dyn TaskExecutor>,
    store: Arc<dyn RegionStore>,
    tile: Arc<dyn TileImageSurface>,
    player: Arc<dyn PlayerPositionSource>,
}

impl ChunkManager {
    /// Creates an open manager with an empty cache.
    pub fn new(
        config: MapConfig,
        executor: Arc<dyn TaskExecutor>,
        store: Arc<dyn RegionStore>,
        tile: Arc<dyn TileImageSurface>,
        player: Arc<dyn PlayerPositionSource>,
    ) -> Self {
        let cache = RotatingChunkCache::new(config.chunk_cache_capacity);
        Self {
            state: MtResource::new(ManagerState {
                cache,
                closed: false,
                tick_counter: 0,
            }),
            config,
            executor,
            store,
            tile,
            player,
        }
    }

    /// Starts tracking a live chunk.
    ///
    /// Returns true when the chunk was newly added, false when the manager is
    /// closed or the chunk replaced an entry already cached at its
    /// coordinate. Any displaced entry (same-coordinate replacement or
    /// capacity eviction) that was viewed is flushed to persistence before
    /// being dropped - the replacement starts over with fresh flags.
    pub fn add_chunk(&self, chunk: Arc<dyn ChunkAccess>) -> bool {
        let mut state = self.state.get_mut();
        if state.closed {
            return false;
        }
        let coord = ChunkCoord::of(chunk.as_ref());
        let displaced = state.cache.put(coord, CachedChunk::new(chunk));
        let replaced_same_coord = matches!(&displaced, Some((old, _)) if *old == coord);
        if let Some((old_coord, old_entry)) = displaced {
            if old_entry.flags.is_viewed() {
                debug!("flushing displaced chunk {old_coord}");
                self.enqueue_save(old_entry.chunk.as_ref());
            }
        }
        !replaced_same_coord
    }

    /// Stops tracking the chunk at `coord`.
    ///
    /// A viewed entry is flushed to persistence before it disappears from
    /// the cache; removing an absent coordinate is a no-op.
    pub fn remove_chunk(&self, coord: ChunkCoord) {
        let mut state = self.state.get_mut();
        if state.closed {
            return;
        }
        let Some(entry) = state.cache.get(coord) else {
            return;
        };
        if entry.flags.is_viewed() {
            let chunk = entry.chunk.clone();
            self.enqueue_save(chunk.as_ref());
        }
        state.cache.remove(coord);
    }

    /// Flushes every currently viewed entry to persistence.
    ///
    /// A full-cache pass (not the rotation cursor); used on shutdown and
    /// world change. Entries stay cached and keep their flags.
    pub fn save_chunks(&self) {
        let state = self.state.get_mut();
        self.flush_viewed(&state);
    }

    /// Closes the manager: flushes all viewed entries, then empties the
    /// cache. Every mutating call after this is a no-op.
    pub fn close(&self) {
        let mut state = self.state.get_mut();
        if state.closed {
            return;
        }
        state.closed = true;
        self.flush_viewed(&state);
        state.cache.clear();
        debug!("chunk manager closed");
    }

    /// Per-tick dispatch. Every 16th tick is left idle (reserved for the
    /// underground pass this engine does not carry); all other ticks sweep
    /// the surface chunks.
    pub fn on_tick(&self) {
        let mut state = self.state.get_mut();
        if state.closed {
            return;
        }
        let tick = state.tick_counter;
        state.tick_counter = state.tick_counter.wrapping_add(1);
        if tick & 0xf != 0 {
            self.sweep_surface(&mut state);
        }
    }

    /// Runs one bounded sweep immediately, regardless of tick phase.
    pub fn update_surface_chunks(&self) {
        let mut state = self.state.get_mut();
        if state.closed {
            return;
        }
        self.sweep_surface(&mut state);
    }

    /// Enqueues an update task for caller-supplied snapshots, bypassing the
    /// cache sweep. Used for externally forced re-renders.
    pub fn force_chunks(&self, snapshots: Vec<Option<ChunkSnapshot>>) {
        if self.state.get().closed {
            return;
        }
        self.executor.add_task(Box::new(UpdateSurfaceChunksTask::new(
            snapshots,
            self.store.clone(),
            self.tile.clone(),
        )));
    }

    /// Number of chunks currently cached.
    pub fn cached_chunks(&self) -> usize {
        self.state.get().cache.len()
    }

    /// The visibility flags of the chunk cached at `coord`, if any. Intended
    /// for diagnostics and the debug overlay.
    pub fn chunk_flags(&self, coord: ChunkCoord) -> Option<ChunkFlags> {
        self.state.get().cache.get(coord).map(|entry| entry.flags)
    }

    /// Evaluates up to `chunks_per_tick` entries at the rotation cursor,
    /// updates their flags against the player position, snapshots the
    /// visible ones, and enqueues the batch.
    fn sweep_surface(&self, state: &mut RwLockWriteGuard<'_, ManagerState>) {
        let chunks_to_update = state.cache.len().min(self.config.chunks_per_tick);
        if chunks_to_update == 0 {
            return;
        }

        let player = self.player.block_position();
        let mut batch = Vec::with_capacity(chunks_to_update);
        for _ in 0..chunks_to_update {
            let Some((coord, entry)) = state.cache.next_entry() else {
                break;
            };
            if coord.dist_sq_to(player) <= self.config.max_chunk_save_dist_sq {
                entry.flags.enter_view();
            } else {
                entry.flags.leave_view();
            }

            let snapshot = if entry.flags.is_visible() && !entry.chunk.is_empty() {
                Some(ChunkSnapshot::capture(entry.chunk.as_ref()))
            } else {
                None
            };
            batch.push(snapshot);
        }

        self.executor.add_task(Box::new(UpdateSurfaceChunksTask::new(
            batch,
            self.store.clone(),
            self.tile.clone(),
        )));
    }

    /// Enqueues save tasks for every viewed cache entry.
    fn flush_viewed(&self, state: &ManagerState) {
        for (coord, entry) in state.cache.entries() {
            if entry.flags.is_viewed() {
                debug!("flushing viewed chunk {coord}");
                self.enqueue_save(entry.chunk.as_ref());
            }
        }
    }

    /// Snapshots a chunk and enqueues its save task, subject to the
    /// play-mode persistence toggle and the emptiness gate.
    fn enqueue_save(&self, chunk: &dyn ChunkAccess) {
        if !self.config.persistence_enabled() || chunk.is_empty() {
            return;
        }
        self.executor.add_task(Box::new(SaveChunkTask::new(
            ChunkSnapshot::capture(chunk),
            self.store.clone(),
        )));
    }
}
