//! The batched surface-update task produced by each sweep.

use std::sync::Arc;

use crate::map_state::chunk::{ChunkCoord, ChunkSnapshot, CHUNK_DIMENSION};
use crate::map_state::overlay;
use crate::map_state::region::RegionStore;
use crate::map_state::task_management::task::{Task, TaskResult};
use crate::map_state::tile_image::TileImageSurface;

/// Applies one sweep's worth of chunk snapshots to the map.
///
/// For each non-empty slot, in iteration order: the snapshot is merged into
/// the region store first, then the tile image re-renders exactly the 16x16
/// pixel rectangle of that chunk's footprint in the chunk's dimension. `None`
/// slots are chunks that were out of view this sweep and need no redraw.
///
/// Batching one task per sweep (rather than one per chunk) amortizes task
/// queue overhead across up to `chunks_per_tick` chunks.
pub struct UpdateSurfaceChunksTask {
    snapshots: Vec<Option<ChunkSnapshot>>,
    store: Arc<dyn RegionStore>,
    tile: Arc<dyn TileImageSurface>,
}

impl UpdateSurfaceChunksTask {
    /// Creates the batch task. Slots hold `None` for swept chunks that were
    /// out of view.
    pub fn new(
        snapshots: Vec<Option<ChunkSnapshot>>,
        store: Arc<dyn RegionStore>,
        tile: Arc<dyn TileImageSurface>,
    ) -> Self {
        Self {
            snapshots,
            store,
            tile,
        }
    }
}

impl Task for UpdateSurfaceChunksTask {
    fn process(&self) -> Box<dyn TaskResult> {
        let mut redrawn = Vec::new();
        for snapshot in self.snapshots.iter().flatten() {
            // Region pixels first, then the tile image copies them back out.
            self.store.update_chunk(snapshot);
            let coord = snapshot.coord();
            self.tile.update_area(
                self.store.as_ref(),
                coord.x << 4,
                coord.z << 4,
                CHUNK_DIMENSION as u32,
                CHUNK_DIMENSION as u32,
                coord.dimension,
            );
            redrawn.push(coord);
        }
        Box::new(SurfaceChunksUpdated { redrawn })
    }
}

/// Completion phase: stamps the redraw times into the overlay registry on
/// the main thread.
struct SurfaceChunksUpdated {
    redrawn: Vec<ChunkCoord>,
}

impl TaskResult for SurfaceChunksUpdated {
    fn on_complete(self: Box<Self>) -> Vec<Box<dyn Task>> {
        for coord in &self.redrawn {
            overlay::redraw(*coord);
        }
        Vec::new()
    }
}
