//! Region persistence collaborator interface.
//!
//! The durable, region-file-organized store of map data lives in the host
//! application; the engine only needs two operations from it. Implementations
//! are shared between all worker threads and must synchronize internally.

use super::chunk::ChunkSnapshot;

/// Durable storage of rendered map data, organized by coordinate region.
pub trait RegionStore: Send + Sync {
    /// Merges a snapshot's block data into the on-disk region representation
    /// for its coordinate and dimension.
    ///
    /// Called from worker threads. I/O failures are the store's own concern:
    /// a chunk whose update fails simply is not refreshed on this pass and
    /// will be retried naturally on a later sweep while it stays visible.
    fn update_chunk(&self, snapshot: &ChunkSnapshot);

    /// Reads back the rendered map pixels (0xAARRGGBB) for a rectangle, row
    /// major, `width * height` entries.
    ///
    /// This is the surface the tile image re-queries after a chunk update.
    fn read_pixels(
        &self,
        dimension: i32,
        pixel_x: i32,
        pixel_z: i32,
        width: u32,
        height: u32,
    ) -> Vec<u32>;
}
