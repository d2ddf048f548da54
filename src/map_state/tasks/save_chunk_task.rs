//! Persists a single chunk snapshot into the region store.

use std::sync::Arc;

use log::trace;

use crate::map_state::chunk::ChunkSnapshot;
use crate::map_state::region::RegionStore;
use crate::map_state::task_management::task::{Task, TaskResult};

/// Writes one snapshot to region persistence on a worker thread.
///
/// Emitted by the chunk manager whenever a viewed chunk leaves the cache
/// (removal, eviction, replacement) or during a shutdown flush. The snapshot
/// is captured on the main thread before the task is constructed; by the
/// time a worker sees it, nothing else references its arrays.
pub struct SaveChunkTask {
    snapshot: ChunkSnapshot,
    store: Arc<dyn RegionStore>,
}

impl SaveChunkTask {
    /// Creates a save task for an already captured snapshot.
    pub fn new(snapshot: ChunkSnapshot, store: Arc<dyn RegionStore>) -> Self {
        Self { snapshot, store }
    }
}

impl Task for SaveChunkTask {
    fn process(&self) -> Box<dyn TaskResult> {
        trace!("saving chunk {}", self.snapshot.coord());
        self.store.update_chunk(&self.snapshot);
        Box::new(SaveChunkDone)
    }
}

/// Completion marker; a chunk save needs no main-thread follow-up.
struct SaveChunkDone;

impl TaskResult for SaveChunkDone {
    fn on_complete(self: Box<Self>) -> Vec<Box<dyn Task>> {
        Vec::new()
    }
}
