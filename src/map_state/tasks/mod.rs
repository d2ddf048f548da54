//! # Background Map Tasks
//!
//! The two kinds of work the chunk manager hands to the worker pool:
//!
//! * `SaveChunkTask` - persists one viewed chunk's snapshot into the region
//!   store (emitted on removal, eviction, replacement, and shutdown flush)
//! * `UpdateSurfaceChunksTask` - a batched sweep result: merges each visible
//!   snapshot into the region store and redraws its tile-image rectangle
//!
//! Both kinds carry only immutable snapshots and the shared collaborators.

pub mod save_chunk_task;
pub mod update_surface_chunks_task;

pub use save_chunk_task::SaveChunkTask;
pub use update_surface_chunks_task::UpdateSurfaceChunksTask;
