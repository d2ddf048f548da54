#![warn(missing_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Minimap Engine
//!
//! The asynchronous core of a client-side minimap: it watches the live world
//! chunks the host game hands it, keeps them in a rotating cache, and turns
//! them into persisted map-tile imagery on background worker threads.
//!
//! ## Key Modules
//!
//! * `core` - Concurrency primitives shared throughout the crate
//! * `map_state` - The minimap engine components: chunk cache, chunk manager,
//!   task management, background tasks, and collaborator interfaces
//!
//! ## Architecture
//!
//! The engine follows a strict two-context threading model:
//!
//! * The **main tick thread** owns the chunk cache and all cached-chunk flags.
//!   Once per game tick it sweeps a bounded number of cached chunks, snapshots
//!   the visible ones, and enqueues batched background work.
//! * A **background worker pool** consumes those tasks. Workers only ever see
//!   immutable [`map_state::chunk::ChunkSnapshot`] data plus the shared
//!   persistence and tile-image collaborators - never the live cache.
//!
//! Host-engine services (the world chunk provider, region persistence, the
//! tile image surface, the player position) are abstracted as traits in
//! `map_state` so the core stays independent of any particular game engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let map = MapState::new(config, store, tile, player);
//!
//! // From the host's chunk load/unload events:
//! map.add_chunk(chunk);
//! map.remove_chunk(coord);
//!
//! // Once per game tick:
//! map.on_tick();
//! map.process_tasks();
//!
//! // On shutdown or world change:
//! map.close();
//! ```

pub mod core;
pub mod map_state;

/// Initializes the logger for embedding applications that do not bring their
/// own `log` implementation.
///
/// Output goes to stdout and the filter is read from the `RUST_LOG`
/// environment variable. Calling this more than once is harmless; subsequent
/// calls are ignored.
pub fn init_logging() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}
