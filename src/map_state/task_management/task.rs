//! # Task System Core Traits
//!
//! The two-phase unit of background work the minimap engine runs on its
//! worker pool.
//!
//! ## Task Lifecycle
//! 1. The main thread creates a `Task` and hands it to the executor
//!    (`TaskManager::add_task`)
//! 2. The task's `process()` runs on a worker thread
//! 3. The returned `TaskResult`'s `on_complete()` runs back on the main
//!    thread the next time completed tasks are pumped, and may spawn
//!    follow-up tasks
//!
//! ## Thread Safety
//! The two phases share no mutable state beyond what the task was
//! constructed with. Everything a task carries across the thread boundary is
//! either immutable (chunk snapshots) or a collaborator that synchronizes
//! internally (the region store, the tile image).

/// A unit of work executed on a background worker thread.
///
/// Tasks own all the data they need: a snapshot of chunk data and shared
/// handles to the persistence/image collaborators. They must never reach
/// back into live game-engine state - that is what keeps the worker pool
/// race-free.
pub trait Task: Send {
    /// Performs the work on a worker thread and returns the result to hand
    /// back to the main thread.
    ///
    /// Must not block on main-thread progress; a stuck worker stalls
    /// persistence but never the game simulation.
    fn process(&self) -> Box<dyn TaskResult>;
}

/// The main-thread completion phase of a finished [`Task`].
pub trait TaskResult: Send {
    /// Runs on the main thread after the task finished.
    ///
    /// Keep it light - this executes inside the tick loop. Returned tasks
    /// are published to the executor as follow-up work (usually none).
    fn on_complete(self: Box<Self>) -> Vec<Box<dyn Task>>;
}
