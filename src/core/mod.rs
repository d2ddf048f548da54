//! # Core Module
//!
//! This module provides the concurrency primitives used throughout the
//! minimap engine.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted resource with read-write locking
//!
//! `MtResource` is the single synchronization primitive the engine needs: it
//! guards the chunk manager's mutable state (cache, lifecycle flags) and the
//! pixel buffer inside the in-memory tile image. Everything else crossing a
//! thread boundary is immutable by construction.

pub mod mt_resource;

pub use mt_resource::MtResource;
