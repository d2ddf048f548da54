//! Shared mutable state behind a read-write lock.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted resource container with read-write locking.
///
/// `MtResource` provides synchronized access to a value of type `T` that can be
/// shared across threads. It wraps an `Arc<RwLock<T>>` and is the lock behind
/// every piece of shared mutable state in the engine: the chunk manager's
/// cache/lifecycle state serializes all of its mutating operations on one
/// `MtResource`, and the in-memory tile image guards its pixel buffer with
/// another.
///
/// # Type Parameters
/// - `T`: The type of the contained resource, must be `Send + Sync`
///
/// # Examples
///
/// ```
/// use minimap_engine::core::MtResource;
///
/// let tick_counter = MtResource::new(0u64);
///
/// // Exclusive write access
/// *tick_counter.get_mut() += 1;
///
/// // Shared read access
/// assert_eq!(*tick_counter.get(), 1);
/// ```
///
/// # Lock Poisoning
/// A panic while a guard is held poisons the lock; subsequent accessors panic
/// as well. The engine treats this as fatal - there is no state worth
/// salvaging from a half-updated cache or pixel buffer.
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read guard for the contained value.
    ///
    /// Reads may proceed concurrently with each other but block while a write
    /// guard is outstanding.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap()
    }

    /// Returns an exclusive write guard for the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap()
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
