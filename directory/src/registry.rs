//! Concurrent name-indexed entity tables
//!
//! A [`Registry`] owns the set of known entities of one kind. Lookups go
//! straight to a sharded concurrent map and never block on writers; mutations
//! are serialized through a single writer lock so that check-then-insert and
//! check-then-remove sequences are atomic per registry.

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

use crate::errors::{DirectoryError, Result};
use crate::identity::Named;

/// Name → entity table with lock-free reads and serialized writes.
#[derive(Debug)]
pub struct Registry<T: Named> {
    entries: DashMap<String, T>,
    write_lock: Mutex<()>,
}

impl<T: Named> Registry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Look up an entity by name. Never fails; unknown names yield `None`.
    pub fn find_by_name(&self, name: &str) -> Option<T> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Whether an entity with this name is currently registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether this exact entity is currently registered.
    pub fn is_registered(&self, entity: &T) -> bool {
        self.contains(entity.name())
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Point-in-time list of registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        names.sort_unstable();
        names
    }

    /// Acquire the writer lock.
    ///
    /// Blocks until no other writer holds the lock. Readers are unaffected.
    pub fn write(&self) -> RegistryWriter<'_, T> {
        RegistryWriter {
            entries: &self.entries,
            _guard: self.write_lock.lock(),
        }
    }
}

impl<T: Named> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive write access to a [`Registry`].
///
/// Holding a writer guarantees no other writer of the same registry runs
/// concurrently; it is released on drop.
pub struct RegistryWriter<'a, T: Named> {
    entries: &'a DashMap<String, T>,
    _guard: MutexGuard<'a, ()>,
}

impl<T: Named> RegistryWriter<'_, T> {
    /// Look up an entity by name.
    pub fn get(&self, name: &str) -> Option<T> {
        self.entries.get(name).map(|entry| entry.value().clone())
    }

    /// Register an entity, failing with `AlreadyExists` if the name is taken.
    pub fn insert(&self, entity: T) -> Result<()> {
        if self.entries.contains_key(entity.name()) {
            return Err(DirectoryError::already_exists(T::KIND, entity.name()));
        }
        self.entries.insert(entity.name().to_string(), entity);
        Ok(())
    }

    /// Unregister an entity by name, returning it if it was present.
    pub fn remove(&self, name: &str) -> Option<T> {
        self.entries.remove(name).map(|(_, entity)| entity)
    }
}
