//! In-memory resource cache with a dirty flag
//!
//! The map, the dirty flag and a mutation counter share a single lock. It is
//! held only for the map operation itself, never across encoding or I/O.

use crate::resources::Resource;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Point-in-time copy of the cache, ordered by key
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub entries: BTreeMap<String, T>,
    /// Mutation counter at the instant the copy was taken
    pub generation: u64,
}

#[derive(Debug)]
struct CacheState<T> {
    entries: HashMap<String, T>,
    dirty: bool,
    generation: u64,
}

/// Key to latest-object map guarded by one lock
#[derive(Debug)]
pub struct ResourceCache<T> {
    state: Mutex<CacheState<T>>,
}

impl<T: Resource> ResourceCache<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                dirty: false,
                generation: 0,
            }),
        }
    }

    /// Insert or replace an object under its key and mark the cache dirty
    pub fn put(&self, object: T) {
        let key = object.key();
        let mut state = self.lock();
        state.entries.insert(key, object);
        state.dirty = true;
        state.generation += 1;
    }

    /// Remove an entry; only an actual removal marks the cache dirty
    pub fn remove(&self, key: &str) -> bool {
        let mut state = self.lock();
        if state.entries.remove(key).is_none() {
            return false;
        }
        state.dirty = true;
        state.generation += 1;
        true
    }

    /// Copy the whole map under the lock
    pub fn snapshot(&self) -> Snapshot<T> {
        let state = self.lock();
        Snapshot {
            entries: state
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            generation: state.generation,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    /// Clear the dirty flag if nothing changed since `generation` was observed
    ///
    /// Returns `false` when a mutation raced the dump; the flag then stays set
    /// so the next tick writes the newer state.
    pub fn mark_clean(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation {
            return false;
        }
        state.dirty = false;
        true
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.lock().entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every critical section is one map call plus flag writes, so a poisoned
    // lock still guards consistent state.
    fn lock(&self) -> MutexGuard<'_, CacheState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Resource> Default for ResourceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
