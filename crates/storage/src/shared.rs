//! Thread-shared stores.
//!
//! Sequences produced by a store borrow it, so within one thread the
//! borrow checker already keeps mutation away from live iterators. Across
//! threads a [`SharedStore`] gives scoped access under a reader/writer lock:
//! readers run together, a writer runs alone, and separate stores never
//! contend.

use crate::object_store::ObjectStore;
use std::sync::{Arc, PoisonError, RwLock};

/// A cloneable handle to a store shared between threads.
#[derive(Clone, Debug)]
pub struct SharedStore {
    inner: Arc<RwLock<ObjectStore>>,
}

impl SharedStore {
    pub fn new(store: ObjectStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Runs `f` with shared access. Iterators must be consumed inside `f`.
    pub fn read<R>(&self, f: impl FnOnce(&ObjectStore) -> R) -> R {
        // A panic in another writer leaves the store structurally intact, so
        // the poison flag is cleared rather than propagated.
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Runs `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut ObjectStore) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Takes the store back once this is the last handle.
    pub fn try_unwrap(self) -> Result<ObjectStore, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(lock) => Ok(lock.into_inner().unwrap_or_else(PoisonError::into_inner)),
            Err(inner) => Err(Self { inner }),
        }
    }
}
