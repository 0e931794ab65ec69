//! Shared store handle
//!
//! Serializes every operation on one store instance behind a mutex.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

use super::{RecordStore, SequenceMode};

/// Cloneable, thread-safe handle to a single store instance
///
/// One lock per store: the cursor and the count are only ever touched by
/// one caller at a time.
pub struct SharedRecordStore<S: RecordStore> {
    inner: Arc<Mutex<S>>,
}

impl<S: RecordStore> SharedRecordStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with exclusive access to the store
    ///
    /// Use this to keep several operations together, e.g. a full
    /// `sequence` pass.
    pub fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut store = self.inner.lock();
        f(&mut store)
    }

    pub fn insert(&self, key: &str, data: &[u8]) -> Result<()> {
        self.inner.lock().insert(key, data)
    }

    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.inner.lock().read(key)
    }

    pub fn replace(&self, key: &str, data: &[u8]) -> Result<()> {
        self.inner.lock().replace(key, data)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.inner.lock().remove(key)
    }

    pub fn length(&self, key: &str) -> Result<u64> {
        self.inner.lock().length(key)
    }

    pub fn count(&self) -> u64 {
        self.inner.lock().count()
    }

    pub fn space_used(&self) -> Result<u64> {
        self.inner.lock().space_used()
    }

    pub fn sequence(&self, mode: SequenceMode) -> Result<(String, Vec<u8>)> {
        self.inner.lock().sequence(mode)
    }

    /// Take the store back if this is the last handle
    pub fn try_unwrap(self) -> std::result::Result<S, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| mutex.into_inner())
            .map_err(|inner| Self { inner })
    }
}

impl<S: RecordStore> Clone for SharedRecordStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
