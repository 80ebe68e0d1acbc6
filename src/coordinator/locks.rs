//! Per-key locks
//!
//! One async mutex per key that is currently locked or awaited. Entries are
//! created on demand and dropped with the last guard, so requests on unrelated
//! keys never share a mutex.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type KeyMutex = Arc<AsyncMutex<()>>;

#[derive(Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<String, KeyMutex>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`. Hold at most one guard at a time.
    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mutex = self.locks.lock().entry(key.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;

        KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }

    fn release(&self, key: &str) {
        let mut locks = self.locks.lock();
        // only the map itself still refers to the mutex: nobody holds or awaits it
        if locks.get(key).is_some_and(|mutex| Arc::strong_count(mutex) == 1) {
            locks.remove(key);
        }
    }
}

// == Key Guard ==
/// Exclusive access to one key, released on drop.
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.key);
    }
}
