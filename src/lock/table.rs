use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("{0} is not locked")]
    NotLocked(String),

    #[error("{0} is locked by another thread")]
    NotOwner(String),
}

#[derive(Debug)]
struct LockEntry {
    owner: Option<ThreadId>,
    depth: usize,
    waiters: usize,
}

#[derive(Default)]
struct Inner {
    entries: Mutex<HashMap<String, LockEntry>>,
    released: Condvar,
}

/// Reentrant URI-keyed lock table. Clones share the same table.
#[derive(Clone, Default)]
pub struct LockTable {
    inner: Arc<Inner>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the calling thread holds `uri`; released when the guard drops.
    pub fn lock(&self, uri: &str) -> LockGuard {
        self.acquire(uri);
        LockGuard {
            table: self.clone(),
            uri: uri.to_string(),
        }
    }

    /// Acquire without a guard. Must be paired with [`release`](Self::release).
    pub fn acquire(&self, uri: &str) {
        let me = thread::current().id();
        let mut entries = self.inner.entries.lock();
        loop {
            let entry = entries.entry(uri.to_string()).or_insert(LockEntry {
                owner: None,
                depth: 0,
                waiters: 0,
            });
            match entry.owner {
                None => {
                    entry.owner = Some(me);
                    entry.depth = 1;
                    break;
                }
                Some(owner) if owner == me => {
                    entry.depth += 1;
                    break;
                }
                Some(_) => {
                    entry.waiters += 1;
                    self.inner.released.wait(&mut entries);
                    if let Some(entry) = entries.get_mut(uri) {
                        entry.waiters -= 1;
                    }
                }
            }
        }
        trace!(uri, "lock acquired");
    }

    pub fn release(&self, uri: &str) -> Result<(), LockError> {
        let me = thread::current().id();
        let mut entries = self.inner.entries.lock();
        let entry = entries
            .get_mut(uri)
            .filter(|e| e.owner.is_some())
            .ok_or_else(|| LockError::NotLocked(uri.to_string()))?;
        if entry.owner != Some(me) {
            return Err(LockError::NotOwner(uri.to_string()));
        }
        entry.depth -= 1;
        if entry.depth == 0 {
            entry.owner = None;
            if entry.waiters == 0 {
                entries.remove(uri);
            }
            self.inner.released.notify_all();
        }
        trace!(uri, "lock released");
        Ok(())
    }

    pub fn is_locked(&self, uri: &str) -> bool {
        self.inner
            .entries
            .lock()
            .get(uri)
            .is_some_and(|e| e.owner.is_some())
    }

    /// Number of URIs with a live entry (held or awaited).
    pub fn held_count(&self) -> usize {
        self.inner.entries.lock().len()
    }
}

impl std::fmt::Debug for LockTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockTable")
            .field("held", &self.held_count())
            .finish()
    }
}

/// Holds one level of a resource lock.
#[must_use = "the lock is released when the guard is dropped"]
pub struct LockGuard {
    table: LockTable,
    uri: String,
}

impl LockGuard {
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fails only if the level was already released through `release`
        if let Err(e) = self.table.release(&self.uri) {
            tracing::error!(uri = %self.uri, error = %e, "failed to release update lock");
        }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").field("uri", &self.uri).finish()
    }
}
