//! Per-abstract build locks for at-most-once shared construction.

use std::thread::{self, ThreadId};

use parking_lot::{Mutex, MutexGuard};

/// Serialises builds of one shared abstract and remembers which thread
/// holds it, so re-entry from that thread is refused instead of blocking.
#[derive(Debug, Default)]
pub(crate) struct BuildLock {
    lock: Mutex<()>,
    owner: Mutex<Option<ThreadId>>,
}

pub(crate) struct BuildGuard<'a> {
    owner: &'a Mutex<Option<ThreadId>>,
    _guard: MutexGuard<'a, ()>,
}

impl BuildLock {
    /// Blocks until the lock is free. Returns `None` if the current thread
    /// already holds it.
    pub(crate) fn acquire(&self) -> Option<BuildGuard<'_>> {
        let current = thread::current().id();
        if *self.owner.lock() == Some(current) {
            return None;
        }

        let guard = self.lock.lock();
        *self.owner.lock() = Some(current);
        Some(BuildGuard {
            owner: &self.owner,
            _guard: guard,
        })
    }
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        // Runs before `_guard` releases the build lock
        *self.owner.lock() = None;
    }
}
