use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::lock_api::ArcRwLockReadGuard;
use parking_lot::{RawRwLock, RwLock, RwLockWriteGuard};

/// Reader/writer lock shared by a dataset and everyone reading it.
///
/// Producers take the write side while mutating; the chart holds an owned
/// read guard from pre-layout until post-layout.
#[derive(Debug, Clone, Default)]
pub struct DataSetLock {
    inner: Arc<RwLock<()>>,
    readers: Arc<AtomicUsize>,
}

/// Owned read guard, releasing the lock on drop.
pub struct DataSetReadGuard {
    _guard: ArcRwLockReadGuard<RawRwLock, ()>,
    readers: Arc<AtomicUsize>,
}

impl fmt::Debug for DataSetReadGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSetReadGuard").finish_non_exhaustive()
    }
}

impl Drop for DataSetReadGuard {
    fn drop(&mut self) {
        self.readers.fetch_sub(1, Ordering::AcqRel);
    }
}

impl DataSetLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no writer holds the lock.
    #[must_use]
    pub fn read_owned(&self) -> DataSetReadGuard {
        let guard = self.inner.read_arc();
        self.readers.fetch_add(1, Ordering::AcqRel);
        DataSetReadGuard {
            _guard: guard,
            readers: Arc::clone(&self.readers),
        }
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write()
    }

    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, ()>> {
        self.inner.try_write()
    }

    /// Number of live read guards handed out by [`read_owned`](Self::read_owned).
    #[must_use]
    pub fn reader_count(&self) -> usize {
        self.readers.load(Ordering::Acquire)
    }
}
