use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use smallvec::SmallVec;

use super::bit_state::{ListenerEntry, ListenerList, remove_listener};
use crate::error::ChartResult;

/// Receiver of dirty bits emitted by a [`SyncBitState`].
///
/// Listeners run on whichever thread called `set_dirty`; anything touching
/// render-thread state must hand the work over instead of doing it inline.
pub trait SyncStateListener: Send + Sync {
    fn accept(&self, source: &SyncBitState, bits: u32);
}

struct FnSyncStateListener<F>(F);

impl<F: Fn(&SyncBitState, u32) + Send + Sync> SyncStateListener for FnSyncStateListener<F> {
    fn accept(&self, source: &SyncBitState, bits: u32) {
        (self.0)(source, bits);
    }
}

pub fn sync_state_listener(
    listener: impl Fn(&SyncBitState, u32) + Send + Sync + 'static,
) -> Arc<dyn SyncStateListener> {
    Arc::new(FnSyncStateListener(listener))
}

type SyncListenerList = ListenerList<Arc<dyn SyncStateListener>>;

/// Dirty-flag register that may be mutated from any thread.
///
/// The bitmask is a single atomic, so a write on one thread is observed by the
/// next read on any other thread.
pub struct SyncBitState {
    owner: String,
    filter: u32,
    state: AtomicU32,
    change_listeners: Mutex<SyncListenerList>,
    invalidate_listeners: Mutex<SyncListenerList>,
}

impl SyncBitState {
    #[must_use]
    pub fn init_clean(owner: impl Into<String>, filter: u32) -> Self {
        Self::with_initial(owner.into(), filter, 0)
    }

    #[must_use]
    pub fn init_dirty(owner: impl Into<String>, filter: u32) -> Self {
        Self::with_initial(owner.into(), filter, filter)
    }

    fn with_initial(owner: String, filter: u32, initial: u32) -> Self {
        Self {
            owner,
            filter,
            state: AtomicU32::new(initial & filter),
            change_listeners: Mutex::new(SmallVec::new()),
            invalidate_listeners: Mutex::new(SmallVec::new()),
        }
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn filter(&self) -> u32 {
        self.filter
    }

    pub fn set_dirty(&self, bits: u32) {
        let masked = bits & self.filter;
        let previous = self.state.fetch_or(masked, Ordering::AcqRel);
        let delta = (previous ^ masked) & masked;
        if delta != 0 {
            self.notify(&self.change_listeners, delta);
        }
        self.notify(&self.invalidate_listeners, masked);
    }

    #[must_use]
    pub fn bits(&self) -> u32 {
        self.state.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.bits() != 0
    }

    #[must_use]
    pub fn is_dirty_bits(&self, mask: u32) -> bool {
        self.bits() & mask != 0
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.bits() == 0
    }

    #[must_use]
    pub fn is_clean_bits(&self, mask: u32) -> bool {
        self.bits() & mask == 0
    }

    pub fn clear(&self) {
        self.state.store(0, Ordering::Release);
    }

    pub fn clear_bits(&self, mask: u32) -> u32 {
        self.state.fetch_and(!mask, Ordering::AcqRel) & !mask
    }

    pub fn add_change_listener(&self, listener: Arc<dyn SyncStateListener>) -> &Self {
        self.change_listeners
            .lock()
            .push(ListenerEntry::new(None, listener));
        self
    }

    pub fn add_change_listener_filtered(
        &self,
        filter: u32,
        listener: Arc<dyn SyncStateListener>,
    ) -> &Self {
        self.change_listeners
            .lock()
            .push(ListenerEntry::new(Some(filter), listener));
        self
    }

    pub fn add_invalidate_listener(&self, listener: Arc<dyn SyncStateListener>) -> &Self {
        self.invalidate_listeners
            .lock()
            .push(ListenerEntry::new(None, listener));
        self
    }

    pub fn remove_change_listener(
        &self,
        listener: &Arc<dyn SyncStateListener>,
    ) -> ChartResult<bool> {
        remove_listener(&mut self.change_listeners.lock(), &self.owner, |entry| {
            same_listener(entry, listener)
        })
    }

    pub fn remove_invalidate_listener(
        &self,
        listener: &Arc<dyn SyncStateListener>,
    ) -> ChartResult<bool> {
        remove_listener(&mut self.invalidate_listeners.lock(), &self.owner, |entry| {
            same_listener(entry, listener)
        })
    }

    #[must_use]
    pub fn invalidate_listener_count(&self) -> usize {
        self.invalidate_listeners.lock().len()
    }

    #[must_use]
    pub fn change_listener_count(&self) -> usize {
        self.change_listeners.lock().len()
    }

    fn notify(&self, list: &Mutex<SyncListenerList>, bits: u32) {
        // Never call out while holding the lock, listeners may re-enter.
        let snapshot = list.lock().clone();
        for entry in &snapshot {
            if let Some(filtered) = entry.filtered(bits) {
                entry.listener.accept(self, filtered);
            }
        }
    }
}

impl SyncStateListener for SyncBitState {
    fn accept(&self, _source: &SyncBitState, bits: u32) {
        self.set_dirty(bits);
    }
}

impl fmt::Debug for SyncBitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncBitState")
            .field("owner", &self.owner)
            .field("filter", &format_args!("{:#x}", self.filter))
            .field("state", &format_args!("{:#x}", self.bits()))
            .finish()
    }
}

fn same_listener(left: &Arc<dyn SyncStateListener>, right: &Arc<dyn SyncStateListener>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}
