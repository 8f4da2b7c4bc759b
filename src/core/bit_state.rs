use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::{ChartError, ChartResult};

/// Filter value accepting every bit.
pub const NO_FILTER: u32 = !0;

/// Receiver of dirty bits emitted by a render-thread [`BitState`].
pub trait StateListener {
    fn accept(&self, source: &BitState, bits: u32);
}

struct FnStateListener<F>(F);

impl<F: Fn(&BitState, u32)> StateListener for FnStateListener<F> {
    fn accept(&self, source: &BitState, bits: u32) {
        (self.0)(source, bits);
    }
}

/// Wraps a closure as a shareable listener.
///
/// Keep the returned `Rc` around if the listener needs to be removed later,
/// removal matches by identity.
pub fn state_listener(listener: impl Fn(&BitState, u32) + 'static) -> Rc<dyn StateListener> {
    Rc::new(FnStateListener(listener))
}

/// Registered listener, optionally restricted to a sub-mask.
#[derive(Clone)]
pub(crate) struct ListenerEntry<P> {
    pub(crate) filter: Option<u32>,
    pub(crate) listener: P,
}

impl<P> ListenerEntry<P> {
    pub(crate) fn new(filter: Option<u32>, listener: P) -> Self {
        Self { filter, listener }
    }

    /// Bits this entry should receive, `None` when it must stay silent.
    pub(crate) fn filtered(&self, bits: u32) -> Option<u32> {
        match self.filter {
            None => Some(bits),
            Some(filter) => {
                let intersection = filter & bits;
                (intersection != 0).then_some(intersection)
            }
        }
    }
}

pub(crate) type ListenerList<P> = SmallVec<[ListenerEntry<P>; 4]>;

/// Removes every entry matching `is_target`.
///
/// Fails when more than one registration matched since it is ambiguous which
/// one the caller meant.
pub(crate) fn remove_listener<P>(
    list: &mut ListenerList<P>,
    owner: &str,
    is_target: impl Fn(&P) -> bool,
) -> ChartResult<bool> {
    let matches = list
        .iter()
        .filter(|entry| is_target(&entry.listener))
        .count();
    if matches > 1 {
        return Err(ChartError::AmbiguousListenerRemoval {
            owner: owner.to_owned(),
        });
    }
    list.retain(|entry| !is_target(&entry.listener));
    Ok(matches == 1)
}

/// Dirty-flag register owned by exactly one entity (axis, chart, renderer).
///
/// Lives on the render thread. Mutation goes through `&self`, so a state can
/// be shared (`Rc`) between its owner and the listeners observing it.
pub struct BitState {
    owner: String,
    filter: u32,
    state: Cell<u32>,
    change_listeners: RefCell<ListenerList<Rc<dyn StateListener>>>,
    invalidate_listeners: RefCell<ListenerList<Rc<dyn StateListener>>>,
}

impl BitState {
    #[must_use]
    pub fn init_clean(owner: impl Into<String>, filter: u32) -> Self {
        Self::with_initial(owner.into(), filter, 0)
    }

    /// Starts with every filtered bit set, so the first layout always runs.
    #[must_use]
    pub fn init_dirty(owner: impl Into<String>, filter: u32) -> Self {
        Self::with_initial(owner.into(), filter, filter)
    }

    fn with_initial(owner: String, filter: u32, initial: u32) -> Self {
        Self {
            owner,
            filter,
            state: Cell::new(initial & filter),
            change_listeners: RefCell::new(SmallVec::new()),
            invalidate_listeners: RefCell::new(SmallVec::new()),
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
        let current = self.state.get();
        let delta = (current ^ masked) & masked;
        if delta != 0 {
            self.state.set(current | masked);
            self.notify(&self.change_listeners, delta);
        }
        self.notify(&self.invalidate_listeners, masked);
    }

    #[must_use]
    pub fn bits(&self) -> u32 {
        self.state.get()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.get() != 0
    }

    /// True when any bit of `mask` is set.
    #[must_use]
    pub fn is_dirty_bits(&self, mask: u32) -> bool {
        self.state.get() & mask != 0
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.state.get() == 0
    }

    /// True when no bit of `mask` is set.
    #[must_use]
    pub fn is_clean_bits(&self, mask: u32) -> bool {
        self.state.get() & mask == 0
    }

    pub fn clear(&self) {
        self.state.set(0);
    }

    /// Clears `mask` and returns the remaining bits.
    pub fn clear_bits(&self, mask: u32) -> u32 {
        let remaining = self.state.get() & !mask;
        self.state.set(remaining);
        remaining
    }

    /// Action marking `bits` dirty, used to wire explicit property changes.
    ///
    /// Holds the state weakly, so a dropped owner turns the action into a no-op.
    pub fn on_action(self: &Rc<Self>, bits: u32) -> impl Fn() + 'static {
        let state = Rc::downgrade(self);
        move || {
            if let Some(state) = state.upgrade() {
                state.set_dirty(bits);
            }
        }
    }

    pub fn add_change_listener(&self, listener: Rc<dyn StateListener>) -> &Self {
        self.change_listeners
            .borrow_mut()
            .push(ListenerEntry::new(None, listener));
        self
    }

    pub fn add_change_listener_filtered(
        &self,
        filter: u32,
        listener: Rc<dyn StateListener>,
    ) -> &Self {
        self.change_listeners
            .borrow_mut()
            .push(ListenerEntry::new(Some(filter), listener));
        self
    }

    pub fn add_invalidate_listener(&self, listener: Rc<dyn StateListener>) -> &Self {
        self.invalidate_listeners
            .borrow_mut()
            .push(ListenerEntry::new(None, listener));
        self
    }

    pub fn add_invalidate_listener_filtered(
        &self,
        filter: u32,
        listener: Rc<dyn StateListener>,
    ) -> &Self {
        self.invalidate_listeners
            .borrow_mut()
            .push(ListenerEntry::new(Some(filter), listener));
        self
    }

    pub fn remove_change_listener(&self, listener: &Rc<dyn StateListener>) -> ChartResult<bool> {
        remove_listener(
            &mut self.change_listeners.borrow_mut(),
            &self.owner,
            |entry| same_listener(entry, listener),
        )
    }

    pub fn remove_invalidate_listener(
        &self,
        listener: &Rc<dyn StateListener>,
    ) -> ChartResult<bool> {
        remove_listener(
            &mut self.invalidate_listeners.borrow_mut(),
            &self.owner,
            |entry| same_listener(entry, listener),
        )
    }

    #[must_use]
    pub fn change_listener_count(&self) -> usize {
        self.change_listeners.borrow().len()
    }

    #[must_use]
    pub fn invalidate_listener_count(&self) -> usize {
        self.invalidate_listeners.borrow().len()
    }

    fn notify(
        &self,
        list: &RefCell<ListenerList<Rc<dyn StateListener>>>,
        bits: u32,
    ) {
        // Snapshot so listeners may (un)register while being notified.
        let snapshot = list.borrow().clone();
        for entry in &snapshot {
            if let Some(filtered) = entry.filtered(bits) {
                entry.listener.accept(self, filtered);
            }
        }
    }
}

impl StateListener for BitState {
    fn accept(&self, _source: &BitState, bits: u32) {
        self.set_dirty(bits);
    }
}

impl fmt::Debug for BitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitState")
            .field("owner", &self.owner)
            .field("filter", &format_args!("{:#x}", self.filter))
            .field("state", &format_args!("{:#x}", self.state.get()))
            .finish()
    }
}

fn same_listener(left: &Rc<dyn StateListener>, right: &Rc<dyn StateListener>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{BitState, NO_FILTER, StateListener, state_listener};
    use crate::error::ChartError;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, Rc<dyn StateListener>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let listener = state_listener(move |_, bits| sink.borrow_mut().push(bits));
        (seen, listener)
    }

    #[test]
    fn set_dirty_reports_only_the_delta_to_change_listeners() {
        let state = BitState::init_clean("axis", NO_FILTER);
        let (seen, listener) = recorder();
        state.add_change_listener(listener);

        state.set_dirty(0b0011);
        state.set_dirty(0b0110);
        state.set_dirty(0b0110);

        assert_eq!(*seen.borrow(), vec![0b0011, 0b0100]);
        assert_eq!(state.bits(), 0b0111);
    }

    #[test]
    fn invalidate_listeners_fire_on_every_call() {
        let state = BitState::init_clean("axis", 0b1111);
        let (seen, listener) = recorder();
        state.add_invalidate_listener(listener);

        state.set_dirty(0b1_0001);
        state.set_dirty(0b1_0001);

        assert_eq!(*seen.borrow(), vec![0b0001, 0b0001]);
    }

    #[test]
    fn filtered_listener_receives_intersection_only() {
        let state = BitState::init_clean("chart", NO_FILTER);
        let (seen, listener) = recorder();
        state.add_change_listener_filtered(0b0100, listener);

        state.set_dirty(0b0011);
        state.set_dirty(0b1100);

        assert_eq!(*seen.borrow(), vec![0b0100]);
    }

    #[test]
    fn disjoint_mask_changes_nothing() {
        let state = BitState::init_clean("chart", 0b0011);
        let (seen, listener) = recorder();
        state.add_change_listener(listener);

        state.set_dirty(0b1100);

        assert!(seen.borrow().is_empty());
        assert!(state.is_clean());
    }

    #[test]
    fn init_dirty_starts_with_filter_bits() {
        let state = BitState::init_dirty("chart", 0b1010);
        assert_eq!(state.bits(), 0b1010);
        assert!(state.is_dirty_bits(0b0010));
        assert!(state.is_clean_bits(0b0101));
    }

    #[test]
    fn clear_bits_returns_remaining_state() {
        let state = BitState::init_dirty("chart", 0b1111);
        assert_eq!(state.clear_bits(0b0101), 0b1010);
        state.clear();
        assert!(state.is_clean());
    }

    #[test]
    fn bit_state_forwards_into_chained_state() {
        let axis = BitState::init_clean("axis", NO_FILTER);
        let chart = Rc::new(BitState::init_clean("chart", NO_FILTER));
        axis.add_change_listener(chart.clone());

        axis.set_dirty(0b1000);

        assert_eq!(chart.bits(), 0b1000);
    }

    #[test]
    fn on_action_marks_bits_while_state_is_alive() {
        let state = Rc::new(BitState::init_clean("axis", NO_FILTER));
        let action = state.on_action(0b10);
        action();
        assert_eq!(state.bits(), 0b10);

        drop(state);
        action();
    }

    #[test]
    fn removing_duplicate_registration_is_rejected() {
        let state = BitState::init_clean("axis", NO_FILTER);
        let (_, listener) = recorder();
        state.add_change_listener(listener.clone());
        state.add_change_listener_filtered(0b1, listener.clone());

        let result = state.remove_change_listener(&listener);
        assert!(matches!(
            result,
            Err(ChartError::AmbiguousListenerRemoval { .. })
        ));
        assert_eq!(state.change_listener_count(), 2);
    }

    #[test]
    fn removing_single_registration_succeeds() {
        let state = BitState::init_clean("axis", NO_FILTER);
        let (seen, listener) = recorder();
        let (_, other) = recorder();
        state.add_change_listener(listener.clone());

        assert!(!state.remove_change_listener(&other).expect("unknown listener"));
        assert!(state.remove_change_listener(&listener).expect("remove"));
        state.set_dirty(0b1);
        assert!(seen.borrow().is_empty());
    }
}
