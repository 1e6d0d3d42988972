//! Cancelable timer contracts and a virtual-clock adapter.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// Callback run when a timer fires.
pub type TimerCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle returned by [`TimerService::set_timeout`].
pub struct TimerHandle(pub i32);

/// Host service for one-shot timers on the UI thread.
pub trait TimerService {
    /// Runs `callback` once after `delay_ms` milliseconds.
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerHandle;

    /// Cancels a pending timer. Fired or unknown handles are ignored.
    fn clear_timeout(&self, handle: TimerHandle);
}

struct PendingTimer {
    due_ms: u64,
    handle: TimerHandle,
    callback: TimerCallback,
}

#[derive(Default)]
struct ManualTimerInner {
    now_ms: Cell<u64>,
    next_handle: Cell<i32>,
    pending: RefCell<Vec<PendingTimer>>,
}

#[derive(Clone, Default)]
/// Timer service driven by an explicit virtual clock. Clones share the clock.
///
/// Timers fire in due order (ties in scheduling order) and may schedule further timers, which
/// fire within the same [`ManualTimerService::advance`] call when they fall inside the window.
pub struct ManualTimerService {
    inner: Rc<ManualTimerInner>,
}

impl ManualTimerService {
    /// Returns the virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.inner.now_ms.get()
    }

    /// Returns the number of timers that have not fired or been cleared.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Advances the virtual clock by `ms`, firing every timer that comes due.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms().saturating_add(ms);
        while let Some(timer) = self.take_next_due(target) {
            self.inner.now_ms.set(timer.due_ms);
            (timer.callback)();
        }
        self.inner.now_ms.set(target);
    }

    fn take_next_due(&self, target: u64) -> Option<PendingTimer> {
        let mut pending = self.inner.pending.borrow_mut();
        // Handles increase monotonically, so they double as a scheduling sequence.
        let index = pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= target)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.handle))
            .map(|(index, _)| index)?;
        Some(pending.remove(index))
    }
}

impl TimerService for ManualTimerService {
    fn set_timeout(&self, delay_ms: u32, callback: TimerCallback) -> TimerHandle {
        let handle = TimerHandle(self.inner.next_handle.get().wrapping_add(1));
        self.inner.next_handle.set(handle.0);
        self.inner.pending.borrow_mut().push(PendingTimer {
            due_ms: self.now_ms().saturating_add(u64::from(delay_ms)),
            handle,
            callback,
        });
        handle
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.inner
            .pending
            .borrow_mut()
            .retain(|timer| timer.handle != handle);
    }
}
