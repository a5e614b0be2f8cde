//! Timer scheduling.
//!
//! The only suspension points in the engine are one-shot timers (the
//! hover-open delay and the hover-close linger). [`TimerHost`] is the seam;
//! [`EventLoopTimers`] is the calloop-backed implementation for real
//! applications, and `testing::ManualTimers` drives tests deterministically.
//!
//! Cancellation is a shared flag checked before the callback runs, never
//! source removal: a cancelled timer that still fires is a defined no-op.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::LoopHandle;

/// A pending one-shot timer. Dropping the guard cancels the timer; dropping
/// it after the callback has fired does nothing.
#[must_use = "dropping a TimerGuard cancels the timer"]
pub struct TimerGuard {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerGuard {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard that cancels nothing, for timers that could not be scheduled.
    pub fn inert() -> Self {
        Self { cancel: None }
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerGuard")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// Schedules one-shot callbacks on the host's event loop.
pub trait TimerHost {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerGuard;
}

/// [`TimerHost`] backed by a calloop event loop.
///
/// Each timeout inserts its own one-shot timer source. The source always
/// returns [`TimeoutAction::Drop`], so nothing ever needs to be removed;
/// cancellation flips the shared flag and the stale wakeup does nothing.
pub struct EventLoopTimers<D: 'static> {
    handle: LoopHandle<'static, D>,
}

impl<D> EventLoopTimers<D> {
    pub fn new(handle: LoopHandle<'static, D>) -> Self {
        Self { handle }
    }
}

impl<D> TimerHost for EventLoopTimers<D> {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerGuard {
        let cancelled = Rc::new(Cell::new(false));
        let slot = RefCell::new(Some(callback));

        let flag = cancelled.clone();
        let registered = self
            .handle
            .insert_source(Timer::from_duration(delay), move |_deadline, _, _| {
                if !flag.get() {
                    if let Some(callback) = slot.borrow_mut().take() {
                        callback();
                    }
                }
                TimeoutAction::Drop
            });

        if registered.is_err() {
            tracing::warn!(?delay, "failed to register timer source; timeout dropped");
            return TimerGuard::inert();
        }

        tracing::trace!(?delay, "timer scheduled");
        TimerGuard::new(move || cancelled.set(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_guard_drop_runs_cancel_once() {
        let cancels = Rc::new(Cell::new(0));
        let cancels2 = cancels.clone();
        let guard = TimerGuard::new(move || cancels2.set(cancels2.get() + 1));
        drop(guard);
        assert_eq!(cancels.get(), 1);
    }

    #[test]
    fn test_inert_guard_is_silent() {
        drop(TimerGuard::inert());
    }
}
