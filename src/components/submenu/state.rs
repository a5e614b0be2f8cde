//! Phase machine for a submenu cascade.
//!
//! Timer-driven transitions are epoch-guarded: every transition that
//! invalidates an outstanding timer bumps the epoch, and the timer callback
//! presents the epoch it was scheduled under. A stale callback is refused
//! instead of acting on state it no longer owns.

use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Closed,
    /// Hover-intent timer running, nothing visible yet.
    PendingOpen,
    /// Open via hover; closes after the linger delay once unhovered.
    OpenHover,
    /// Open via click or keyboard; survives pointer leave.
    OpenPinned,
}

#[derive(Debug)]
pub(crate) struct CascadeState {
    phase: Cell<Phase>,
    epoch: Cell<u64>,
}

impl CascadeState {
    pub(crate) fn new() -> Self {
        Self {
            phase: Cell::new(Phase::Closed),
            epoch: Cell::new(0),
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(self.phase.get(), Phase::OpenHover | Phase::OpenPinned)
    }

    pub(crate) fn is_pinned(&self) -> bool {
        self.phase.get() == Phase::OpenPinned
    }

    fn bump(&self) -> u64 {
        let epoch = self.epoch.get() + 1;
        self.epoch.set(epoch);
        epoch
    }

    /// Start the hover-intent window. Returns the epoch the open timer must
    /// present when it elapses.
    pub(crate) fn begin_pending(&self) -> u64 {
        self.phase.set(Phase::PendingOpen);
        self.bump()
    }

    /// Open timer elapsed. True only when the pending open is still the
    /// current one; the caller then performs the actual open.
    pub(crate) fn hover_open_elapsed(&self, epoch: u64) -> bool {
        if self.epoch.get() != epoch || self.phase.get() != Phase::PendingOpen {
            return false;
        }
        self.phase.set(Phase::OpenHover);
        true
    }

    /// Start the close linger after a pointer leave. Returns the epoch the
    /// close timer must present.
    pub(crate) fn begin_linger(&self) -> u64 {
        self.bump()
    }

    /// Linger timer elapsed. True only when nothing re-armed the state in
    /// the meantime and the cascade is still hover-open.
    pub(crate) fn linger_elapsed(&self, epoch: u64) -> bool {
        if self.epoch.get() != epoch || self.phase.get() != Phase::OpenHover {
            return false;
        }
        self.phase.set(Phase::Closed);
        true
    }

    pub(crate) fn open(&self, pinned: bool) {
        self.phase.set(if pinned {
            Phase::OpenPinned
        } else {
            Phase::OpenHover
        });
        self.bump();
    }

    /// Close and invalidate every outstanding timer.
    pub(crate) fn close(&self) {
        self.phase.set(Phase::Closed);
        self.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_open_happy_path() {
        let state = CascadeState::new();
        let epoch = state.begin_pending();
        assert_eq!(state.phase(), Phase::PendingOpen);
        assert!(state.hover_open_elapsed(epoch));
        assert_eq!(state.phase(), Phase::OpenHover);
        assert!(!state.is_pinned());
    }

    #[test]
    fn test_stale_open_timer_is_refused() {
        let state = CascadeState::new();
        let epoch = state.begin_pending();
        state.close();
        assert!(!state.hover_open_elapsed(epoch));
        assert_eq!(state.phase(), Phase::Closed);

        // A fresh pending open invalidates the older epoch too.
        let first = state.begin_pending();
        let second = state.begin_pending();
        assert!(!state.hover_open_elapsed(first));
        assert!(state.hover_open_elapsed(second));
    }

    #[test]
    fn test_linger_closes_only_unpinned() {
        let state = CascadeState::new();
        state.open(false);
        let epoch = state.begin_linger();
        assert!(state.linger_elapsed(epoch));
        assert_eq!(state.phase(), Phase::Closed);

        state.open(true);
        let epoch = state.begin_linger();
        assert!(!state.linger_elapsed(epoch));
        assert!(state.is_pinned());
    }

    #[test]
    fn test_reentry_invalidates_linger() {
        let state = CascadeState::new();
        state.open(false);
        let epoch = state.begin_linger();
        // Pointer came back: a new linger supersedes the old one.
        let newer = state.begin_linger();
        assert!(!state.linger_elapsed(epoch));
        assert!(state.linger_elapsed(newer));
    }
}
