//! Deterministic timer host for tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::timers::{TimerGuard, TimerHost};

struct Pending {
    seq: u64,
    deadline: Duration,
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnOnce()>,
}

/// [`TimerHost`] driven by explicit [`advance`](ManualTimers::advance)
/// calls. Due callbacks run in deadline order (insertion order for ties),
/// outside any internal borrow, so they may schedule or cancel further
/// timers freely.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<Duration>,
    queue: RefCell<Vec<Pending>>,
    next_seq: Cell<u64>,
}

impl ManualTimers {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_count(&self) -> usize {
        let mut queue = self.queue.borrow_mut();
        queue.retain(|pending| !pending.cancelled.get());
        queue.len()
    }

    pub fn advance(&self, delta: Duration) {
        let target = self.now.get() + delta;
        loop {
            let next = {
                let mut queue = self.queue.borrow_mut();
                queue.retain(|pending| !pending.cancelled.get());
                let due = queue
                    .iter()
                    .enumerate()
                    .filter(|(_, pending)| pending.deadline <= target)
                    .min_by_key(|(_, pending)| (pending.deadline, pending.seq))
                    .map(|(index, _)| index);
                due.map(|index| queue.remove(index))
            };
            let Some(pending) = next else {
                break;
            };
            if pending.deadline > self.now.get() {
                self.now.set(pending.deadline);
            }
            (pending.callback)();
        }
        self.now.set(target);
    }
}

impl TimerHost for ManualTimers {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerGuard {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        let cancelled = Rc::new(Cell::new(false));
        self.queue.borrow_mut().push(Pending {
            seq,
            deadline: self.now.get() + delay,
            cancelled: cancelled.clone(),
            callback,
        });
        TimerGuard::new(move || cancelled.set(true))
    }
}
