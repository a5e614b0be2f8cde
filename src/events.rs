//! Scoped event subscriptions.
//!
//! Registration returns a [`Subscription`]; dropping it deterministically
//! unregisters the handler. There is no "fetch the handler by key and null
//! it out" bookkeeping anywhere in the crate.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// A live registration. Dropping it unregisters the handler.
///
/// [`Subscription::forever`] produces a subscription that never unregisters,
/// for handlers that should live as long as their target.
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription whose drop does nothing.
    pub fn forever() -> Self {
        Self { cancel: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

struct Entry<E> {
    id: u64,
    handler: Rc<dyn Fn(&E)>,
}

/// An observer list: `subscribe` returns a [`Subscription`], `emit` calls
/// every currently registered handler.
///
/// Handlers are snapshotted before dispatch, so a handler may subscribe or
/// unsubscribe (including itself) while an emit is in flight.
pub struct Listeners<E> {
    entries: Rc<RefCell<Vec<Entry<E>>>>,
    next_id: Cell<u64>,
}

impl<E: 'static> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> Listeners<E> {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push(Entry {
            id,
            handler: Rc::new(handler),
        });

        let entries: Weak<RefCell<Vec<Entry<E>>>> = Rc::downgrade(&self.entries);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                entries.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }

    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Rc<dyn Fn(&E)>> = self
            .entries
            .borrow()
            .iter()
            .map(|entry| entry.handler.clone())
            .collect();
        for handler in snapshot {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_subscription_drop_unregisters() {
        let listeners: Listeners<u32> = Listeners::new();
        let hits = Rc::new(Cell::new(0));

        let hits2 = hits.clone();
        let sub = listeners.subscribe(move |n| hits2.set(hits2.get() + n));
        listeners.emit(&1);
        assert_eq!(hits.get(), 1);

        drop(sub);
        listeners.emit(&1);
        assert_eq!(hits.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_emit_tolerates_unsubscribe_during_dispatch() {
        let listeners: Rc<Listeners<()>> = Rc::new(Listeners::new());
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot2 = slot.clone();
        let sub = listeners.subscribe(move |_| {
            // Handler removes itself mid-dispatch.
            slot2.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        listeners.emit(&());
        assert!(listeners.is_empty());
        listeners.emit(&());
    }

    #[test]
    fn test_forever_subscription_is_inert() {
        let listeners: Listeners<u32> = Listeners::new();
        let _sub = listeners.subscribe(|_| {});
        drop(Subscription::forever());
        assert!(!listeners.is_empty());
    }
}
