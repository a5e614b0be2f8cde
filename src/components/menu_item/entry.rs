//! The shared capability set of menu entries.
//!
//! Entries are composed, not inherited: every entry implements the small
//! [`MenuEntry`] contract, and optional capabilities (focus, nested menu)
//! are discovered by capability-presence through the `as_*` accessors, never
//! by structural probing.

use std::cell::Cell;

use crate::context::MenuContext;
use crate::events::Subscription;
use crate::render::ElementHandle;

use super::super::submenu::SubmenuItem;

/// Identity of an entry, stable for its lifetime. Used by
/// `ContextMenu::remove_item` to find the entry in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryId(pub(crate) usize);

/// Fired when an action item activates (pointer click or programmatic
/// `click()`), carrying the context of the menu open it happened in.
#[derive(Debug, Clone)]
pub struct ActivationEvent {
    pub context: MenuContext,
}

/// One entry in a menu's ordered list.
///
/// `render` is idempotent: re-rendering into the same parent must not
/// duplicate the element. `remove` detaches and forgets the element so a
/// later `render` recreates it.
pub trait MenuEntry {
    fn entry_id(&self) -> EntryId;

    fn render(&self, parent: &ElementHandle, ctx: &MenuContext) -> ElementHandle;

    fn remove(&self);

    /// Subscribe to activation. Entries without activation (separators,
    /// submenu rows) return `None`.
    fn on_activate(&self, handler: Box<dyn Fn(&ActivationEvent)>) -> Option<Subscription> {
        let _ = handler;
        None
    }

    /// Called by the owning menu when the entry is added, so entries that
    /// want a document id can draw one from the menu-owned generator.
    fn assign_id(&self, ids: &IdGenerator) {
        let _ = ids;
    }

    fn as_focusable(&self) -> Option<&dyn Focusable> {
        None
    }

    fn as_submenu(&self) -> Option<&SubmenuItem> {
        None
    }
}

/// Optional capability: entries keyboard focus can land on.
pub trait Focusable {
    fn focus(&self);
    fn blur(&self);
    /// Programmatic activation. Suppressed while disabled.
    fn click(&self);
    fn is_disabled(&self) -> bool;
}

/// Id source owned by a menu, scoped to its lifetime.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: Cell<u64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, kind: &str) -> String {
        let n = self.next.get();
        self.next.set(n + 1);
        format!("{kind}-{n}")
    }
}
