//! Non-interactive divider rows.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::MenuContext;
use crate::render::{class, ElementHandle};

use super::entry::{EntryId, IdGenerator, MenuEntry};

/// A visual divider. No activation, not focusable.
#[derive(Clone)]
pub struct Separator {
    inner: Rc<SeparatorInner>,
}

struct SeparatorInner {
    id: RefCell<Option<String>>,
    row: RefCell<Option<ElementHandle>>,
}

impl Separator {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(SeparatorInner {
                id: RefCell::new(None),
                row: RefCell::new(None),
            }),
        }
    }

    /// Explicit document id. Without one, the owning menu assigns an id when
    /// the separator is added.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        *self.inner.id.borrow_mut() = Some(id.into());
        self
    }

    pub fn id(&self) -> Option<String> {
        self.inner.id.borrow().clone()
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuEntry for Separator {
    fn entry_id(&self) -> EntryId {
        EntryId(Rc::as_ptr(&self.inner) as usize)
    }

    fn render(&self, parent: &ElementHandle, _ctx: &MenuContext) -> ElementHandle {
        let existing = self.inner.row.borrow().clone();
        let row = if let Some(row) = existing {
            row
        } else {
            let row = parent.create_element(
                "li",
                &[
                    ("class", class::SEPARATOR),
                    ("role", "separator"),
                    ("aria-orientation", "horizontal"),
                ],
            );
            if let Some(id) = self.inner.id.borrow().as_ref() {
                row.set_attribute("id", id);
            }
            *self.inner.row.borrow_mut() = Some(row.clone());
            row
        };

        let already_in_parent = row
            .parent()
            .map(|p| p.id() == parent.id())
            .unwrap_or(false);
        if !already_in_parent {
            parent.append_child(&row);
        }
        row
    }

    fn remove(&self) {
        if let Some(row) = self.inner.row.borrow_mut().take() {
            row.detach();
        }
    }

    fn assign_id(&self, ids: &IdGenerator) {
        let mut id = self.inner.id.borrow_mut();
        if id.is_none() {
            *id = Some(ids.next_id("menu-separator"));
        }
    }
}
