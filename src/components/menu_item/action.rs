//! The action item leaf: a focusable row with a label, an optional icon and
//! a disabled flag.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::context::MenuContext;
use crate::events::{Listeners, Subscription};
use crate::render::{class, ElementEvent, ElementHandle};

use super::entry::{ActivationEvent, EntryId, Focusable, MenuEntry};

/// A clickable menu row. Cheap-clone handle over shared state.
#[derive(Clone)]
pub struct ActionItem {
    inner: Rc<ItemInner>,
}

pub(crate) struct ItemInner {
    label: String,
    icon: RefCell<Option<String>>,
    disabled: Cell<bool>,
    row: RefCell<Option<ElementHandle>>,
    button: RefCell<Option<ElementHandle>>,
    click_sub: RefCell<Option<Subscription>>,
    ctx: RefCell<Option<MenuContext>>,
    activations: Listeners<ActivationEvent>,
}

impl ActionItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ItemInner {
                label: label.into(),
                icon: RefCell::new(None),
                disabled: Cell::new(false),
                row: RefCell::new(None),
                button: RefCell::new(None),
                click_sub: RefCell::new(None),
                ctx: RefCell::new(None),
                activations: Listeners::new(),
            }),
        }
    }

    /// Icon class added to the row's icon span. Takes effect on the next
    /// (usually first) render.
    pub fn with_icon(self, icon: impl Into<String>) -> Self {
        *self.inner.icon.borrow_mut() = Some(icon.into());
        self
    }

    pub fn disabled(self) -> Self {
        self.inner.disabled.set(true);
        self
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.disabled.set(disabled);
        if let Some(button) = self.inner.button.borrow().as_ref() {
            button.set_class(class::DISABLED, disabled);
            button.set_attribute("aria-disabled", if disabled { "true" } else { "false" });
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.get()
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Subscribe to activation. The handler lives until the subscription is
    /// dropped, independently of render/remove cycles.
    pub fn on_activate(&self, handler: impl Fn(&ActivationEvent) + 'static) -> Subscription {
        self.inner.activations.subscribe(handler)
    }

    pub fn focus(&self) {
        if let Some(button) = self.inner.button.borrow().as_ref() {
            button.set_class(class::FOCUSED, true);
            button.focus();
        }
    }

    pub fn blur(&self) {
        if let Some(button) = self.inner.button.borrow().as_ref() {
            button.set_class(class::FOCUSED, false);
            button.blur();
        }
    }

    /// Programmatic activation, same path as a pointer click.
    pub fn click(&self) {
        self.inner.activate();
    }

    pub(crate) fn row_element(&self) -> Option<ElementHandle> {
        self.inner.row.borrow().clone()
    }

    pub(crate) fn button_element(&self) -> Option<ElementHandle> {
        self.inner.button.borrow().clone()
    }

    pub(crate) fn current_context(&self) -> Option<MenuContext> {
        self.inner.ctx.borrow().clone()
    }

    /// Render the row, optionally without the standard click-to-activate
    /// wiring (submenu rows install their own toggle handler instead).
    pub(crate) fn render_base(
        &self,
        parent: &ElementHandle,
        ctx: &MenuContext,
        wire_activation: bool,
    ) -> ElementHandle {
        *self.inner.ctx.borrow_mut() = Some(ctx.clone());

        let existing = self.inner.row.borrow().clone();
        let row = if let Some(row) = existing {
            row
        } else {
            let row = parent.create_element("li", &[("class", class::ITEM), ("role", "none")]);
            let button = row.create_element(
                "button",
                &[("class", class::ITEM), ("role", "menuitem"), ("type", "button")],
            );
            button.set_text(&self.inner.label);
            if let Some(icon) = self.inner.icon.borrow().as_ref() {
                let span = button.create_element("span", &[("class", class::ICON)]);
                span.set_class(icon, true);
                button.append_child(&span);
            }
            if self.inner.disabled.get() {
                button.set_class(class::DISABLED, true);
                button.set_attribute("aria-disabled", "true");
            }
            row.append_child(&button);

            if wire_activation {
                let weak = Rc::downgrade(&self.inner);
                let sub = button.on(Rc::new(move |event: &ElementEvent| {
                    if *event == ElementEvent::Click {
                        if let Some(inner) = weak.upgrade() {
                            inner.activate();
                        }
                    }
                }));
                *self.inner.click_sub.borrow_mut() = Some(sub);
            }

            *self.inner.button.borrow_mut() = Some(button);
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

    fn detach_elements(&self) {
        self.inner.click_sub.borrow_mut().take();
        if let Some(row) = self.inner.row.borrow_mut().take() {
            row.detach();
        }
        self.inner.button.borrow_mut().take();
        self.inner.ctx.borrow_mut().take();
    }
}

impl ItemInner {
    fn activate(&self) {
        if self.disabled.get() {
            return;
        }
        let Some(ctx) = self.ctx.borrow().clone() else {
            return;
        };
        tracing::debug!(label = %self.label, "menu item activated");
        self.activations.emit(&ActivationEvent { context: ctx });
    }
}

impl MenuEntry for ActionItem {
    fn entry_id(&self) -> EntryId {
        EntryId(Rc::as_ptr(&self.inner) as usize)
    }

    fn render(&self, parent: &ElementHandle, ctx: &MenuContext) -> ElementHandle {
        self.render_base(parent, ctx, true)
    }

    fn remove(&self) {
        self.detach_elements();
    }

    fn on_activate(&self, handler: Box<dyn Fn(&ActivationEvent)>) -> Option<Subscription> {
        Some(self.inner.activations.subscribe(move |event| handler(event)))
    }

    fn as_focusable(&self) -> Option<&dyn Focusable> {
        Some(self)
    }
}

impl Focusable for ActionItem {
    fn focus(&self) {
        ActionItem::focus(self);
    }

    fn blur(&self) {
        ActionItem::blur(self);
    }

    fn click(&self) {
        ActionItem::click(self);
    }

    fn is_disabled(&self) -> bool {
        ActionItem::is_disabled(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_context, TestDom};
    use std::cell::Cell;

    #[test]
    fn test_render_is_idempotent() {
        let dom = TestDom::new();
        let (ctx, _surface, _timers) = test_context(&dom);
        let parent = dom.create_root(400.0, 300.0);

        let item = ActionItem::new("Copy");
        let first = item.render(&parent, &ctx);
        let second = item.render(&parent, &ctx);
        assert_eq!(first.id(), second.id());
        assert_eq!(parent.children().len(), 1);
    }

    #[test]
    fn test_remove_forgets_elements_and_render_recreates() {
        let dom = TestDom::new();
        let (ctx, _surface, _timers) = test_context(&dom);
        let parent = dom.create_root(400.0, 300.0);

        let item = ActionItem::new("Copy");
        let first = item.render(&parent, &ctx);
        MenuEntry::remove(&item);
        assert!(parent.children().is_empty());

        let second = item.render(&parent, &ctx);
        assert_ne!(first.id(), second.id());
        assert_eq!(parent.children().len(), 1);
    }

    #[test]
    fn test_click_fires_activation_with_context() {
        let dom = TestDom::new();
        let (ctx, _surface, _timers) = test_context(&dom);
        let parent = dom.create_root(400.0, 300.0);

        let item = ActionItem::new("Copy");
        item.render(&parent, &ctx);

        let hits = Rc::new(Cell::new(0));
        let hits2 = hits.clone();
        let _sub = item.on_activate(move |_| hits2.set(hits2.get() + 1));

        let button = item.button_element().unwrap();
        dom.dispatch(&button, ElementEvent::Click);
        assert_eq!(hits.get(), 1);

        item.click();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_disabled_suppresses_activation() {
        let dom = TestDom::new();
        let (ctx, _surface, _timers) = test_context(&dom);
        let parent = dom.create_root(400.0, 300.0);

        let item = ActionItem::new("Copy").disabled();
        item.render(&parent, &ctx);

        let hits = Rc::new(Cell::new(0));
        let hits2 = hits.clone();
        let _sub = item.on_activate(move |_| hits2.set(hits2.get() + 1));

        let button = item.button_element().unwrap();
        assert!(button.has_class(class::DISABLED));
        dom.dispatch(&button, ElementEvent::Click);
        item.click();
        assert_eq!(hits.get(), 0);

        item.set_disabled(false);
        item.click();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_focus_toggles_class() {
        let dom = TestDom::new();
        let (ctx, _surface, _timers) = test_context(&dom);
        let parent = dom.create_root(400.0, 300.0);

        let item = ActionItem::new("Copy");
        item.render(&parent, &ctx);
        let button = item.button_element().unwrap();

        item.focus();
        assert!(button.has_class(class::FOCUSED));
        item.blur();
        assert!(!button.has_class(class::FOCUSED));
    }
}
