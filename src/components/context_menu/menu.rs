//! The menu container: ordered entries, attach/show/hide, viewport-clamped
//! positioning and keyboard focus delegation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::context::MenuContext;
use crate::events::Subscription;
use crate::geometry::{Point, Size};
use crate::render::{class, ElementEvent, ElementHandle, Key};
use crate::style::MenuStyle;
use crate::theme::Theme;

use super::super::menu_item::{IdGenerator, MenuEntry};

/// A popup menu surface and its ordered entries. Cheap-clone handle over
/// shared state; submenu items own one of these for their nested menu.
#[derive(Clone)]
pub struct ContextMenu {
    inner: Rc<MenuInner>,
}

struct EntrySlot {
    entry: Rc<dyn MenuEntry>,
    /// Hide-after-activation wiring; dropped when the entry is removed.
    _activation: Option<Subscription>,
}

struct MenuInner {
    style: RefCell<MenuStyle>,
    entries: RefCell<Vec<EntrySlot>>,
    root: RefCell<Option<ElementHandle>>,
    container: RefCell<Option<ElementHandle>>,
    key_sub: RefCell<Option<Subscription>>,
    /// One-shot callback installed by a parent submenu row; consumed when the
    /// escape-left gesture fires.
    escape_left: RefCell<Option<Box<dyn FnOnce()>>>,
    focused: Cell<Option<usize>>,
    width: Cell<Option<f64>>,
    theme: RefCell<Option<Theme>>,
    ids: IdGenerator,
}

impl Default for ContextMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextMenu {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(MenuInner {
                style: RefCell::new(MenuStyle::default()),
                entries: RefCell::new(Vec::new()),
                root: RefCell::new(None),
                container: RefCell::new(None),
                key_sub: RefCell::new(None),
                escape_left: RefCell::new(None),
                focused: Cell::new(None),
                width: Cell::new(None),
                theme: RefCell::new(None),
                ids: IdGenerator::new(),
            }),
        }
    }

    pub fn with_style(self, style: MenuStyle) -> Self {
        *self.inner.style.borrow_mut() = style;
        self
    }

    pub fn style(&self) -> MenuStyle {
        self.inner.style.borrow().clone()
    }

    pub fn set_style(&self, style: MenuStyle) {
        *self.inner.style.borrow_mut() = style;
    }

    // === Entry list ===

    /// Append an entry and wire the hide-after-activation subscription.
    pub fn add_item(&self, entry: impl MenuEntry + 'static) {
        let len = self.inner.entries.borrow().len();
        self.insert_item(len, entry);
    }

    /// Splice an entry at an explicit position (clamped to the list length),
    /// preserving a caller-defined order.
    pub fn insert_item(&self, index: usize, entry: impl MenuEntry + 'static) {
        let entry: Rc<dyn MenuEntry> = Rc::new(entry);
        entry.assign_id(&self.inner.ids);

        let menu = Rc::downgrade(&self.inner);
        let activation = entry.on_activate(Box::new(move |_event| {
            if let Some(inner) = menu.upgrade() {
                ContextMenu { inner }.hide();
            }
        }));

        let mut entries = self.inner.entries.borrow_mut();
        let index = index.min(entries.len());
        entries.insert(
            index,
            EntrySlot {
                entry,
                _activation: activation,
            },
        );
    }

    /// Remove an entry, unwire it and detach its element. Silent no-op when
    /// the entry is not in the list.
    pub fn remove_item(&self, entry: &dyn MenuEntry) {
        let removed = {
            let mut entries = self.inner.entries.borrow_mut();
            let position = entries
                .iter()
                .position(|slot| slot.entry.entry_id() == entry.entry_id());
            position.map(|index| entries.remove(index))
        };
        if let Some(slot) = removed {
            slot.entry.remove();
            self.inner.focused.set(None);
        }
    }

    pub fn item_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub(crate) fn has_submenu_entries(&self) -> bool {
        self.inner
            .entries
            .borrow()
            .iter()
            .any(|slot| slot.entry.as_submenu().is_some())
    }

    // === Attachment ===

    /// Attach to a container: (re)creates the root element as a direct child
    /// and installs the keyboard subscription. Idempotent.
    pub fn add_to(&self, container: &ElementHandle) {
        self.detach_root();

        let root_class = self.inner.style.borrow().root_class.clone();
        let root = container.create_element("menu", &[("class", &root_class), ("role", "menu")]);
        container.append_child(&root);

        let menu = Rc::downgrade(&self.inner);
        let key_sub = root.on(Rc::new(move |event: &ElementEvent| {
            if let ElementEvent::Key(key) = *event {
                if let Some(inner) = menu.upgrade() {
                    ContextMenu { inner }.handle_key(key);
                }
            }
        }));

        *self.inner.key_sub.borrow_mut() = Some(key_sub);
        *self.inner.root.borrow_mut() = Some(root);
        *self.inner.container.borrow_mut() = Some(container.clone());
        tracing::debug!(container = ?container.id(), "menu attached");
    }

    /// Tear down: removes every entry, detaches the root element and forgets
    /// the container. Idempotent; mutators called afterwards are no-ops.
    pub fn remove(&self) {
        for slot in self.inner.entries.borrow_mut().drain(..) {
            slot.entry.remove();
        }
        self.detach_root();
        self.inner.escape_left.borrow_mut().take();
        self.inner.focused.set(None);
        tracing::debug!("menu removed");
    }

    fn detach_root(&self) {
        self.inner.key_sub.borrow_mut().take();
        if let Some(root) = self.inner.root.borrow_mut().take() {
            root.detach();
        }
        self.inner.container.borrow_mut().take();
    }

    // === Visibility ===

    /// Render all entries, position within the container's client box and
    /// mark visible. No-op when not attached.
    ///
    /// Invoked by adapters and submenu rows; end users go through those.
    pub fn show(&self, x: f64, y: f64, ctx: &MenuContext) {
        let (Some(root), Some(container)) = (
            self.inner.root.borrow().clone(),
            self.inner.container.borrow().clone(),
        ) else {
            return;
        };

        if let Some(width) = self.inner.width.get() {
            root.set_width(width);
        }
        if let Some(theme) = self.inner.theme.borrow().as_ref() {
            root.set_class(theme.class(), true);
        }

        // Render first so the surface can be measured.
        let entries: Vec<Rc<dyn MenuEntry>> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|slot| slot.entry.clone())
            .collect();
        for entry in &entries {
            entry.render(&root, ctx);
        }

        let position = clamp_to_container(Point::new(x, y), root.size(), container.client_size());
        root.set_position(position);
        root.set_class(class::VISIBLE, true);

        self.blur_focused();
        self.inner.focused.set(None);
        tracing::debug!(x, y, left = position.x, top = position.y, "menu shown");
    }

    /// Visibility-class change only; entries stay alive. No-op when not
    /// attached.
    pub fn hide(&self) {
        let Some(root) = self.inner.root.borrow().clone() else {
            return;
        };
        root.set_class(class::VISIBLE, false);
        tracing::debug!("menu hidden");
    }

    pub fn is_visible(&self) -> bool {
        self.inner
            .root
            .borrow()
            .as_ref()
            .map(|root| root.has_class(class::VISIBLE))
            .unwrap_or(false)
    }

    pub fn root_element(&self) -> Option<ElementHandle> {
        self.inner.root.borrow().clone()
    }

    // === Hints (propagated from context by submenu rows) ===

    pub fn set_width(&self, width: f64) {
        self.inner.width.set(Some(width));
        if let Some(root) = self.inner.root.borrow().as_ref() {
            root.set_width(width);
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        if let Some(root) = self.inner.root.borrow().as_ref() {
            if let Some(old) = self.inner.theme.borrow().as_ref() {
                root.set_class(old.class(), false);
            }
            root.set_class(theme.class(), true);
        }
        *self.inner.theme.borrow_mut() = Some(theme);
    }

    // === Keyboard / focus ===

    /// Move keyboard focus to the first focus-capable entry.
    pub fn focus_first_item(&self) {
        let focusables = self.focusable_indices();
        if let Some(&first) = focusables.first() {
            self.focus_index(first);
        }
    }

    /// Install the one-shot escape-left callback. Set by a parent submenu
    /// row before focus moves into this menu.
    pub(crate) fn set_escape_left(&self, callback: impl FnOnce() + 'static) {
        *self.inner.escape_left.borrow_mut() = Some(Box::new(callback));
    }

    pub(crate) fn handle_key(&self, key: Key) {
        match key {
            Key::ArrowDown => self.move_focus(true),
            Key::ArrowUp => self.move_focus(false),
            Key::ArrowRight => {
                if let Some(entry) = self.focused_entry() {
                    if let Some(submenu) = entry.as_submenu() {
                        submenu.open_and_focus_submenu();
                    }
                }
            }
            Key::Enter | Key::Space => {
                if let Some(entry) = self.focused_entry() {
                    if let Some(submenu) = entry.as_submenu() {
                        submenu.open_and_focus_submenu();
                    } else if let Some(focusable) = entry.as_focusable() {
                        focusable.click();
                    }
                }
            }
            Key::ArrowLeft => {
                if let Some(escape) = self.inner.escape_left.borrow_mut().take() {
                    escape();
                }
            }
            Key::Escape => {
                let escape = self.inner.escape_left.borrow_mut().take();
                match escape {
                    Some(escape) => escape(),
                    None => self.hide(),
                }
            }
        }
    }

    fn focusable_indices(&self) -> Vec<usize> {
        self.inner
            .entries
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.entry.as_focusable().is_some())
            .map(|(index, _)| index)
            .collect()
    }

    fn focused_entry(&self) -> Option<Rc<dyn MenuEntry>> {
        let index = self.inner.focused.get()?;
        self.inner
            .entries
            .borrow()
            .get(index)
            .map(|slot| slot.entry.clone())
    }

    fn entry_at(&self, index: usize) -> Option<Rc<dyn MenuEntry>> {
        self.inner
            .entries
            .borrow()
            .get(index)
            .map(|slot| slot.entry.clone())
    }

    fn blur_focused(&self) {
        if let Some(entry) = self.focused_entry() {
            if let Some(focusable) = entry.as_focusable() {
                focusable.blur();
            }
        }
    }

    fn focus_index(&self, index: usize) {
        self.blur_focused();
        self.inner.focused.set(Some(index));
        if let Some(entry) = self.entry_at(index) {
            if let Some(focusable) = entry.as_focusable() {
                focusable.focus();
            }
        }
    }

    fn move_focus(&self, forward: bool) {
        let focusables = self.focusable_indices();
        if focusables.is_empty() {
            return;
        }
        let next = match self
            .inner
            .focused
            .get()
            .and_then(|current| focusables.iter().position(|&i| i == current))
        {
            Some(position) if forward => focusables[(position + 1) % focusables.len()],
            Some(position) => focusables[(position + focusables.len() - 1) % focusables.len()],
            None if forward => focusables[0],
            None => focusables[focusables.len() - 1],
        };
        self.focus_index(next);
    }
}

/// Clamp a desired top-left corner so the menu stays inside the container's
/// client box: align the far edge with the container's far edge when the
/// menu would overflow, then floor both coordinates at 0. When the menu is
/// larger than the container the floor wins and the far edge may overflow.
fn clamp_to_container(desired: Point, menu: Size, container: Size) -> Point {
    let mut left = desired.x;
    let mut top = desired.y;

    if left + menu.width > container.width {
        left = container.width - menu.width;
    }
    if top + menu.height > container.height {
        top = container.height - menu.height;
    }

    Point::new(left.max(0.0), top.max(0.0))
}
