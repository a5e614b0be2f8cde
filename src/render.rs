//! The render collaborator seam.
//!
//! The engine never talks to a concrete render backend. Everything it needs
//! from one — element creation with a tag and attribute map, class toggling,
//! inline position styles, post-layout measurement, hover probing, focus —
//! is expressed by the [`Element`] trait. A backend implements it once;
//! `testing::TestDom` is the in-memory implementation used by this crate's
//! own tests.

use std::rc::Rc;

use crate::events::Subscription;
use crate::geometry::{Point, Rect, Size};

/// Stable identity of an element within its document.
///
/// Handles are cheap clones and may be re-minted (e.g. by [`Element::children`]),
/// so identity comparisons go through ids, never pointer equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Keys the engine reacts to. Anything else never reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Space,
    Escape,
}

/// Events delivered to element handlers registered via [`Element::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementEvent {
    Click,
    PointerEnter,
    PointerLeave,
    Key(Key),
}

pub type ElementHandle = Rc<dyn Element>;

/// One element of the render backend's retained tree.
pub trait Element {
    fn id(&self) -> ElementId;

    /// Create a detached element in the same document.
    fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> ElementHandle;

    fn append_child(&self, child: &ElementHandle);

    /// Detach from the current parent. No-op when already detached.
    fn detach(&self);

    fn parent(&self) -> Option<ElementHandle>;

    fn children(&self) -> Vec<ElementHandle>;

    fn set_attribute(&self, name: &str, value: &str);

    fn set_text(&self, text: &str);

    fn set_class(&self, class: &str, enabled: bool);

    fn has_class(&self, class: &str) -> bool;

    /// Inline position within the offset parent, in pixels.
    fn set_position(&self, position: Point);

    /// Inline width override, in pixels.
    fn set_width(&self, width: f64);

    /// Laid-out size of the element with its current content.
    fn size(&self) -> Size;

    /// Client box of the element (the box children are positioned within).
    fn client_size(&self) -> Size;

    /// Bounding rectangle in viewport coordinates.
    fn bounds(&self) -> Rect;

    /// Whether the pointer is over this element or any descendant.
    fn is_hovered(&self) -> bool;

    fn focus(&self);

    fn blur(&self);

    /// Register a handler for this element's events. The handler stays
    /// registered until the returned subscription is dropped.
    fn on(&self, handler: Rc<dyn Fn(&ElementEvent)>) -> Subscription;
}

/// Class names the engine toggles. Styling is the embedder's business; the
/// engine only promises which classes appear on which elements.
pub mod class {
    /// Root element of every menu surface.
    pub const MENU: &str = "menu-kit-menu";
    /// Present while a menu surface is shown.
    pub const VISIBLE: &str = "menu-kit-visible";
    /// Marks nested (submenu) surfaces; the mutual-exclusion scan matches
    /// this class so the root menu sharing the container is left alone.
    pub const SUBMENU: &str = "menu-kit-submenu";
    /// Row element of an action or submenu item.
    pub const ITEM: &str = "menu-kit-item";
    /// Separator row.
    pub const SEPARATOR: &str = "menu-kit-separator";
    /// Icon span inside a row.
    pub const ICON: &str = "menu-kit-icon";
    /// Chevron marker on submenu rows.
    pub const CHEVRON: &str = "menu-kit-chevron";
    /// Disabled row.
    pub const DISABLED: &str = "menu-kit-disabled";
    /// Keyboard-focused row.
    pub const FOCUSED: &str = "menu-kit-focused";
    /// Parent row of a keyboard-focused nested menu (demoted highlight).
    pub const FOCUSED_PARENT: &str = "menu-kit-focused-parent";
}

/// Id comparison helper for `Rc<dyn Element>` handles.
pub fn same_element(a: &dyn Element, b: &dyn Element) -> bool {
    a.id() == b.id()
}
