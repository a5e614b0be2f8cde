//! Anchored context menus for interactive surfaces.
//!
//! The engine renders a popup menu at a point on a host surface (typically a
//! map viewport), with nested submenus, hover-intent timing, viewport-aware
//! placement and keyboard navigation. It talks to the outside world through
//! three seams: [`render::Element`] for the retained element tree,
//! [`host::HostSurface`] for the gesture stream and container, and
//! [`timers::TimerHost`] for one-shot delays.
//!
//! ```no_run
//! use menu_kit::prelude::*;
//! # fn demo(surface: std::rc::Rc<dyn menu_kit::host::HostSurface>,
//! #         timers: std::rc::Rc<dyn menu_kit::timers::TimerHost>) {
//! let menu = ContextMenu::new();
//! menu.add_item(ActionItem::new("Zoom here"));
//! menu.add_item(Separator::new());
//!
//! let nearby = SubmenuItem::new("Nearby");
//! nearby.menu().add_item(ActionItem::new("Restaurants"));
//! nearby.menu().add_item(ActionItem::new("Fuel"));
//! menu.add_item(nearby);
//!
//! let bound = SurfaceMenu::new(menu, timers);
//! bound.attach(surface);
//! # }
//! ```

pub mod components;
pub mod context;
pub mod events;
pub mod geometry;
pub mod host;
pub mod render;
pub mod style;
pub mod theme;
pub mod timers;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use components::context_menu::ContextMenu;
pub use components::menu_item::{ActionItem, ActivationEvent, Focusable, MenuEntry, Separator};
pub use components::submenu::SubmenuItem;
pub use components::surface_menu::SurfaceMenu;
pub use context::MenuContext;
pub use events::Subscription;
pub use style::MenuStyle;
pub use theme::Theme;

/// Convenience prelude for embedders.
pub mod prelude {
    pub use crate::components::context_menu::ContextMenu;
    pub use crate::components::menu_item::{ActionItem, ActivationEvent, MenuEntry, Separator};
    pub use crate::components::submenu::SubmenuItem;
    pub use crate::components::surface_menu::SurfaceMenu;
    pub use crate::context::MenuContext;
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::host::{Gesture, GestureEvent, HostSurface};
    pub use crate::render::{Element, ElementEvent, ElementHandle, Key};
    pub use crate::style::MenuStyle;
    pub use crate::theme::Theme;
    pub use crate::timers::TimerHost;
}
