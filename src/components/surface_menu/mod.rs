//! Binds a [`ContextMenu`] to a host surface's gesture stream.
//!
//! The adapter owns the glue only: it opens the menu on the surface's native
//! context-menu gesture (suppressing the host's own menu), hides it on move
//! or pointer-down, and builds the per-open [`MenuContext`] everything
//! downstream consumes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::context::MenuContext;
use crate::events::Subscription;
use crate::host::{Gesture, GestureEvent, HostSurface};
use crate::timers::TimerHost;

use super::context_menu::ContextMenu;

/// One menu bound to one surface. Cheap-clone handle over shared state.
#[derive(Clone)]
pub struct SurfaceMenu {
    inner: Rc<AdapterInner>,
}

struct AdapterInner {
    menu: ContextMenu,
    timers: Rc<dyn TimerHost>,
    feature_filter: RefCell<Option<String>>,
    attachment: RefCell<Option<Attachment>>,
}

struct Attachment {
    surface: Rc<dyn HostSurface>,
    _subs: Vec<Subscription>,
}

impl SurfaceMenu {
    pub fn new(menu: ContextMenu, timers: Rc<dyn TimerHost>) -> Self {
        Self {
            inner: Rc::new(AdapterInner {
                menu,
                timers,
                feature_filter: RefCell::new(None),
                attachment: RefCell::new(None),
            }),
        }
    }

    /// Scope the context-menu gesture to features matching a selector, for
    /// hosts with feature targeting.
    pub fn with_feature_filter(self, filter: impl Into<String>) -> Self {
        *self.inner.feature_filter.borrow_mut() = Some(filter.into());
        self
    }

    pub fn menu(&self) -> ContextMenu {
        self.inner.menu.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.inner.attachment.borrow().is_some()
    }

    /// Attach to a surface: mounts the menu into the surface's container and
    /// registers the three gesture listeners. Re-attaching moves the binding
    /// to the new surface.
    pub fn attach(&self, surface: Rc<dyn HostSurface>) {
        self.detach();

        self.inner.menu.add_to(&surface.container());
        let style = self.inner.menu.style();
        if let Some(width) = style.menu_width {
            self.inner.menu.set_width(width);
        }
        if let Some(theme) = style.theme.clone() {
            self.inner.menu.set_theme(theme);
        }

        let filter = self.inner.feature_filter.borrow().clone();
        let weak = Rc::downgrade(&self.inner);
        let weak_surface = Rc::downgrade(&surface);
        let open = surface.on_gesture(
            Gesture::ContextMenu,
            filter.as_deref(),
            Rc::new(move |event: &Rc<GestureEvent>| {
                let (Some(inner), Some(surface)) = (weak.upgrade(), weak_surface.upgrade()) else {
                    return;
                };
                SurfaceMenu { inner }.open_at(surface, event.clone());
            }),
        );

        let hide_on = |gesture: Gesture| {
            let weak = Rc::downgrade(&self.inner);
            surface.on_gesture(
                gesture,
                None,
                Rc::new(move |_event: &Rc<GestureEvent>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.menu.hide();
                    }
                }),
            )
        };
        let move_sub = hide_on(Gesture::Move);
        let down_sub = hide_on(Gesture::PointerDown);

        *self.inner.attachment.borrow_mut() = Some(Attachment {
            surface,
            _subs: vec![open, move_sub, down_sub],
        });
        tracing::debug!(?filter, "surface menu attached");
    }

    /// Drop the gesture listeners, hide the menu and forget the surface.
    /// Safe to call twice.
    pub fn detach(&self) {
        if self.inner.attachment.borrow_mut().take().is_some() {
            self.inner.menu.hide();
            tracing::debug!("surface menu detached");
        }
    }

    /// Full teardown: detach and remove the menu and all its entries.
    pub fn remove(&self) {
        self.detach();
        self.inner.menu.remove();
    }

    fn open_at(&self, surface: Rc<dyn HostSurface>, event: Rc<GestureEvent>) {
        event.prevent_default();
        let point = event.point();

        let style = self.inner.menu.style();
        let mut ctx = MenuContext::new(surface, event, self.inner.timers.clone());
        if let Some(width) = style.menu_width {
            ctx = ctx.with_menu_width(width);
        }
        if let Some(theme) = style.theme.clone() {
            ctx = ctx.with_menu_theme(theme);
        }

        self.inner.menu.show(point.x, point.y, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::menu_item::ActionItem;
    use crate::geometry::Point;
    use crate::testing::{ManualTimers, TestDom, TestSurface};

    fn adapter(dom: &TestDom) -> (SurfaceMenu, Rc<TestSurface>) {
        let surface = TestSurface::new(dom, 800.0, 600.0);
        let menu = ContextMenu::new();
        menu.add_item(ActionItem::new("Copy"));
        let adapter = SurfaceMenu::new(menu, ManualTimers::new());
        adapter.attach(surface.clone());
        (adapter, surface)
    }

    #[test]
    fn test_context_gesture_opens_and_prevents_default() {
        let dom = TestDom::new();
        let (adapter, surface) = adapter(&dom);

        let event = surface.emit_gesture(Gesture::ContextMenu, Point::new(40.0, 50.0), None);
        assert!(event.default_prevented());
        assert!(adapter.menu().is_visible());

        let root = adapter.menu().root_element().unwrap();
        assert_eq!(dom.position_of(&root), Point::new(40.0, 50.0));
    }

    #[test]
    fn test_move_and_pointer_down_hide() {
        let dom = TestDom::new();
        let (adapter, surface) = adapter(&dom);

        surface.emit_gesture(Gesture::ContextMenu, Point::new(40.0, 50.0), None);
        surface.emit_gesture(Gesture::Move, Point::new(0.0, 0.0), None);
        assert!(!adapter.menu().is_visible());

        surface.emit_gesture(Gesture::ContextMenu, Point::new(40.0, 50.0), None);
        surface.emit_gesture(Gesture::PointerDown, Point::new(0.0, 0.0), None);
        assert!(!adapter.menu().is_visible());
    }

    #[test]
    fn test_feature_filter_scopes_open_gesture() {
        let dom = TestDom::new();
        let surface = TestSurface::new(&dom, 800.0, 600.0);
        let menu = ContextMenu::new();
        menu.add_item(ActionItem::new("Copy"));
        let adapter = SurfaceMenu::new(menu, ManualTimers::new()).with_feature_filter("pois");
        adapter.attach(surface.clone());

        // Gesture hitting no matching feature is not delivered.
        surface.emit_gesture(Gesture::ContextMenu, Point::new(40.0, 50.0), None);
        assert!(!adapter.menu().is_visible());

        surface.emit_gesture(Gesture::ContextMenu, Point::new(40.0, 50.0), Some("pois"));
        assert!(adapter.menu().is_visible());
    }

    #[test]
    fn test_detach_is_idempotent_and_unhooks_gestures() {
        let dom = TestDom::new();
        let (adapter, surface) = adapter(&dom);

        adapter.detach();
        assert!(!adapter.is_attached());
        assert_eq!(surface.gesture_handler_count(), 0);
        adapter.detach();

        let event = surface.emit_gesture(Gesture::ContextMenu, Point::new(40.0, 50.0), None);
        assert!(!event.default_prevented());
        assert!(!adapter.menu().is_visible());
    }

    #[test]
    fn test_reattach_moves_binding() {
        let dom = TestDom::new();
        let (adapter, first) = adapter(&dom);

        let second = TestSurface::new(&dom, 400.0, 300.0);
        adapter.attach(second.clone());
        assert_eq!(first.gesture_handler_count(), 0);

        surface_open(&second);
        assert!(adapter.menu().is_visible());

        fn surface_open(surface: &Rc<TestSurface>) {
            surface.emit_gesture(Gesture::ContextMenu, Point::new(10.0, 10.0), None);
        }
    }
}
