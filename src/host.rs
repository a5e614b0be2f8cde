//! The host surface seam.
//!
//! The host is whatever interactive surface anchors the menu — typically a
//! map viewport. The engine consumes a gesture stream (optionally scoped to
//! features matching a selector string, mirroring map libraries' event
//! targeting), the surface's root container element, and event objects
//! carrying a container-local point.

use std::cell::Cell;
use std::rc::Rc;

use crate::events::Subscription;
use crate::geometry::Point;
use crate::render::ElementHandle;

/// Gesture kinds the engine binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// The surface's native context-menu gesture (right click).
    ContextMenu,
    /// The surface moved under the pointer (pan/zoom on a map).
    Move,
    /// Any pointer press on the surface.
    PointerDown,
}

/// A gesture event with a container-local point.
#[derive(Debug)]
pub struct GestureEvent {
    point: Point,
    default_prevented: Cell<bool>,
}

impl GestureEvent {
    pub fn new(point: Point) -> Self {
        Self {
            point,
            default_prevented: Cell::new(false),
        }
    }

    pub fn point(&self) -> Point {
        self.point
    }

    /// Suppress the host's own reaction to this gesture (e.g. the browser
    /// context menu).
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

pub type GestureHandler = Rc<dyn Fn(&Rc<GestureEvent>)>;

/// An interactive surface menus can attach to.
pub trait HostSurface {
    /// The surface's root container element. Menus and submenu overlays are
    /// appended here, and positions are relative to its client box.
    fn container(&self) -> ElementHandle;

    /// Subscribe to a gesture. `feature_filter` scopes delivery to gestures
    /// hitting features matching the selector, where the host supports that;
    /// hosts without feature targeting may ignore it for non-`ContextMenu`
    /// gestures. The handler stays registered until the subscription drops.
    fn on_gesture(
        &self,
        gesture: Gesture,
        feature_filter: Option<&str>,
        handler: GestureHandler,
    ) -> Subscription;
}
