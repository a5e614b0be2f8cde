//! In-memory host surface for tests.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::events::Subscription;
use crate::geometry::Point;
use crate::host::{Gesture, GestureEvent, GestureHandler, HostSurface};
use crate::render::ElementHandle;

use super::TestDom;

struct GestureEntry {
    id: u64,
    gesture: Gesture,
    filter: Option<String>,
    handler: GestureHandler,
}

/// [`HostSurface`] over a [`TestDom`] root container, with a synthetic
/// gesture emitter.
pub struct TestSurface {
    container: ElementHandle,
    handlers: Rc<RefCell<Vec<GestureEntry>>>,
    next_id: Cell<u64>,
}

impl TestSurface {
    pub fn new(dom: &TestDom, width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self {
            container: dom.create_root(width, height),
            handlers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        })
    }

    pub fn container(&self) -> ElementHandle {
        self.container.clone()
    }

    pub fn gesture_handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Emit a gesture hitting a feature (or none) and return the event so
    /// tests can inspect `default_prevented`.
    pub fn emit_gesture(
        &self,
        gesture: Gesture,
        point: Point,
        feature: Option<&str>,
    ) -> Rc<GestureEvent> {
        let event = Rc::new(GestureEvent::new(point));
        let snapshot: Vec<GestureHandler> = self
            .handlers
            .borrow()
            .iter()
            .filter(|entry| entry.gesture == gesture)
            .filter(|entry| match entry.filter.as_deref() {
                Some(filter) => feature == Some(filter),
                None => true,
            })
            .map(|entry| entry.handler.clone())
            .collect();
        for handler in snapshot {
            handler(&event);
        }
        event
    }
}

impl HostSurface for TestSurface {
    fn container(&self) -> ElementHandle {
        self.container.clone()
    }

    fn on_gesture(
        &self,
        gesture: Gesture,
        feature_filter: Option<&str>,
        handler: GestureHandler,
    ) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.handlers.borrow_mut().push(GestureEntry {
            id,
            gesture,
            filter: feature_filter.map(str::to_string),
            handler,
        });

        let handlers: Weak<RefCell<Vec<GestureEntry>>> = Rc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(handlers) = handlers.upgrade() {
                handlers.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }
}
