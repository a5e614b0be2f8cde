//! Test doubles for the three collaborator seams: an in-memory render
//! backend, a manual-clock timer host and a synthetic gesture surface.
//!
//! Compiled for this crate's own tests and for embedders via the `testing`
//! feature.

use std::rc::Rc;

use crate::context::MenuContext;
use crate::geometry::Point;
use crate::host::GestureEvent;

mod dom;
mod host;
mod timers;

pub use dom::TestDom;
pub use host::TestSurface;
pub use timers::ManualTimers;

/// A ready-made context over an 800x600 surface with manual timers, plus the
/// surface and timer handles for driving the test.
pub fn test_context(dom: &TestDom) -> (MenuContext, Rc<TestSurface>, Rc<ManualTimers>) {
    let surface = TestSurface::new(dom, 800.0, 600.0);
    let timers = ManualTimers::new();
    let event = Rc::new(GestureEvent::new(Point::new(0.0, 0.0)));
    let ctx = MenuContext::new(surface.clone(), event, timers.clone());
    (ctx, surface, timers)
}
