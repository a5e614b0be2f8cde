//! In-memory render backend.
//!
//! Implements [`Element`] over a flat node table so tests can drive the
//! engine without a real render tree. Layout is not simulated: sizes are
//! whatever the test sets, and bounds accumulate the inline positions up the
//! ancestor chain.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::events::Subscription;
use crate::geometry::{Point, Rect, Size};
use crate::render::{Element, ElementEvent, ElementHandle, ElementId};

#[derive(Default)]
struct Node {
    tag: String,
    attrs: HashMap<String, String>,
    classes: Vec<String>,
    text: String,
    parent: Option<u64>,
    children: Vec<u64>,
    position: Point,
    size: Size,
    width_override: Option<f64>,
    hovered: bool,
    handlers: Vec<(u64, Rc<dyn Fn(&ElementEvent)>)>,
}

#[derive(Default)]
struct DomState {
    nodes: RefCell<HashMap<u64, Node>>,
    next_node: Cell<u64>,
    next_handler: Cell<u64>,
    focused: Cell<Option<u64>>,
}

impl DomState {
    fn with_node<R>(&self, id: u64, f: impl FnOnce(&mut Node) -> R) -> R {
        let mut nodes = self.nodes.borrow_mut();
        f(nodes.entry(id).or_default())
    }

    fn new_node(self: &Rc<Self>, tag: &str, attrs: &[(&str, &str)]) -> ElementHandle {
        let id = self.next_node.get();
        self.next_node.set(id + 1);

        let mut node = Node {
            tag: tag.to_string(),
            ..Node::default()
        };
        for (name, value) in attrs {
            if *name == "class" {
                node.classes = value.split_whitespace().map(str::to_string).collect();
            }
            node.attrs.insert(name.to_string(), value.to_string());
        }
        self.nodes.borrow_mut().insert(id, node);

        Rc::new(TestElement {
            id,
            state: self.clone(),
        })
    }

    fn hovered_in_subtree(&self, id: u64) -> bool {
        let (hovered, children) =
            self.with_node(id, |node| (node.hovered, node.children.clone()));
        hovered || children.into_iter().any(|child| self.hovered_in_subtree(child))
    }
}

struct TestElement {
    id: u64,
    state: Rc<DomState>,
}

impl TestElement {
    fn handle(state: &Rc<DomState>, id: u64) -> ElementHandle {
        Rc::new(TestElement {
            id,
            state: state.clone(),
        })
    }
}

impl Element for TestElement {
    fn id(&self) -> ElementId {
        ElementId(self.id)
    }

    fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> ElementHandle {
        self.state.new_node(tag, attrs)
    }

    fn append_child(&self, child: &ElementHandle) {
        let child_id = child.id().0;
        child.detach();
        self.state.with_node(child_id, |node| node.parent = Some(self.id));
        self.state.with_node(self.id, |node| node.children.push(child_id));
    }

    fn detach(&self) {
        let parent = self.state.with_node(self.id, |node| node.parent.take());
        if let Some(parent) = parent {
            self.state
                .with_node(parent, |node| node.children.retain(|&c| c != self.id));
        }
    }

    fn parent(&self) -> Option<ElementHandle> {
        self.state
            .with_node(self.id, |node| node.parent)
            .map(|id| TestElement::handle(&self.state, id))
    }

    fn children(&self) -> Vec<ElementHandle> {
        self.state
            .with_node(self.id, |node| node.children.clone())
            .into_iter()
            .map(|id| TestElement::handle(&self.state, id))
            .collect()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.state.with_node(self.id, |node| {
            if name == "class" {
                node.classes = value.split_whitespace().map(str::to_string).collect();
            }
            node.attrs.insert(name.to_string(), value.to_string());
        });
    }

    fn set_text(&self, text: &str) {
        self.state
            .with_node(self.id, |node| node.text = text.to_string());
    }

    fn set_class(&self, class: &str, enabled: bool) {
        self.state.with_node(self.id, |node| {
            node.classes.retain(|c| c != class);
            if enabled {
                node.classes.push(class.to_string());
            }
        });
    }

    fn has_class(&self, class: &str) -> bool {
        self.state
            .with_node(self.id, |node| node.classes.iter().any(|c| c == class))
    }

    fn set_position(&self, position: Point) {
        self.state
            .with_node(self.id, |node| node.position = position);
    }

    fn set_width(&self, width: f64) {
        self.state
            .with_node(self.id, |node| node.width_override = Some(width));
    }

    fn size(&self) -> Size {
        self.state.with_node(self.id, |node| {
            Size::new(
                node.width_override.unwrap_or(node.size.width),
                node.size.height,
            )
        })
    }

    fn client_size(&self) -> Size {
        self.size()
    }

    fn bounds(&self) -> Rect {
        let size = self.size();
        let mut origin = Point::default();
        let mut current = Some(self.id);
        while let Some(id) = current {
            let (position, parent) = self
                .state
                .with_node(id, |node| (node.position, node.parent));
            origin.x += position.x;
            origin.y += position.y;
            current = parent;
        }
        Rect::new(origin.x, origin.y, size.width, size.height)
    }

    fn is_hovered(&self) -> bool {
        self.state.hovered_in_subtree(self.id)
    }

    fn focus(&self) {
        self.state.focused.set(Some(self.id));
    }

    fn blur(&self) {
        if self.state.focused.get() == Some(self.id) {
            self.state.focused.set(None);
        }
    }

    fn on(&self, handler: Rc<dyn Fn(&ElementEvent)>) -> Subscription {
        let handler_id = self.state.next_handler.get();
        self.state.next_handler.set(handler_id + 1);
        self.state
            .with_node(self.id, |node| node.handlers.push((handler_id, handler)));

        let state: Weak<DomState> = Rc::downgrade(&self.state);
        let node_id = self.id;
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.with_node(node_id, |node| {
                    node.handlers.retain(|(id, _)| *id != handler_id)
                });
            }
        })
    }
}

/// Handle on the in-memory document. Cheap to clone.
#[derive(Clone, Default)]
pub struct TestDom {
    state: Rc<DomState>,
}

impl TestDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// A detached top-level container with a fixed client box.
    pub fn create_root(&self, width: f64, height: f64) -> ElementHandle {
        let root = self.state.new_node("root", &[]);
        self.state
            .with_node(root.id().0, |node| node.size = Size::new(width, height));
        root
    }

    pub fn set_size(&self, element: &ElementHandle, width: f64, height: f64) {
        self.state
            .with_node(element.id().0, |node| node.size = Size::new(width, height));
    }

    pub fn set_hovered(&self, element: &ElementHandle, hovered: bool) {
        self.state
            .with_node(element.id().0, |node| node.hovered = hovered);
    }

    /// Deliver an event to handlers registered on the element. Pointer
    /// enter/leave also update the element's hover flag, like a real pointer
    /// would.
    pub fn dispatch(&self, element: &ElementHandle, event: ElementEvent) {
        match event {
            ElementEvent::PointerEnter => self.set_hovered(element, true),
            ElementEvent::PointerLeave => self.set_hovered(element, false),
            _ => {}
        }
        let handlers: Vec<Rc<dyn Fn(&ElementEvent)>> = self
            .state
            .with_node(element.id().0, |node| {
                node.handlers.iter().map(|(_, h)| h.clone()).collect()
            });
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn position_of(&self, element: &ElementHandle) -> Point {
        self.state.with_node(element.id().0, |node| node.position)
    }

    pub fn text_of(&self, element: &ElementHandle) -> String {
        self.state
            .with_node(element.id().0, |node| node.text.clone())
    }

    pub fn width_of(&self, element: &ElementHandle) -> Option<f64> {
        self.state
            .with_node(element.id().0, |node| node.width_override)
    }

    pub fn attribute_of(&self, element: &ElementHandle, name: &str) -> Option<String> {
        self.state
            .with_node(element.id().0, |node| node.attrs.get(name).cloned())
    }

    pub fn tag_of(&self, element: &ElementHandle) -> String {
        self.state.with_node(element.id().0, |node| node.tag.clone())
    }

    pub fn focused_element_id(&self) -> Option<u64> {
        self.state.focused.get()
    }
}
