//! The per-open context bundle.

use std::rc::Rc;

use crate::host::{GestureEvent, HostSurface};
use crate::theme::Theme;
use crate::timers::TimerHost;

/// Transient bundle built for every menu open and threaded down through
/// `show`/`render` calls. Never persisted: a fresh context is constructed per
/// show-event by the host adapter.
#[derive(Clone)]
pub struct MenuContext {
    /// The anchor surface the menu is attached to. Submenus obtain their
    /// shared overlay container from it.
    pub surface: Rc<dyn HostSurface>,

    /// The gesture that opened the menu.
    pub event: Rc<GestureEvent>,

    /// Fixed width hint for nested menus.
    pub menu_width: Option<f64>,

    /// Theme hint for nested menus.
    pub menu_theme: Option<Theme>,

    /// Timer service used for hover-intent and linger delays.
    pub timers: Rc<dyn TimerHost>,
}

impl MenuContext {
    pub fn new(
        surface: Rc<dyn HostSurface>,
        event: Rc<GestureEvent>,
        timers: Rc<dyn TimerHost>,
    ) -> Self {
        Self {
            surface,
            event,
            menu_width: None,
            menu_theme: None,
            timers,
        }
    }

    pub fn with_menu_width(mut self, width: f64) -> Self {
        self.menu_width = Some(width);
        self
    }

    pub fn with_menu_theme(mut self, theme: Theme) -> Self {
        self.menu_theme = Some(theme);
        self
    }
}

impl std::fmt::Debug for MenuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuContext")
            .field("event", &self.event)
            .field("menu_width", &self.menu_width)
            .field("menu_theme", &self.menu_theme)
            .finish_non_exhaustive()
    }
}
