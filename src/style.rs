//! Menu configuration.
//!
//! All visual/timing knobs in one place with builder methods. The defaults
//! are the engine's canonical values: 300 ms hover-intent, 200 ms close
//! linger, 4 px submenu overlap.

use std::time::Duration;

use crate::render::class;
use crate::theme::Theme;

/// Configuration shared by a menu and the submenus it spawns.
#[derive(Debug, Clone)]
pub struct MenuStyle {
    /// Class applied to menu root elements.
    pub root_class: String,

    /// Delay between the pointer entering a submenu row and the submenu
    /// opening.
    pub hover_open_delay: Duration,

    /// Linger after the pointer leaves an unpinned submenu before the hover
    /// state is re-checked and the submenu closed.
    pub hover_close_delay: Duration,

    /// Horizontal overlap between a submenu and its parent row, in pixels,
    /// so the two surfaces visually connect.
    pub submenu_overlap: f64,

    /// Fixed menu width hint propagated to nested menus (None = natural
    /// width).
    pub menu_width: Option<f64>,

    /// Theme identifier propagated to nested menus.
    pub theme: Option<Theme>,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            root_class: class::MENU.to_string(),
            hover_open_delay: Duration::from_millis(300),
            hover_close_delay: Duration::from_millis(200),
            submenu_overlap: 4.0,
            menu_width: None,
            theme: None,
        }
    }
}

impl MenuStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_class(mut self, class: impl Into<String>) -> Self {
        self.root_class = class.into();
        self
    }

    pub fn with_hover_open_delay(mut self, delay: Duration) -> Self {
        self.hover_open_delay = delay;
        self
    }

    pub fn with_hover_close_delay(mut self, delay: Duration) -> Self {
        self.hover_close_delay = delay;
        self
    }

    pub fn with_submenu_overlap(mut self, overlap: f64) -> Self {
        self.submenu_overlap = overlap;
        self
    }

    pub fn with_menu_width(mut self, width: f64) -> Self {
        self.menu_width = Some(width);
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = MenuStyle::default();
        assert_eq!(style.hover_open_delay, Duration::from_millis(300));
        assert_eq!(style.hover_close_delay, Duration::from_millis(200));
        assert_eq!(style.submenu_overlap, 4.0);
        assert_eq!(style.root_class, class::MENU);
        assert!(style.menu_width.is_none());
        assert!(style.theme.is_none());
    }

    #[test]
    fn test_builders() {
        let style = MenuStyle::new()
            .with_hover_open_delay(Duration::from_millis(50))
            .with_menu_width(180.0)
            .with_theme(Theme::dark());
        assert_eq!(style.hover_open_delay, Duration::from_millis(50));
        assert_eq!(style.menu_width, Some(180.0));
        assert_eq!(style.theme, Some(Theme::dark()));
    }
}
