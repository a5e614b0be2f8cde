//! Opaque theme identifiers.
//!
//! The engine does not style anything; it only carries a theme identifier
//! through to menu surfaces (as a CSS class on the root element) so the
//! embedder's stylesheet can pick it up. Nested menus inherit the identifier
//! through the context hints.

/// A theme identifier, rendered as a class on menu root elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    class: String,
}

impl Theme {
    pub fn light() -> Self {
        Self::custom("menu-kit-theme-light")
    }

    pub fn dark() -> Self {
        Self::custom("menu-kit-theme-dark")
    }

    /// A theme with an embedder-chosen class name.
    pub fn custom(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_classes() {
        assert_eq!(Theme::light().class(), "menu-kit-theme-light");
        assert_ne!(Theme::light(), Theme::dark());
        assert_eq!(Theme::custom("night").class(), "night");
    }
}
