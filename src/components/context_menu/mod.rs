mod menu;

pub use menu::ContextMenu;
