pub mod context_menu;
pub mod menu_item;
pub mod submenu;
pub mod surface_menu;
