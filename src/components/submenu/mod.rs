mod item;
mod state;

pub use item::SubmenuItem;
