mod action;
mod entry;
mod separator;

pub use action::ActionItem;
pub use entry::{ActivationEvent, EntryId, Focusable, IdGenerator, MenuEntry};
pub use separator::Separator;
