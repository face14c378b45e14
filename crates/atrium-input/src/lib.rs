//! Input abstraction: keyboard and mouse state mapped through a canonical,
//! rebindable action table with change broadcast and persisted settings.

pub mod action_state;
pub mod bindings;
pub mod keyboard;
pub mod mouse;
pub mod store;

pub use action_state::ActionState;
pub use bindings::{Action, Binding, BindingTable, ListenerId, MouseButtonBinding};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
pub use store::{BindingStore, FileBindingStore, MemoryBindingStore};
