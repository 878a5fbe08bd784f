//! Built-in plugins installed by [`crate::setup`].

pub mod insert;
pub mod keyboard;
pub mod overlay;
pub mod toggle_button;

pub use insert::{InsertTextPlugin, TextSink};
pub use keyboard::{confirm_shortcut, press_to_talk, toggle_shortcut, ListenerPlugin};
pub use overlay::{Overlay, OverlayPlugin, OverlayStyle};
pub use toggle_button::{ButtonHost, ToggleButtonPlugin};
