//! Ready-made wiring of a voice input session into a host UI.
//!
//! [`setup`] builds a [`VoiceInput`](voice_input_engine::VoiceInput) with the
//! built-in plugins (text insertion, interim overlay, keyboard shortcuts and
//! toggle buttons) talking to whatever [`Host`] services are available.

pub mod host;
pub mod plugins;
pub mod setup;
pub mod shortcut;

pub use host::{
    ClickEvent, Element, EventHub, HostEvent, HostEventSource, HostListener, Propagation,
    Subscription,
};
pub use plugins::{ButtonHost, Overlay, OverlayStyle, TextSink};
pub use setup::{setup, Host, SetupOptions, VoiceInputSlot};
pub use shortcut::{KeyChord, KeyEvent, Platform};
