//! Host input events and global listener registration.
//!
//! The host (window system, browser shell, terminal UI...) owns the real input
//! stream. It either implements [`HostEventSource`] itself or feeds events into
//! an [`EventHub`].

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::shortcut::KeyEvent;

/// An element on the path of a click, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// A click, described by the clicked element and its ancestors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    /// `path[0]` is the clicked element; the rest are its ancestors.
    pub path: Vec<Element>,
}

impl ClickEvent {
    pub fn target(&self) -> Option<&Element> {
        self.path.first()
    }

    /// The nearest element (target included) carrying `attribute`.
    pub fn closest(&self, attribute: &str) -> Option<&Element> {
        self.path
            .iter()
            .find(|e| e.attributes.contains_key(attribute))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    Click(ClickEvent),
}

/// What a listener did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Let the event reach the focused application as usual.
    Continue,
    /// The event was handled; the host should swallow it.
    Consume,
}

pub type HostListener = Box<dyn FnMut(&HostEvent) -> Propagation + Send>;

/// Global input event registration.
pub trait HostEventSource: Send + Sync {
    /// Register `listener` for every host event until the subscription ends.
    fn listen(&self, listener: HostListener) -> Subscription;
}

/// Live listener registration. Ends on [`Subscription::cancel`] or drop.
#[must_use = "dropping a subscription removes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// =============================================================================
// EventHub
// =============================================================================

type SharedListener = Arc<Mutex<HostListener>>;

#[derive(Default)]
struct HubState {
    next_id: u64,
    listeners: Vec<(u64, SharedListener)>,
}

/// A [`HostEventSource`] the host pushes events into.
///
/// Listeners may subscribe or unsubscribe while an event is being emitted;
/// the change applies from the next event on.
#[derive(Clone, Default)]
pub struct EventHub {
    state: Arc<Mutex<HubState>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.state).listeners.len()
    }

    /// Deliver `event` to every listener in registration order.
    ///
    /// Returns [`Propagation::Consume`] if any listener consumed it.
    pub fn emit(&self, event: &HostEvent) -> Propagation {
        let listeners: Vec<SharedListener> = lock(&self.state)
            .listeners
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        let mut outcome = Propagation::Continue;
        for listener in listeners {
            let mut listener = lock(&listener);
            if (*listener)(event) == Propagation::Consume {
                outcome = Propagation::Consume;
            }
        }
        outcome
    }
}

impl HostEventSource for EventHub {
    fn listen(&self, listener: HostListener) -> Subscription {
        let id = {
            let mut state = lock(&self.state);
            let id = state.next_id;
            state.next_id += 1;
            state.listeners.push((id, Arc::new(Mutex::new(listener))));
            id
        };

        let state = Arc::clone(&self.state);
        Subscription::new(move || {
            lock(&state).listeners.retain(|(other, _)| *other != id);
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
