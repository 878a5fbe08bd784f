//! Global keyboard shortcuts driving the session.

use voice_input_core::Result;
use voice_input_engine::{Plugin, VoiceInputHandle};

use crate::host::{HostEvent, HostEventSource, Propagation, Subscription};
use crate::shortcut::{KeyChord, Platform};

/// A plugin whose only job is holding host listener registrations.
///
/// Disposing it unregisters every listener.
pub struct ListenerPlugin {
    name: &'static str,
    subscriptions: Vec<Subscription>,
}

impl ListenerPlugin {
    pub fn new(name: &'static str, subscriptions: Vec<Subscription>) -> Self {
        Self {
            name,
            subscriptions,
        }
    }

    pub fn is_listening(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}

impl Plugin for ListenerPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn dispose(&mut self) -> Result<()> {
        for mut subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
        Ok(())
    }
}

/// Matching keydown toggles recording.
pub fn toggle_shortcut(
    events: &dyn HostEventSource,
    chord: KeyChord,
    platform: Platform,
    session: VoiceInputHandle,
) -> ListenerPlugin {
    let subscription = events.listen(Box::new(move |event| match event {
        HostEvent::KeyDown(key) if chord.matches(key, platform) => {
            session.toggle();
            Propagation::Consume
        }
        _ => Propagation::Continue,
    }));
    ListenerPlugin::new("toggle-shortcut", vec![subscription])
}

/// Record only while the shortcut is held.
///
/// Any other keydown, or any keyup, ends the recording.
pub fn press_to_talk(
    events: &dyn HostEventSource,
    chord: KeyChord,
    platform: Platform,
    session: VoiceInputHandle,
) -> ListenerPlugin {
    let on_release = session.clone();
    let keydown = events.listen(Box::new(move |event| {
        let HostEvent::KeyDown(key) = event else {
            return Propagation::Continue;
        };
        if chord.matches(key, platform) {
            // Key repeat delivers the chord again while held.
            if !session.recording() {
                session.start();
            }
            return Propagation::Consume;
        }
        if session.recording() {
            session.stop();
        }
        Propagation::Continue
    }));
    let keyup = events.listen(Box::new(move |event| {
        if matches!(event, HostEvent::KeyUp(_)) && on_release.recording() {
            on_release.stop();
        }
        Propagation::Continue
    }));
    ListenerPlugin::new("press-to-talk", vec![keydown, keyup])
}

/// Matching keydown forces the current utterance to finalize.
///
/// Sessions without a provider leave the key to the host.
pub fn confirm_shortcut(
    events: &dyn HostEventSource,
    chord: KeyChord,
    platform: Platform,
    session: VoiceInputHandle,
) -> ListenerPlugin {
    let subscription = events.listen(Box::new(move |event| match event {
        HostEvent::KeyDown(key) if chord.matches(key, platform) && session.is_supported() => {
            session.confirm();
            Propagation::Consume
        }
        _ => Propagation::Continue,
    }));
    ListenerPlugin::new("confirm-shortcut", vec![subscription])
}
