//! On-screen buttons toggling the session.
//!
//! Any element carrying the toggle attribute acts as a button. Its attribute
//! value mirrors the session: `recording` or `stopped`.

use std::sync::Arc;

use voice_input_core::{RecordingState, Result};
use voice_input_engine::{Plugin, VoiceInputHandle};

use crate::host::{ClickEvent, HostEvent, HostEventSource, Propagation, Subscription};

/// Host access to toggle buttons and focus targets.
pub trait ButtonHost: Send + Sync {
    /// Set `attribute` to `value` on every element currently carrying it.
    fn set_attribute_all(&self, attribute: &str, value: &str);

    /// Focus the element matching `selector`, caret at the end.
    ///
    /// Returns `false` when nothing matches.
    fn focus(&self, selector: &str) -> bool;
}

pub fn button_state_value(state: RecordingState) -> &'static str {
    if state.recording {
        "recording"
    } else {
        "stopped"
    }
}

pub struct ToggleButtonPlugin {
    attribute: String,
    buttons: Option<Arc<dyn ButtonHost>>,
    subscription: Option<Subscription>,
}

impl ToggleButtonPlugin {
    pub fn new(
        events: Option<&dyn HostEventSource>,
        buttons: Option<Arc<dyn ButtonHost>>,
        attribute: String,
        focus_attribute: Option<String>,
        session: VoiceInputHandle,
    ) -> Self {
        let subscription = events.map(|events| {
            let attribute = attribute.clone();
            let buttons = buttons.clone();
            events.listen(Box::new(move |event| match event {
                HostEvent::Click(click) if click.closest(&attribute).is_some() => {
                    session.toggle();
                    if session.recording() {
                        focus_target(click, focus_attribute.as_deref(), buttons.as_deref());
                    }
                    Propagation::Consume
                }
                _ => Propagation::Continue,
            }))
        });

        Self {
            attribute,
            buttons,
            subscription,
        }
    }
}

fn focus_target(
    click: &ClickEvent,
    focus_attribute: Option<&str>,
    buttons: Option<&dyn ButtonHost>,
) {
    let (Some(focus_attribute), Some(buttons)) = (focus_attribute, buttons) else {
        return;
    };
    let selector = click
        .target()
        .and_then(|target| target.attribute(focus_attribute))
        .filter(|selector| !selector.is_empty());
    if let Some(selector) = selector {
        if !buttons.focus(selector) {
            tracing::debug!(selector, "Focus target not found");
        }
    }
}

impl Plugin for ToggleButtonPlugin {
    fn name(&self) -> &str {
        "toggle-button"
    }

    fn on_state_change(&mut self, state: RecordingState) -> Result<()> {
        if let Some(buttons) = &self.buttons {
            buttons.set_attribute_all(&self.attribute, button_state_value(state));
        }
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
        Ok(())
    }
}
