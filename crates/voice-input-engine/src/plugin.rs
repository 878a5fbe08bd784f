//! Listener interface for transcript and recording-state notifications.

use voice_input_core::{RecordingState, Result};

use crate::session::VoiceInputHandle;

/// A session listener. Every handler is optional.
///
/// Handlers run synchronously in registration order. A handler that returns an
/// error (or panics) is logged and skipped; the remaining plugins still run.
pub trait Plugin: Send {
    /// Name used in log messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Every transcript, before `on_update`/`on_finish`.
    fn on_result(&mut self, _transcript: &str, _interim: bool) -> Result<()> {
        Ok(())
    }

    /// An interim transcript of the utterance being spoken.
    fn on_update(&mut self, _transcript: &str) -> Result<()> {
        Ok(())
    }

    /// A settled utterance. Called once per utterance.
    fn on_finish(&mut self, _transcript: &str) -> Result<()> {
        Ok(())
    }

    fn on_state_change(&mut self, _state: RecordingState) -> Result<()> {
        Ok(())
    }

    /// Release whatever the plugin holds. Called exactly once.
    fn dispose(&mut self) -> Result<()> {
        Ok(())
    }
}

type PluginFactory = Box<dyn FnOnce(&VoiceInputHandle) -> Option<Box<dyn Plugin>> + Send>;

/// A plugin, or a function building one from the session it will belong to.
///
/// Factories run once, at session construction. Returning `None` registers
/// nothing.
pub enum PluginSource {
    Plugin(Box<dyn Plugin>),
    Factory(PluginFactory),
}

impl PluginSource {
    pub fn plugin(plugin: impl Plugin + 'static) -> Self {
        PluginSource::Plugin(Box::new(plugin))
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: FnOnce(&VoiceInputHandle) -> Option<Box<dyn Plugin>> + Send + 'static,
    {
        PluginSource::Factory(Box::new(factory))
    }

    pub(crate) fn resolve(self, handle: &VoiceInputHandle) -> Option<Box<dyn Plugin>> {
        match self {
            PluginSource::Plugin(plugin) => Some(plugin),
            PluginSource::Factory(factory) => factory(handle),
        }
    }
}

impl std::fmt::Debug for PluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginSource::Plugin(plugin) => f.debug_tuple("Plugin").field(&plugin.name()).finish(),
            PluginSource::Factory(_) => f.write_str("Factory"),
        }
    }
}

// =============================================================================
// Closure-backed plugin
// =============================================================================

type TextHandler = Box<dyn FnMut(&str) -> Result<()> + Send>;
type ResultHandler = Box<dyn FnMut(&str, bool) -> Result<()> + Send>;
type StateHandler = Box<dyn FnMut(RecordingState) -> Result<()> + Send>;
type DisposeHandler = Box<dyn FnOnce() -> Result<()> + Send>;

/// A plugin assembled from closures, for listeners that need no type of their own.
pub struct FnPlugin {
    name: String,
    on_result: Option<ResultHandler>,
    on_update: Option<TextHandler>,
    on_finish: Option<TextHandler>,
    on_state_change: Option<StateHandler>,
    dispose: Option<DisposeHandler>,
}

impl FnPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_result: None,
            on_update: None,
            on_finish: None,
            on_state_change: None,
            dispose: None,
        }
    }

    pub fn with_result(mut self, f: impl FnMut(&str, bool) -> Result<()> + Send + 'static) -> Self {
        self.on_result = Some(Box::new(f));
        self
    }

    pub fn with_update(mut self, f: impl FnMut(&str) -> Result<()> + Send + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn with_finish(mut self, f: impl FnMut(&str) -> Result<()> + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    pub fn with_state_change(
        mut self,
        f: impl FnMut(RecordingState) -> Result<()> + Send + 'static,
    ) -> Self {
        self.on_state_change = Some(Box::new(f));
        self
    }

    pub fn with_dispose(mut self, f: impl FnOnce() -> Result<()> + Send + 'static) -> Self {
        self.dispose = Some(Box::new(f));
        self
    }
}

impl Plugin for FnPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_result(&mut self, transcript: &str, interim: bool) -> Result<()> {
        match self.on_result.as_mut() {
            Some(f) => f(transcript, interim),
            None => Ok(()),
        }
    }

    fn on_update(&mut self, transcript: &str) -> Result<()> {
        match self.on_update.as_mut() {
            Some(f) => f(transcript),
            None => Ok(()),
        }
    }

    fn on_finish(&mut self, transcript: &str) -> Result<()> {
        match self.on_finish.as_mut() {
            Some(f) => f(transcript),
            None => Ok(()),
        }
    }

    fn on_state_change(&mut self, state: RecordingState) -> Result<()> {
        match self.on_state_change.as_mut() {
            Some(f) => f(state),
            None => Ok(()),
        }
    }

    fn dispose(&mut self) -> Result<()> {
        match self.dispose.take() {
            Some(f) => f(),
            None => Ok(()),
        }
    }
}
