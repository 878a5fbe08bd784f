//! One-call session setup with the built-in plugins, and the slot holding the
//! current session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use voice_input_core::config::SetupConfig;
use voice_input_core::{ProviderError, Result, VoiceInputConfig};
use voice_input_engine::{
    ErrorSink, Plugin, PluginSource, ProviderFactory, VoiceInput, VoiceInputOptions,
};

use crate::host::HostEventSource;
use crate::plugins::{
    confirm_shortcut, press_to_talk, toggle_shortcut, ButtonHost, InsertTextPlugin, Overlay,
    OverlayPlugin, OverlayStyle, TextSink, ToggleButtonPlugin,
};
use crate::shortcut::{KeyChord, Platform};

/// Host services the built-in plugins talk to.
///
/// A missing collaborator disables the plugins that need it.
#[derive(Clone, Default)]
pub struct Host {
    pub events: Option<Arc<dyn HostEventSource>>,
    pub text_sink: Option<Arc<dyn TextSink>>,
    pub overlay: Option<Arc<dyn Overlay>>,
    pub buttons: Option<Arc<dyn ButtonHost>>,
}

impl Host {
    /// A host with no services; every host-bound plugin is disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Global input events for the shortcuts and toggle buttons.
    pub fn events(mut self, events: Arc<dyn HostEventSource>) -> Self {
        self.events = Some(events);
        self
    }

    /// Where final transcripts are inserted.
    pub fn text_sink(mut self, sink: Arc<dyn TextSink>) -> Self {
        self.text_sink = Some(sink);
        self
    }

    /// Surface for the interim transcript.
    pub fn overlay(mut self, overlay: Arc<dyn Overlay>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Toggle button attributes and focus targets.
    pub fn buttons(mut self, buttons: Arc<dyn ButtonHost>) -> Self {
        self.buttons = Some(buttons);
        self
    }
}

/// Everything [`setup`] needs besides the provider and the host.
pub struct SetupOptions {
    pub lang: Option<String>,
    /// User plugins. They run before the built-in ones.
    pub plugins: Vec<PluginSource>,
    pub on_error: Option<ErrorSink>,
    pub config: SetupConfig,
    pub platform: Platform,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            lang: None,
            plugins: Vec::new(),
            on_error: None,
            config: SetupConfig::default(),
            platform: Platform::current(),
        }
    }
}

impl SetupOptions {
    /// Host locale, default config, the current platform and no user plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options taken from a loaded configuration file.
    pub fn from_config(config: &VoiceInputConfig) -> Self {
        Self {
            lang: Some(config.recognition.resolved_lang()),
            config: config.setup.clone(),
            ..Self::default()
        }
    }

    /// Recognize in `lang` instead of the host locale.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Append a user plugin. User plugins run before the built-in ones.
    pub fn plugin(mut self, plugin: PluginSource) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Route provider errors to `sink` instead of the log.
    pub fn on_error(mut self, sink: impl Fn(&ProviderError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(sink));
        self
    }

    /// Built-in plugin settings.
    pub fn config(mut self, config: SetupConfig) -> Self {
        self.config = config;
        self
    }

    /// Platform deciding what `Mod` means in shortcuts.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

/// Shortcuts parsed up front so a bad config fails before anything is built.
struct Shortcuts {
    main: Option<KeyChord>,
    confirm: Option<KeyChord>,
}

impl Shortcuts {
    fn parse(config: &SetupConfig) -> Result<Self> {
        Ok(Self {
            main: config.keyboard_shortcut().map(KeyChord::parse).transpose()?,
            confirm: config
                .confirm_keyboard_shortcut()
                .map(KeyChord::parse)
                .transpose()?,
        })
    }
}

/// Build a session with the user plugins followed by the built-in plugins
/// enabled in `options.config`.
///
/// Fails only on an invalid shortcut; an unavailable provider still yields an
/// (inert) session.
pub fn setup(
    factory: &dyn ProviderFactory,
    options: SetupOptions,
    host: &Host,
) -> Result<VoiceInput> {
    let shortcuts = Shortcuts::parse(&options.config)?;
    Ok(build(factory, options, host, shortcuts))
}

fn build(
    factory: &dyn ProviderFactory,
    options: SetupOptions,
    host: &Host,
    shortcuts: Shortcuts,
) -> VoiceInput {
    let SetupOptions {
        lang,
        mut plugins,
        on_error,
        config,
        platform,
    } = options;

    if config.insert_text {
        if let Some(sink) = &host.text_sink {
            plugins.push(PluginSource::plugin(InsertTextPlugin::new(Arc::clone(sink))));
        }
    }

    if config.overlay.enabled {
        if let Some(overlay) = &host.overlay {
            plugins.push(PluginSource::plugin(OverlayPlugin::new(
                Arc::clone(overlay),
                OverlayStyle::from(&config.overlay),
            )));
        }
    }

    if let Some(events) = &host.events {
        if let Some(chord) = shortcuts.main {
            let events = Arc::clone(events);
            let pressing = config.keyboard_shortcut_pressing;
            plugins.push(PluginSource::factory(move |session| {
                let plugin = if pressing {
                    press_to_talk(events.as_ref(), chord, platform, session.clone())
                } else {
                    toggle_shortcut(events.as_ref(), chord, platform, session.clone())
                };
                Some(Box::new(plugin) as Box<dyn Plugin>)
            }));
        }

        if let Some(chord) = shortcuts.confirm {
            let events = Arc::clone(events);
            plugins.push(PluginSource::factory(move |session| {
                let plugin = confirm_shortcut(events.as_ref(), chord, platform, session.clone());
                Some(Box::new(plugin) as Box<dyn Plugin>)
            }));
        }
    }

    if let Some(attribute) = config.toggle_button_attribute() {
        let attribute = attribute.to_string();
        let focus_attribute = config.toggle_button_focus_attribute().map(str::to_string);
        let events = host.events.clone();
        let buttons = host.buttons.clone();
        plugins.push(PluginSource::factory(move |session| {
            let plugin = ToggleButtonPlugin::new(
                events.as_deref(),
                buttons,
                attribute,
                focus_attribute,
                session.clone(),
            );
            Some(Box::new(plugin) as Box<dyn Plugin>)
        }));
    }

    VoiceInput::new(
        factory,
        VoiceInputOptions {
            lang,
            plugins,
            on_error,
        },
    )
}

// =============================================================================
// Slot
// =============================================================================

/// Holds the current session. Setting up a new one disposes the previous.
#[derive(Default)]
pub struct VoiceInputSlot {
    current: Mutex<Option<VoiceInput>>,
}

impl VoiceInputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `factory` can produce a provider on this host.
    pub fn is_supported(factory: &dyn ProviderFactory) -> bool {
        factory.is_supported()
    }

    /// Dispose the current session, then build and store a new one.
    ///
    /// An invalid shortcut fails before the current session is touched.
    pub fn setup(
        &self,
        factory: &dyn ProviderFactory,
        options: SetupOptions,
        host: &Host,
    ) -> Result<VoiceInput> {
        let shortcuts = Shortcuts::parse(&options.config)?;

        // Dispose outside the lock: plugins may look at the slot while disposing.
        let previous = lock(&self.current).take();
        if let Some(previous) = previous {
            previous.dispose();
        }

        let session = build(factory, options, host, shortcuts);
        *lock(&self.current) = Some(session.clone());
        Ok(session)
    }

    pub fn current(&self) -> Option<VoiceInput> {
        lock(&self.current).clone()
    }

    /// Dispose and forget the current session, if any.
    pub fn dispose(&self) {
        let current = lock(&self.current).take();
        if let Some(current) = current {
            current.dispose();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Tests
// =============================================================================
