//! The voice input session handle.
//!
//! `VoiceInput` ties a [`Recognizer`] to its plugins. Recognizer operations
//! produce notifications into a FIFO outbox which is drained after the
//! recognizer lock is released. A plugin calling back into the session from a
//! handler only enqueues; the drain already in progress delivers those
//! notifications once the current dispatch returns.
//!
//! The plugin registry stays locked for the whole of a dispatch pass, so
//! nothing a handler may call (including `Debug`) touches that lock.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use uuid::Uuid;

use voice_input_core::config::host_locale;
use voice_input_core::{ProviderError, ProviderEvent};

use crate::dispatcher::{dispose_plugins, PluginDispatcher};
use crate::plugin::PluginSource;
use crate::provider::{ProviderFactory, RecognitionSettings};
use crate::recognizer::{Recognizer, RecognizerEvent};
use crate::state::RecognizerState;

/// Receives provider errors after the session has stopped.
pub type ErrorSink = Arc<dyn Fn(&ProviderError) + Send + Sync>;

/// Construction options for [`VoiceInput`].
#[derive(Default)]
pub struct VoiceInputOptions {
    /// Recognition language. `None` uses the host locale.
    pub lang: Option<String>,
    /// Plugins in dispatch order.
    pub plugins: Vec<PluginSource>,
    /// Error sink. `None` logs the error.
    pub on_error: Option<ErrorSink>,
}

impl VoiceInputOptions {
    /// Options with the host locale, no plugins and the logging error sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognize in `lang` (a BCP-47 tag) instead of the host locale.
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Append a plugin after those already added.
    pub fn plugin(mut self, plugin: PluginSource) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Route provider errors to `sink` instead of the log.
    pub fn on_error(mut self, sink: impl Fn(&ProviderError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(sink));
        self
    }
}

enum Outgoing {
    Event(RecognizerEvent),
    DisposePlugins,
}

#[derive(Default)]
struct Outbox {
    pending: VecDeque<Outgoing>,
    draining: bool,
}

struct Inner {
    id: Uuid,
    lang: String,
    recognizer: Mutex<Option<Recognizer>>,
    plugins: Mutex<PluginDispatcher>,
    plugin_count: AtomicUsize,
    outbox: Mutex<Outbox>,
    on_error: ErrorSink,
}

/// A continuously-running dictation session.
///
/// Cloning shares the session. All operations are synchronous; a session whose
/// provider could not be created (or that was disposed) ignores them.
#[derive(Clone)]
pub struct VoiceInput {
    inner: Arc<Inner>,
}

/// Non-owning session handle given to plugin factories.
///
/// Every call is a no-op once the session itself has been dropped.
#[derive(Clone)]
pub struct VoiceInputHandle {
    inner: Weak<Inner>,
}

impl std::fmt::Debug for VoiceInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceInput")
            .field("id", &self.inner.id)
            .field("lang", &self.inner.lang)
            .field("state", &self.state())
            .field("plugins", &self.plugin_count())
            .finish()
    }
}

impl VoiceInput {
    /// Build a session: create the provider, then resolve the plugins.
    ///
    /// A provider that cannot be created is logged once and leaves the session
    /// inert; plugins are still registered and disposed normally.
    pub fn new(factory: &dyn ProviderFactory, options: VoiceInputOptions) -> Self {
        let id = Uuid::new_v4();
        let lang = options.lang.unwrap_or_else(host_locale);
        let settings = RecognitionSettings::new(lang.clone());

        let recognizer = match factory.create(&settings) {
            Ok(provider) => Some(Recognizer::new(id, provider)),
            Err(e) => {
                tracing::error!(session_id = %id, error = %e, "Speech recognition unavailable");
                None
            }
        };

        let on_error = options.on_error.unwrap_or_else(|| Arc::new(log_provider_error));
        let session = Self {
            inner: Arc::new(Inner {
                id,
                lang,
                recognizer: Mutex::new(recognizer),
                plugins: Mutex::new(PluginDispatcher::default()),
                plugin_count: AtomicUsize::new(0),
                outbox: Mutex::new(Outbox::default()),
                on_error,
            }),
        };

        let handle = session.handle();
        let plugins = options
            .plugins
            .into_iter()
            .filter_map(|source| source.resolve(&handle))
            .collect::<Vec<_>>();
        session.inner.plugin_count.store(plugins.len(), Ordering::Release);
        *lock(&session.inner.plugins) = PluginDispatcher::new(plugins);

        tracing::info!(
            session_id = %id,
            lang = %session.inner.lang,
            plugins = session.plugin_count(),
            supported = session.is_supported(),
            "Voice input session created"
        );
        session
    }

    /// Session id, as logged with every recognizer transition.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Recognition language the provider was created with.
    pub fn lang(&self) -> &str {
        &self.inner.lang
    }

    /// A weak handle that does not keep the session alive.
    pub fn handle(&self) -> VoiceInputHandle {
        VoiceInputHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Whether a live provider backs this session.
    pub fn is_supported(&self) -> bool {
        self.inner.is_supported()
    }

    /// `None` when the session is inert or disposed.
    pub fn state(&self) -> Option<RecognizerState> {
        lock(&self.inner.recognizer).as_ref().map(Recognizer::state)
    }

    /// Whether the session is logically listening.
    pub fn recording(&self) -> bool {
        self.inner.recording()
    }

    /// Plugins still registered; zero once disposed. Safe to call from handlers.
    pub fn plugin_count(&self) -> usize {
        self.inner.plugin_count.load(Ordering::Acquire)
    }

    /// Start listening. No-op while recording.
    pub fn start(&self) {
        self.inner.start();
    }

    /// Stop listening and drop unconfirmed speech.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Finalize the pending utterance and keep listening.
    pub fn confirm(&self) {
        self.inner.confirm();
    }

    /// Stop when recording, start otherwise.
    pub fn toggle(&self) {
        self.inner.toggle();
    }

    /// Deliver one provider notification.
    pub fn handle_provider_event(&self, event: ProviderEvent) {
        self.inner.run(|r| r.handle(event));
    }

    /// Stop, release the provider, and dispose every plugin once.
    ///
    /// Idempotent. Buffers are cleared and the provider released before this
    /// returns; when called from inside a plugin handler, plugin disposal runs
    /// right after that handler's dispatch pass.
    pub fn dispose(&self) {
        self.inner.dispose();
    }
}

impl VoiceInputHandle {
    /// Whether the session is still alive.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Whether the session is alive and backed by a provider.
    pub fn is_supported(&self) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.is_supported())
    }

    pub fn recording(&self) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.recording())
    }

    pub fn start(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.start();
        }
    }

    pub fn stop(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.stop();
        }
    }

    pub fn confirm(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.confirm();
        }
    }

    pub fn toggle(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.toggle();
        }
    }

    pub fn dispose(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.dispose();
        }
    }
}

impl Inner {
    fn is_supported(&self) -> bool {
        lock(&self.recognizer).is_some()
    }

    fn recording(&self) -> bool {
        lock(&self.recognizer)
            .as_ref()
            .is_some_and(Recognizer::recording)
    }

    fn start(&self) {
        self.run(Recognizer::start);
    }

    fn stop(&self) {
        self.run(Recognizer::stop);
    }

    fn confirm(&self) {
        if let Some(r) = lock(&self.recognizer).as_mut() {
            r.confirm();
        }
    }

    fn toggle(&self) {
        self.run(|r| if r.recording() { r.stop() } else { r.start() });
    }

    fn dispose(&self) {
        self.stop();
        if lock(&self.recognizer).take().is_some() {
            tracing::info!(session_id = %self.id, "Voice input session disposed");
        }
        self.deliver([Outgoing::DisposePlugins]);
    }

    /// Run a recognizer operation, then deliver what it produced.
    fn run<F>(&self, op: F)
    where
        F: FnOnce(&mut Recognizer) -> Vec<RecognizerEvent>,
    {
        let events = match lock(&self.recognizer).as_mut() {
            Some(recognizer) => op(recognizer),
            None => return,
        };
        self.deliver(events.into_iter().map(Outgoing::Event));
    }

    fn deliver(&self, items: impl IntoIterator<Item = Outgoing>) {
        {
            let mut outbox = lock(&self.outbox);
            outbox.pending.extend(items);
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }

        loop {
            let next = {
                let mut outbox = lock(&self.outbox);
                match outbox.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        outbox.draining = false;
                        return;
                    }
                }
            };

            match next {
                Outgoing::Event(RecognizerEvent::Transcript(transcript)) => {
                    lock(&self.plugins).dispatch_transcript(&transcript);
                }
                Outgoing::Event(RecognizerEvent::StateChanged(state)) => {
                    lock(&self.plugins).dispatch_state(state);
                }
                Outgoing::Event(RecognizerEvent::Error(err)) => {
                    let sink = &self.on_error;
                    if catch_unwind(AssertUnwindSafe(|| sink(&err))).is_err() {
                        tracing::warn!(session_id = %self.id, "Error sink panicked");
                    }
                }
                Outgoing::DisposePlugins => {
                    let plugins = lock(&self.plugins).take_all();
                    self.plugin_count.store(0, Ordering::Release);
                    dispose_plugins(plugins);
                }
            }
        }
    }
}

fn log_provider_error(err: &ProviderError) {
    tracing::error!(code = %err.code, message = %err.message, "[voice input] recognition error");
}

/// Lock a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, OnceLock};
    use std::time::Duration;
    use voice_input_core::{RecordingState, ResultBatch, Result, Segment, VoiceInputError};

    use crate::plugin::{FnPlugin, Plugin};
    use crate::provider::RecognitionProvider;

    #[derive(Clone, Default)]
    struct CountingProvider {
        starts: Arc<Mutex<u32>>,
        stops: Arc<Mutex<u32>>,
    }

    impl RecognitionProvider for CountingProvider {
        fn start(&mut self) -> std::result::Result<(), ProviderError> {
            *self.starts.lock().unwrap() += 1;
            Ok(())
        }
        fn stop(&mut self) {
            *self.stops.lock().unwrap() += 1;
        }
    }

    fn factory(
        provider: CountingProvider,
    ) -> impl Fn(&RecognitionSettings) -> Result<Box<dyn RecognitionProvider>> {
        move |_: &RecognitionSettings| -> Result<Box<dyn RecognitionProvider>> {
            Ok(Box::new(provider.clone()))
        }
    }

    fn state_log(log: &Arc<Mutex<Vec<bool>>>) -> PluginSource {
        let log = log.clone();
        PluginSource::plugin(FnPlugin::new("states").with_state_change(move |s| {
            log.lock().unwrap().push(s.recording);
            Ok(())
        }))
    }

    #[test]
    fn test_lang_defaults_to_host_locale() {
        let provider = CountingProvider::default();
        let session = VoiceInput::new(&factory(provider), VoiceInputOptions::new());
        assert_eq!(session.lang(), host_locale());

        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new().lang("en-US"),
        );
        assert_eq!(session.lang(), "en-US");
    }

    #[test]
    fn test_factory_receives_streaming_settings() {
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        let factory = move |settings: &RecognitionSettings| -> Result<Box<dyn RecognitionProvider>> {
            *seen_clone.lock().unwrap() = Some(settings.clone());
            Ok(Box::new(CountingProvider::default()))
        };
        VoiceInput::new(&factory, VoiceInputOptions::new().lang("ja-JP"));

        let settings = seen.lock().unwrap().clone().unwrap();
        assert_eq!(settings, RecognitionSettings::new("ja-JP"));
    }

    #[test]
    fn test_unsupported_provider_makes_inert_session() {
        let factory = |_: &RecognitionSettings| -> Result<Box<dyn RecognitionProvider>> {
            Err(VoiceInputError::ProviderUnavailable("no engine".into()))
        };
        let log = Arc::new(Mutex::new(Vec::new()));
        let session = VoiceInput::new(&factory, VoiceInputOptions::new().plugin(state_log(&log)));

        assert!(!session.is_supported());
        assert_eq!(session.state(), None);
        session.start();
        session.confirm();
        session.toggle();
        session.handle_provider_event(ProviderEvent::End);
        assert!(!session.recording());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(session.plugin_count(), 1);
    }

    #[test]
    fn test_factory_plugin_receives_handle() {
        let provider = CountingProvider::default();
        let session = VoiceInput::new(
            &factory(provider.clone()),
            VoiceInputOptions::new()
                .plugin(PluginSource::factory(|handle| {
                    let handle = handle.clone();
                    // Stops recording as soon as any utterance finishes.
                    Some(Box::new(FnPlugin::new("one-shot").with_finish(move |_| {
                        handle.stop();
                        Ok(())
                    })) as Box<dyn Plugin>)
                }))
                .plugin(PluginSource::factory(|_| None)),
        );
        assert_eq!(session.plugin_count(), 1);

        session.start();
        session.handle_provider_event(ProviderEvent::Result(ResultBatch::new(
            0,
            vec![Segment::finalized("done")],
        )));
        assert!(!session.recording());
        assert_eq!(*provider.stops.lock().unwrap(), 1);
    }

    #[test]
    fn test_reentrant_calls_are_delivered_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new()
                .plugin(PluginSource::factory(move |handle| {
                    let handle = handle.clone();
                    Some(Box::new(FnPlugin::new("bouncer").with_state_change(
                        move |s: RecordingState| {
                            log_clone.lock().unwrap().push(s.recording);
                            if s.recording {
                                handle.stop();
                            }
                            Ok(())
                        },
                    )) as Box<dyn Plugin>)
                })),
        );

        session.start();
        assert_eq!(*log.lock().unwrap(), vec![true, false]);
        assert!(!session.recording());
    }

    #[test]
    fn test_handler_can_inspect_its_own_session() {
        let shared: Arc<OnceLock<VoiceInput>> = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (shared_clone, seen_clone) = (shared.clone(), seen.clone());
        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new().plugin(PluginSource::plugin(
                FnPlugin::new("inspector").with_state_change(move |_| {
                    if let Some(s) = shared_clone.get() {
                        let line = format!("{:?} {}", s, s.plugin_count());
                        seen_clone.lock().unwrap().push(line);
                    }
                    Ok(())
                }),
            )),
        );
        shared.set(session.clone()).unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        std::thread::spawn(move || {
            session.start();
            done_tx.send(session.recording()).unwrap();
        });
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ends_with(" 1"), "{}", seen[0]);
    }

    #[test]
    fn test_handle_reports_support() {
        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new(),
        );
        let handle = session.handle();
        assert!(handle.is_supported());

        let unavailable = |_: &RecognitionSettings| -> Result<Box<dyn RecognitionProvider>> {
            Err(VoiceInputError::ProviderUnavailable("no engine".into()))
        };
        let inert = VoiceInput::new(&unavailable, VoiceInputOptions::new());
        assert!(!inert.handle().is_supported());

        session.dispose();
        assert!(!handle.is_supported());
    }

    #[test]
    fn test_dispose_from_inside_handler() {
        let disposed = Arc::new(Mutex::new(0));
        let disposed_clone = disposed.clone();
        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new().plugin(PluginSource::factory(move |handle| {
                let handle = handle.clone();
                Some(Box::new(
                    FnPlugin::new("self-destruct")
                        .with_finish(move |_| {
                            handle.dispose();
                            Ok(())
                        })
                        .with_dispose(move || {
                            *disposed_clone.lock().unwrap() += 1;
                            Ok(())
                        }),
                ) as Box<dyn Plugin>)
            })),
        );

        session.start();
        session.handle_provider_event(ProviderEvent::Result(ResultBatch::new(
            0,
            vec![Segment::finalized("bye")],
        )));
        assert_eq!(*disposed.lock().unwrap(), 1);
        assert_eq!(session.plugin_count(), 0);
        assert!(!session.is_supported());
    }

    #[test]
    fn test_error_sink_receives_provider_error() {
        let errors = Arc::new(Mutex::new(Vec::new()));
        let errors_clone = errors.clone();
        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new().on_error(move |e| errors_clone.lock().unwrap().push(e.clone())),
        );
        session.start();
        session.handle_provider_event(ProviderEvent::Error(ProviderError::new(
            "network", "offline",
        )));

        assert!(!session.recording());
        assert_eq!(session.state(), Some(RecognizerState::Stopped));
        assert_eq!(
            *errors.lock().unwrap(),
            vec![ProviderError::new("network", "offline")]
        );
    }

    #[test]
    fn test_panicking_error_sink_does_not_wedge_session() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new()
                .plugin(state_log(&log))
                .on_error(|_| panic!("sink exploded")),
        );
        session.start();
        session.handle_provider_event(ProviderEvent::Error(ProviderError::new("aborted", "")));
        session.start();
        assert_eq!(*log.lock().unwrap(), vec![true, false, true]);
    }

    #[test]
    fn test_handle_outlives_session_as_noop() {
        let session = VoiceInput::new(
            &factory(CountingProvider::default()),
            VoiceInputOptions::new(),
        );
        let handle = session.handle();
        assert!(handle.is_alive());
        drop(session);

        assert!(!handle.is_alive());
        handle.start();
        handle.toggle();
        handle.dispose();
        assert!(!handle.recording());
    }

    #[test]
    fn test_toggle_flips_recording() {
        let provider = CountingProvider::default();
        let session = VoiceInput::new(&factory(provider.clone()), VoiceInputOptions::new());
        session.toggle();
        assert!(session.recording());
        session.toggle();
        assert!(!session.recording());
        assert_eq!(*provider.starts.lock().unwrap(), 1);
        assert_eq!(*provider.stops.lock().unwrap(), 1);
    }
}
