//! The streaming speech-recognition capability the session drives.
//!
//! A provider only receives start/stop instructions. Everything it produces
//! (result batches, end, errors) flows back through
//! [`VoiceInput::handle_provider_event`](crate::VoiceInput::handle_provider_event),
//! one notification at a time and in order.

use voice_input_core::{ProviderError, Result};

/// How the provider should stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    /// BCP 47 language tag. Empty lets the provider pick.
    pub lang: String,
    /// Keep listening across pauses instead of ending after one phrase.
    pub continuous: bool,
    /// Deliver interim (not yet final) results.
    pub interim_results: bool,
    /// Alternatives per segment; only the first one is ever read.
    pub max_alternatives: u32,
}

impl RecognitionSettings {
    /// Continuous, interim-enabled, single-alternative streaming in `lang`.
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            continuous: true,
            interim_results: true,
            max_alternatives: 1,
        }
    }
}

/// A live recognition stream.
pub trait RecognitionProvider: Send {
    /// Begin (or resume) streaming.
    fn start(&mut self) -> std::result::Result<(), ProviderError>;

    /// Halt streaming. Pending interim speech is delivered as a final batch,
    /// followed by an end notification.
    fn stop(&mut self);
}

/// Creates providers; construction may fail when recognition is unsupported.
pub trait ProviderFactory {
    fn create(&self, settings: &RecognitionSettings) -> Result<Box<dyn RecognitionProvider>>;

    /// Whether this host can provide speech recognition at all.
    fn is_supported(&self) -> bool {
        true
    }
}

impl<F> ProviderFactory for F
where
    F: Fn(&RecognitionSettings) -> Result<Box<dyn RecognitionProvider>>,
{
    fn create(&self, settings: &RecognitionSettings) -> Result<Box<dyn RecognitionProvider>> {
        self(settings)
    }
}
