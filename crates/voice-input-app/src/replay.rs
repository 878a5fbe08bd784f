//! Provider standing in for a speech engine while a script is replayed.
//!
//! The script itself supplies every notification; the provider only records
//! the instructions it receives.

use voice_input_core::{ProviderError, Result};
use voice_input_engine::{ProviderFactory, RecognitionProvider, RecognitionSettings};

pub struct ReplayProvider {
    lang: String,
    starts: u32,
}

impl RecognitionProvider for ReplayProvider {
    fn start(&mut self) -> std::result::Result<(), ProviderError> {
        self.starts += 1;
        tracing::debug!(lang = %self.lang, starts = self.starts, "Replay provider started");
        Ok(())
    }

    fn stop(&mut self) {
        tracing::debug!(lang = %self.lang, "Replay provider stopped");
    }
}

pub struct ReplayFactory;

impl ProviderFactory for ReplayFactory {
    fn create(&self, settings: &RecognitionSettings) -> Result<Box<dyn RecognitionProvider>> {
        tracing::info!(
            lang = %settings.lang,
            continuous = settings.continuous,
            interim_results = settings.interim_results,
            "Creating replay provider"
        );
        Ok(Box::new(ReplayProvider {
            lang: settings.lang.clone(),
            starts: 0,
        }))
    }
}
