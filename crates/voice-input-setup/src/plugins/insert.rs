//! Insert finished transcripts into the focused text field.

use std::sync::Arc;

use voice_input_core::Result;
use voice_input_engine::Plugin;

/// Where finished transcripts are typed.
pub trait TextSink: Send + Sync {
    /// Insert `text` at the caret of the focused text field.
    ///
    /// Returns `false` when nothing editable has focus.
    fn insert_text(&self, text: &str) -> bool;
}

impl<F> TextSink for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn insert_text(&self, text: &str) -> bool {
        self(text)
    }
}

pub struct InsertTextPlugin {
    sink: Arc<dyn TextSink>,
}

impl InsertTextPlugin {
    pub fn new(sink: Arc<dyn TextSink>) -> Self {
        Self { sink }
    }
}

impl Plugin for InsertTextPlugin {
    fn name(&self) -> &str {
        "insert-text"
    }

    fn on_finish(&mut self, transcript: &str) -> Result<()> {
        if !self.sink.insert_text(transcript) {
            tracing::debug!(len = transcript.len(), "No focused text field, transcript dropped");
        }
        Ok(())
    }
}
