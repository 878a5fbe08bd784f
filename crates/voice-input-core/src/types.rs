use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VoiceInputError;

// =============================================================================
// Provider payloads
// =============================================================================

/// One recognized fragment of speech (the single best alternative).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Recognized text, including whatever spacing the provider inserted.
    pub text: String,
    /// Whether the provider has committed this fragment.
    #[serde(default)]
    pub is_final: bool,
}

impl Segment {
    /// A not-yet-committed fragment.
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    /// A committed fragment.
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// The results delivered by the provider in a single notification.
///
/// Segments before `result_index` were already processed by an earlier batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBatch {
    #[serde(default)]
    pub result_index: usize,
    pub results: Vec<Segment>,
}

impl ResultBatch {
    pub fn new(result_index: usize, results: Vec<Segment>) -> Self {
        Self {
            result_index,
            results,
        }
    }

    /// Segments that still need reconciling.
    pub fn pending(&self) -> &[Segment] {
        self.results.get(self.result_index..).unwrap_or(&[])
    }
}

/// Error reported by a running provider (e.g. `not-allowed`, `network`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ProviderError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl From<ProviderError> for VoiceInputError {
    fn from(err: ProviderError) -> Self {
        VoiceInputError::Provider {
            code: err.code,
            message: err.message,
        }
    }
}

/// Notifications a recognition provider delivers, strictly in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderEvent {
    /// A batch of interim and/or final results.
    Result(ResultBatch),
    /// The provider stopped streaming (on request or spontaneously).
    End,
    /// The provider failed.
    Error(ProviderError),
}

// =============================================================================
// Session outputs
// =============================================================================

/// Recording flag passed to `on_state_change` listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingState {
    pub recording: bool,
}

/// One reconciled transcript emission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    /// `true` while the utterance is still being spoken.
    pub interim: bool,
}

// =============================================================================
// Tests
// =============================================================================
