//! Recognition session states.
//!
//! Valid transitions:
//! - Unstarted -> Started (first `start`)
//! - Started -> Stopped (`stop`, or a provider error)
//! - Stopped -> Started (`start` again)
//! - Unstarted -> Stopped (provider error before anything was started)
//!
//! Re-entering the current state is never a transition and never notifies.

use std::fmt;

/// Logical state of a recognition session.
///
/// This is the caller's view: a provider that ended on its own while the
/// session is `Started` gets restarted behind the scenes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RecognizerState {
    /// Created but never started.
    #[default]
    Unstarted,
    /// Listening, including across provider restarts.
    Started,
    /// Explicitly stopped, or stopped by a provider error.
    Stopped,
}

impl fmt::Display for RecognizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognizerState::Unstarted => write!(f, "Unstarted"),
            RecognizerState::Started => write!(f, "Started"),
            RecognizerState::Stopped => write!(f, "Stopped"),
        }
    }
}

impl RecognizerState {
    /// Returns whether a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: &RecognizerState) -> bool {
        matches!(
            (self, target),
            (RecognizerState::Unstarted, RecognizerState::Started)
                | (RecognizerState::Stopped, RecognizerState::Started)
                | (RecognizerState::Started, RecognizerState::Stopped)
                // Provider failed before the first start
                | (RecognizerState::Unstarted, RecognizerState::Stopped)
        )
    }

    pub fn is_recording(&self) -> bool {
        *self == RecognizerState::Started
    }
}

// =============================================================================
// Tests
// =============================================================================
