//! Recognition session state machine.
//!
//! The `Recognizer` owns the provider and the transcript buffers. Every
//! operation returns the notifications it produced; delivering them to plugins
//! is the caller's job, so no listener ever runs while the recognizer is
//! mid-operation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use voice_input_core::{ProviderError, ProviderEvent, RecordingState, ResultBatch, Transcript};

use crate::provider::RecognitionProvider;
use crate::reconcile::TranscriptReconciler;
use crate::state::RecognizerState;

/// A notification produced by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    /// The logical state changed between recording and not recording.
    StateChanged(RecordingState),
    /// A reconciled transcript is ready.
    Transcript(Transcript),
    /// The provider failed; the session is now stopped.
    Error(ProviderError),
}

/// Drives one provider through start/stop/confirm and auto-restart.
pub struct Recognizer {
    session_id: Uuid,
    provider: Box<dyn RecognitionProvider>,
    state: RecognizerState,
    reconciler: TranscriptReconciler,
    started_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("reconciler", &self.reconciler)
            .field("started_at", &self.started_at)
            .finish()
    }
}

impl Recognizer {
    /// Wrap a provider in a fresh, unstarted session.
    pub fn new(session_id: Uuid, provider: Box<dyn RecognitionProvider>) -> Self {
        Self {
            session_id,
            provider,
            state: RecognizerState::Unstarted,
            reconciler: TranscriptReconciler::new(),
            started_at: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecognizerState {
        self.state
    }

    /// Whether the session is logically listening.
    pub fn recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Transcript buffers of the current utterance.
    pub fn reconciler(&self) -> &TranscriptReconciler {
        &self.reconciler
    }

    /// Begin listening. No-op while already started.
    pub fn start(&mut self) -> Vec<RecognizerEvent> {
        let mut events = Vec::new();
        if self.state == RecognizerState::Started {
            return events;
        }

        self.transition(RecognizerState::Started, &mut events);
        tracing::info!(session_id = %self.session_id, "Recognition started");
        if let Err(err) = self.provider.start() {
            self.fail(err, &mut events);
        }
        events
    }

    /// Stop listening and discard any unconfirmed speech. No-op unless started.
    pub fn stop(&mut self) -> Vec<RecognizerEvent> {
        let mut events = Vec::new();
        if self.state != RecognizerState::Started {
            return events;
        }

        self.reconciler.clear();
        let elapsed = self.listening_secs();
        self.transition(RecognizerState::Stopped, &mut events);
        self.provider.stop();
        tracing::info!(
            session_id = %self.session_id,
            elapsed_secs = elapsed,
            "Recognition stopped"
        );
        events
    }

    /// Force the current utterance to finalize.
    ///
    /// Halts the provider without leaving `Started`: the provider answers with a
    /// final batch and an end notification, after which it is restarted. Returns
    /// whether the halt was issued (only when started with pending text).
    pub fn confirm(&mut self) -> bool {
        if self.state != RecognizerState::Started || !self.reconciler.has_pending() {
            return false;
        }
        tracing::debug!(session_id = %self.session_id, "Confirming pending utterance");
        self.provider.stop();
        true
    }

    /// Apply one provider notification.
    pub fn handle(&mut self, event: ProviderEvent) -> Vec<RecognizerEvent> {
        let mut events = Vec::new();
        match event {
            ProviderEvent::Result(batch) => self.on_result(&batch, &mut events),
            ProviderEvent::End => self.on_end(&mut events),
            ProviderEvent::Error(err) => self.fail(err, &mut events),
        }
        events
    }

    fn on_result(&mut self, batch: &ResultBatch, events: &mut Vec<RecognizerEvent>) {
        if self.state != RecognizerState::Started {
            tracing::debug!(
                session_id = %self.session_id,
                state = %self.state,
                "Ignoring results delivered outside a started session"
            );
            return;
        }
        if let Some(transcript) = self.reconciler.apply(batch) {
            tracing::debug!(
                session_id = %self.session_id,
                text_len = transcript.text.len(),
                interim = transcript.interim,
                "Transcript reconciled"
            );
            events.push(RecognizerEvent::Transcript(transcript));
        }
    }

    fn on_end(&mut self, events: &mut Vec<RecognizerEvent>) {
        if self.state != RecognizerState::Started {
            return;
        }
        // The provider ended on its own (or after `confirm`); keep listening.
        tracing::debug!(session_id = %self.session_id, "Provider ended, restarting");
        if let Err(err) = self.provider.start() {
            self.fail(err, events);
        }
    }

    fn fail(&mut self, err: ProviderError, events: &mut Vec<RecognizerEvent>) {
        tracing::error!(
            session_id = %self.session_id,
            code = %err.code,
            message = %err.message,
            "Recognition error"
        );
        self.reconciler.clear();
        self.transition(RecognizerState::Stopped, events);
        events.push(RecognizerEvent::Error(err));
    }

    fn transition(&mut self, target: RecognizerState, events: &mut Vec<RecognizerEvent>) {
        if !self.state.can_transition_to(&target) {
            return;
        }
        tracing::debug!(
            session_id = %self.session_id,
            "Recognition state: {} -> {}",
            self.state,
            target
        );
        self.state = target;
        self.started_at = target.is_recording().then(Utc::now);
        events.push(RecognizerEvent::StateChanged(RecordingState {
            recording: target.is_recording(),
        }));
    }

    fn listening_secs(&self) -> f32 {
        self.started_at
            .map(|t| (Utc::now() - t).num_milliseconds() as f32 / 1000.0)
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
