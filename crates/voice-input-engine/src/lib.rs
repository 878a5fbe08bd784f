//! Voice input engine - recognition session state machine, transcript
//! reconciliation, and plugin dispatch.
//!
//! A [`VoiceInput`] keeps one recognition session running until it is
//! explicitly stopped: provider terminations while listening are restarted
//! transparently, and interim/final results are folded into a single transcript
//! that is handed to every registered [`Plugin`].

pub mod dispatcher;
pub mod plugin;
pub mod provider;
pub mod pump;
pub mod recognizer;
pub mod reconcile;
pub mod session;
pub mod state;

pub use dispatcher::PluginDispatcher;
pub use plugin::{FnPlugin, Plugin, PluginSource};
pub use provider::{ProviderFactory, RecognitionProvider, RecognitionSettings};
pub use pump::{command_channel, run_command_pump, CommandSender, SessionCommand};
pub use recognizer::{Recognizer, RecognizerEvent};
pub use reconcile::TranscriptReconciler;
pub use session::{ErrorSink, VoiceInput, VoiceInputHandle, VoiceInputOptions};
pub use state::RecognizerState;
