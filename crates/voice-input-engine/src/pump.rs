//! Serialized delivery of caller commands and provider notifications.
//!
//! Providers that stream on their own threads push into a [`CommandSender`];
//! [`run_command_pump`] applies everything to the session one item at a time,
//! in arrival order.

use tokio::sync::mpsc;

use voice_input_core::ProviderEvent;

use crate::session::VoiceInput;

/// One unit of work for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    Stop,
    Confirm,
    Toggle,
    Provider(ProviderEvent),
}

pub type CommandSender = mpsc::UnboundedSender<SessionCommand>;
pub type CommandReceiver = mpsc::UnboundedReceiver<SessionCommand>;

pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}

impl VoiceInput {
    /// Apply a single command.
    pub fn apply(&self, command: SessionCommand) {
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::Stop => self.stop(),
            SessionCommand::Confirm => self.confirm(),
            SessionCommand::Toggle => self.toggle(),
            SessionCommand::Provider(event) => self.handle_provider_event(event),
        }
    }
}

/// Apply commands until every sender is dropped, then dispose the session.
///
/// Returns the number of commands applied.
pub async fn run_command_pump(session: VoiceInput, mut commands: CommandReceiver) -> usize {
    tracing::info!(session_id = %session.id(), "Command pump started");
    let mut applied = 0;
    while let Some(command) = commands.recv().await {
        session.apply(command);
        applied += 1;
    }
    tracing::info!(session_id = %session.id(), applied, "Command channel closed");
    session.dispose();
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use voice_input_core::{ProviderError, ResultBatch, Result, Segment};

    use crate::plugin::{FnPlugin, PluginSource};
    use crate::provider::{RecognitionProvider, RecognitionSettings};
    use crate::session::VoiceInputOptions;

    struct Quiet;

    impl RecognitionProvider for Quiet {
        fn start(&mut self) -> std::result::Result<(), ProviderError> {
            Ok(())
        }
        fn stop(&mut self) {}
    }

    fn quiet(_: &RecognitionSettings) -> Result<Box<dyn RecognitionProvider>> {
        Ok(Box::new(Quiet))
    }

    #[tokio::test]
    async fn test_pump_applies_in_order_and_disposes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (l1, l2) = (log.clone(), log.clone());
        let session = VoiceInput::new(
            &quiet,
            VoiceInputOptions::new().lang("en-US").plugin(PluginSource::plugin(
                FnPlugin::new("log")
                    .with_finish(move |t| {
                        l1.lock().unwrap().push(t.to_string());
                        Ok(())
                    })
                    .with_dispose(move || {
                        l2.lock().unwrap().push("disposed".to_string());
                        Ok(())
                    }),
            )),
        );

        let (tx, rx) = command_channel();
        let pump = tokio::spawn(run_command_pump(session.clone(), rx));

        let producer = tx.clone();
        tokio::spawn(async move {
            producer.send(SessionCommand::Start).unwrap();
            producer
                .send(SessionCommand::Provider(ProviderEvent::Result(
                    ResultBatch::new(0, vec![Segment::finalized("from a thread")]),
                )))
                .unwrap();
        })
        .await
        .unwrap();
        drop(tx);

        assert_eq!(pump.await.unwrap(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["from a thread", "disposed"]);
        assert!(!session.is_supported());
    }

    #[test]
    fn test_apply_routes_every_command() {
        let session = VoiceInput::new(&quiet, VoiceInputOptions::new());
        session.apply(SessionCommand::Toggle);
        assert!(session.recording());
        session.apply(SessionCommand::Confirm);
        assert!(session.recording());
        session.apply(SessionCommand::Stop);
        assert!(!session.recording());
        session.apply(SessionCommand::Start);
        assert!(session.recording());
    }
}
