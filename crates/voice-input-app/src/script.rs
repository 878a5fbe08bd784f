//! JSON-lines session scripts.
//!
//! One step per line; blank lines and `#` comments are skipped:
//!
//! ```text
//! {"op":"start"}
//! {"op":"result","result_index":0,"results":[{"text":"hello","is_final":false}]}
//! {"op":"end"}
//! ```

use serde::Deserialize;

use voice_input_core::{ProviderError, ProviderEvent, ResultBatch, Segment, VoiceInputError};
use voice_input_engine::SessionCommand;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Start,
    Stop,
    Confirm,
    Toggle,
    Result {
        #[serde(default)]
        result_index: usize,
        results: Vec<Segment>,
    },
    End,
    Error {
        code: String,
        #[serde(default)]
        message: String,
    },
}

impl From<Step> for SessionCommand {
    fn from(step: Step) -> Self {
        match step {
            Step::Start => SessionCommand::Start,
            Step::Stop => SessionCommand::Stop,
            Step::Confirm => SessionCommand::Confirm,
            Step::Toggle => SessionCommand::Toggle,
            Step::Result {
                result_index,
                results,
            } => SessionCommand::Provider(ProviderEvent::Result(ResultBatch::new(
                result_index,
                results,
            ))),
            Step::End => SessionCommand::Provider(ProviderEvent::End),
            Step::Error { code, message } => {
                SessionCommand::Provider(ProviderEvent::Error(ProviderError::new(code, message)))
            }
        }
    }
}

/// Parse a whole script. The first bad line fails the parse.
pub fn parse_script(source: &str) -> Result<Vec<Step>, VoiceInputError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                VoiceInputError::Serialization(format!("script line {}: {}", index + 1, e))
            })
        })
        .collect()
}
