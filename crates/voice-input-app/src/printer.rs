//! Plugin echoing transcripts and state changes to a writer.

use std::io::Write;

use voice_input_core::{RecordingState, Result};
use voice_input_engine::Plugin;

/// Writes `~ text` for interim transcripts, `= text` for final ones and
/// `[recording]` / `[stopped]` on state changes.
pub struct PrintingPlugin<W> {
    out: W,
}

impl<W: Write + Send> PrintingPlugin<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Plugin for PrintingPlugin<W> {
    fn name(&self) -> &str {
        "printer"
    }

    fn on_result(&mut self, transcript: &str, interim: bool) -> Result<()> {
        let marker = if interim { '~' } else { '=' };
        writeln!(self.out, "{} {}", marker, transcript)?;
        Ok(())
    }

    fn on_state_change(&mut self, state: RecordingState) -> Result<()> {
        let label = if state.recording { "recording" } else { "stopped" };
        writeln!(self.out, "[{}]", label)?;
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
