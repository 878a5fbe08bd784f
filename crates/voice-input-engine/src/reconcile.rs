//! Folds provider result batches into one running transcript.
//!
//! Final segments accumulate until a batch resolves with no interim remainder,
//! which marks the end of an utterance. Interim text is rebuilt from scratch on
//! every batch.

use voice_input_core::{ResultBatch, Transcript};

/// Transcript buffers for the utterance currently being spoken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptReconciler {
    final_text: String,
    interim_text: String,
}

impl TranscriptReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed text of the current utterance.
    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    /// Uncommitted text from the latest batch.
    pub fn interim_text(&self) -> &str {
        &self.interim_text
    }

    /// Whether either buffer holds text.
    pub fn has_pending(&self) -> bool {
        !self.final_text.is_empty() || !self.interim_text.is_empty()
    }

    /// Discard both buffers.
    pub fn clear(&mut self) {
        self.final_text.clear();
        self.interim_text.clear();
    }

    /// Apply one batch and return the transcript to emit, if any.
    ///
    /// Nothing is returned when the combined text is blank. Once a batch leaves
    /// no interim text behind, the utterance is complete and the final buffer is
    /// reset for the next one, whether or not anything was emitted.
    pub fn apply(&mut self, batch: &ResultBatch) -> Option<Transcript> {
        self.interim_text.clear();
        for segment in batch.pending() {
            if segment.is_final {
                self.final_text.push_str(&segment.text);
            } else {
                self.interim_text.push_str(&segment.text);
            }
        }

        let combined = format!("{}{}", self.final_text, self.interim_text);
        let text = collapse_cjk_spacing(combined.trim());
        let interim = !self.interim_text.trim().is_empty();

        if !interim {
            self.final_text.clear();
        }

        (!text.is_empty()).then_some(Transcript { text, interim })
    }
}

/// Whether `c` belongs to a script written without spaces between words
/// (hiragana, katakana, the prolonged sound mark, and CJK ideographs).
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3041}'..='\u{3093}'
        | '\u{30A1}'..='\u{30F6}'
        | '\u{30FC}'
        | '\u{4E00}'..='\u{9FA0}')
}

/// Remove whitespace runs sitting between two CJK characters.
///
/// Speech providers insert spaces between recognized words even in Japanese and
/// Chinese, where they are not part of the text.
pub fn collapse_cjk_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    let mut prev: Option<char> = None;

    while let Some((start, c)) = chars.next() {
        if !c.is_whitespace() {
            out.push(c);
            prev = Some(c);
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }

        let next = chars.peek().map(|&(_, n)| n);
        let between_cjk = prev.is_some_and(is_cjk) && next.is_some_and(is_cjk);
        if !between_cjk {
            out.push_str(&text[start..end]);
        }
        prev = Some(c);
    }

    out
}

// =============================================================================
// Tests
// =============================================================================
