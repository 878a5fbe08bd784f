//! Keyboard shortcut strings and key event matching.
//!
//! A shortcut is a `+`-separated, case-insensitive list of modifiers followed by
//! one key, e.g. `Alt+v`, `Mod+Shift+Space`, `Ctrl+Enter`. `Mod` means Cmd on
//! macOS and Ctrl everywhere else.

use std::fmt;
use std::str::FromStr;

use voice_input_core::VoiceInputError;

/// Host platform, for resolving `Mod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") || cfg!(target_os = "ios") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

/// A physical key event as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// Physical key code (`KeyV`, `Digit1`, `Space`, `ControlLeft`, ...).
    pub code: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

/// A parsed keyboard shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    /// Lowercase key name, compared against the normalized event code.
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    /// Platform command modifier (Cmd on macOS, Ctrl elsewhere).
    pub primary: bool,
}

impl KeyChord {
    pub fn parse(shortcut: &str) -> Result<Self, VoiceInputError> {
        shortcut.parse()
    }

    /// Whether `event` is exactly this chord.
    ///
    /// With `Mod`, only the platform command key is checked; otherwise Ctrl and
    /// Meta must match exactly. Alt and Shift always must match exactly.
    pub fn matches(&self, event: &KeyEvent, platform: Platform) -> bool {
        let command_keys = if self.primary {
            match platform {
                Platform::Mac => event.meta,
                Platform::Other => event.ctrl,
            }
        } else {
            event.ctrl == self.ctrl && event.meta == self.meta
        };

        command_keys
            && event.alt == self.alt
            && event.shift == self.shift
            && normalize_code(&event.code) == self.key
    }
}

impl FromStr for KeyChord {
    type Err = VoiceInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let mut parts: Vec<&str> = lowered.split('+').map(str::trim).collect();
        let key = parts.pop().unwrap_or_default();
        if key.is_empty() {
            return Err(VoiceInputError::InvalidShortcut(s.to_string()));
        }

        let mut chord = KeyChord {
            key: key.to_string(),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            primary: false,
        };
        for modifier in parts {
            match modifier {
                "ctrl" => chord.ctrl = true,
                "alt" => chord.alt = true,
                "shift" => chord.shift = true,
                "meta" => chord.meta = true,
                "mod" => chord.primary = true,
                _ => return Err(VoiceInputError::InvalidShortcut(s.to_string())),
            }
        }
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.primary, "Mod"),
            (self.ctrl, "Ctrl"),
            (self.meta, "Meta"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
        ];
        for (_, name) in flags.iter().filter(|(on, _)| *on) {
            write!(f, "{}+", name)?;
        }
        write!(f, "{}", self.key)
    }
}

/// Reduce a physical key code to the name used in shortcut strings:
/// `KeyV` → `v`, `Digit1` → `1`, `ControlLeft` → `control`, `Space` → `space`.
pub fn normalize_code(code: &str) -> String {
    let stripped = code
        .strip_prefix("Key")
        .or_else(|| code.strip_prefix("Digit"))
        .unwrap_or(code);

    let sided = ["Alt", "Control", "Meta"].into_iter().find(|base| {
        stripped
            .strip_prefix(base)
            .is_some_and(|side| side == "Left" || side == "Right")
    });

    sided.unwrap_or(stripped).to_lowercase()
}

// =============================================================================
// Tests
// =============================================================================
