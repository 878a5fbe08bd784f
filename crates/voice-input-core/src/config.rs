use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for voice input.
///
/// Loaded from `~/.voice-input/config.toml` by default. Every section and field is
/// optional; anything missing falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoiceInputConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub setup: SetupConfig,
}

impl VoiceInputConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoiceInputConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Recognition provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// BCP 47 language tag. Empty means the host locale.
    pub lang: String,
}

impl RecognitionConfig {
    /// The configured language, or the host locale when none is set.
    pub fn resolved_lang(&self) -> String {
        match self.lang.trim() {
            "" => host_locale(),
            lang => lang.to_string(),
        }
    }
}

/// Settings for the built-in setup plugins.
///
/// Empty strings disable the corresponding shortcut or attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Shortcut toggling (or, in pressing mode, holding) recording.
    pub keyboard_shortcut: String,
    /// Record only while the shortcut is held down.
    pub keyboard_shortcut_pressing: bool,
    /// Shortcut forcing the current utterance to finalize.
    pub confirm_keyboard_shortcut: String,
    /// Attribute marking toggle buttons; also receives `recording`/`stopped`.
    pub toggle_button_attribute: String,
    /// Attribute on a toggle button naming the selector to focus once recording.
    pub toggle_button_focus_attribute: String,
    /// Insert finished transcripts into the focused text field.
    pub insert_text: bool,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            keyboard_shortcut: "Alt+v".to_string(),
            keyboard_shortcut_pressing: false,
            confirm_keyboard_shortcut: String::new(),
            toggle_button_attribute: "data-voice-input".to_string(),
            toggle_button_focus_attribute: "data-voice-input-focus".to_string(),
            insert_text: true,
            overlay: OverlayConfig::default(),
        }
    }
}

impl SetupConfig {
    pub fn keyboard_shortcut(&self) -> Option<&str> {
        non_empty(&self.keyboard_shortcut)
    }

    pub fn confirm_keyboard_shortcut(&self) -> Option<&str> {
        non_empty(&self.confirm_keyboard_shortcut)
    }

    pub fn toggle_button_attribute(&self) -> Option<&str> {
        non_empty(&self.toggle_button_attribute)
    }

    pub fn toggle_button_focus_attribute(&self) -> Option<&str> {
        non_empty(&self.toggle_button_focus_attribute)
    }
}

/// Interim transcript overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub class_name: String,
    /// CSS declarations applied to the overlay element.
    pub style: BTreeMap<String, String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let style = [
            ("position", "fixed"),
            ("top", "80px"),
            ("left", "50%"),
            ("z-index", "2147483647"),
            ("display", "inline-block"),
            ("max-width", "50%"),
            ("padding", "8px 16px"),
            ("font-family", "sans-serif"),
            ("font-size", "20px"),
            ("line-height", "26px"),
            ("color", "#333"),
            ("text-align", "center"),
            ("pointer-events", "none"),
            ("background-color", "#fffc"),
            ("backdrop-filter", "blur(12px)"),
            ("border-radius", "8px"),
            ("box-shadow", "0 0 0 1px #2222,0 4px 12px 0 #0002"),
            ("transform", "translateX(-50%)"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            enabled: true,
            class_name: "voice-input-modal".to_string(),
            style,
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

// =============================================================================
// Host locale
// =============================================================================

/// Language tag of the host locale, or an empty string (provider default)
/// when none can be determined.
pub fn host_locale() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|raw| locale_to_language_tag(&raw))
        .unwrap_or_default()
}

/// Convert a POSIX locale (`en_US.UTF-8`, `de_DE@euro`) to a BCP 47 tag (`en-US`).
///
/// Returns `None` for empty, `C` and `POSIX` locales.
pub fn locale_to_language_tag(raw: &str) -> Option<String> {
    let base = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

// =============================================================================
// Tests
// =============================================================================
