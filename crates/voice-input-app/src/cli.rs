//! CLI argument definitions for the `voice-input` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use voice_input_core::VoiceInputConfig;

/// Replay a scripted dictation session through the voice input engine.
#[derive(Parser, Debug)]
#[command(name = "voice-input", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Recognition language (BCP 47 tag, e.g. `ja-JP`).
    #[arg(long = "lang")]
    pub lang: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// JSON-lines file of session steps.
    pub script: PathBuf,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > VOICE_INPUT_CONFIG env var > ~/.voice-input/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("VOICE_INPUT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level. Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config: &VoiceInputConfig) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config.general.log_level.clone())
    }

    /// Apply command-line overrides to the loaded configuration.
    pub fn apply_overrides(&self, config: &mut VoiceInputConfig) {
        if let Some(ref lang) = self.lang {
            config.recognition.lang = lang.clone();
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".voice-input").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".voice-input").join("config.toml");
    }
    PathBuf::from("config.toml")
}
