use thiserror::Error;

/// Top-level error type for the voice input system.
///
/// Provider failures carry the provider's own error code so the caller-supplied
/// error sink can tell a denied microphone apart from a network hiccup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VoiceInputError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech recognition unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Speech recognition error [{code}]: {message}")]
    Provider { code: String, message: String },

    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    #[error("Invalid keyboard shortcut: {0}")]
    InvalidShortcut(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VoiceInputError {
    /// Shorthand for a plugin handler failure.
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        VoiceInputError::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for VoiceInputError {
    fn from(err: toml::de::Error) -> Self {
        VoiceInputError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for VoiceInputError {
    fn from(err: toml::ser::Error) -> Self {
        VoiceInputError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for VoiceInputError {
    fn from(err: serde_json::Error) -> Self {
        VoiceInputError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for voice input operations.
pub type Result<T> = std::result::Result<T, VoiceInputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VoiceInputError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(VoiceInputError, &str)> = vec![
            (
                VoiceInputError::ProviderUnavailable("no engine".to_string()),
                "Speech recognition unavailable: no engine",
            ),
            (
                VoiceInputError::Provider {
                    code: "not-allowed".to_string(),
                    message: "permission denied".to_string(),
                },
                "Speech recognition error [not-allowed]: permission denied",
            ),
            (
                VoiceInputError::plugin("overlay", "render failed"),
                "Plugin 'overlay' failed: render failed",
            ),
            (
                VoiceInputError::InvalidShortcut("".to_string()),
                "Invalid keyboard shortcut: ",
            ),
            (
                VoiceInputError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VoiceInputError = io_err.into();
        assert!(matches!(err, VoiceInputError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: VoiceInputError = err.unwrap_err().into();
        assert!(matches!(err, VoiceInputError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: VoiceInputError = err.unwrap_err().into();
        assert!(matches!(err, VoiceInputError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(format!("got {}", value))
        }

        assert_eq!(inner().unwrap(), "got 42");
    }
}
