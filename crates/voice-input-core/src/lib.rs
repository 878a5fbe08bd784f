pub mod config;
pub mod error;
pub mod types;

pub use config::VoiceInputConfig;
pub use error::{Result, VoiceInputError};
pub use types::*;
