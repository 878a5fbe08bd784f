//! `voice-input` binary - replays a dictation script through a real session.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the session with the configured setup and a printing plugin
//! 4. Feed every script step through the command pump

mod cli;
mod printer;
mod replay;
mod script;

use clap::Parser;

use voice_input_core::VoiceInputConfig;
use voice_input_engine::{command_channel, run_command_pump, PluginSource, SessionCommand};
use voice_input_setup::{setup, Host, SetupOptions};

use crate::cli::CliArgs;
use crate::printer::PrintingPlugin;
use crate::replay::ReplayFactory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let mut config = VoiceInputConfig::load_or_default(&config_file);
    args.apply_overrides(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    let log_level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting voice-input v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let source = tokio::fs::read_to_string(&args.script).await?;
    let steps = script::parse_script(&source)?;
    tracing::info!(path = %args.script.display(), steps = steps.len(), "Script loaded");

    let options = SetupOptions::from_config(&config)
        .plugin(PluginSource::plugin(PrintingPlugin::new(std::io::stdout())));
    let session = setup(&ReplayFactory, options, &Host::new())?;

    let started = chrono::Utc::now();
    let (commands, receiver) = command_channel();
    let pump = tokio::spawn(run_command_pump(session, receiver));

    for step in steps {
        if commands.send(SessionCommand::from(step)).is_err() {
            tracing::warn!("Session closed before the script finished");
            break;
        }
    }
    drop(commands);

    let applied = pump.await?;
    let elapsed_ms = (chrono::Utc::now() - started).num_milliseconds();
    tracing::info!(applied, elapsed_ms, "Script finished");

    Ok(())
}
