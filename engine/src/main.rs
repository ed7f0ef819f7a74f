// Coursewright course-design assistant
// Main entry point for the coursewright binary

use clap::Parser;
use coursewright_engine::cli::{Cli, Command, ConfigAction};
use coursewright_engine::config::Config;
use coursewright_engine::handlers::{
    handle_agents, handle_chat, handle_config_show, handle_faq, handle_replay, handle_send,
    OutputFormat,
};
use coursewright_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Coursewright v{} ({} - {})", version, commit, timestamp);

    // Handle commands
    match cli.command {
        Command::Chat { save } => handle_chat(save, &config, format).await,

        Command::Send { message } => handle_send(message, &config, format).await,

        Command::Agents => handle_agents(&config, format),

        Command::Faq { question } => handle_faq(question, &config, format).await,

        Command::Replay { file } => handle_replay(file, &config, format),

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
        },
    }
}
