//! GuideChat - streaming campus guide chat
//!
#![doc = "GuideChat - streaming campus guide chat"]
#![doc = "Main entry point for the GuideChat application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use guidechat::cli::{Cli, Commands};
use guidechat::commands;
use guidechat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/guidechat.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;
    tracing::info!(model = %config.endpoint.model, "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Chat { place } => {
            if let Some(id) = place {
                tracing::debug!("Using place override: {}", id);
            }
            commands::chat::run_chat(config, place).await?;
            Ok(())
        }
        Commands::Ask { prompt, place } => {
            tracing::info!("Starting one-shot question");
            commands::ask::run_ask(config, prompt, place).await?;
            Ok(())
        }
        Commands::Places { json } => {
            commands::places::list_places(json)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with a streamed answer.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "guidechat=debug"
    } else {
        "guidechat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
