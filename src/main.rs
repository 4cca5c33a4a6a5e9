//! Askdesk - chat client CLI
//!
#![doc = "Main entry point for the Askdesk application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use askdesk::cli::{Cli, Commands};
use askdesk::commands;
use askdesk::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { resume, ephemeral } => {
            if let Some(id) = resume {
                tracing::debug!("Resuming conversation: {}", id);
            }
            commands::chat::run_chat(config, resume, ephemeral).await?;
            Ok(())
        }
        Commands::Ask { query } => {
            tracing::info!("Sending one-shot query");
            commands::ask::run_ask(config, query.join(" ")).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "askdesk=debug"
    } else {
        "askdesk=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
