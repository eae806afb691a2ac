//! Echovox CLI
//!
//! Command-line interface for the Echovox echo and speech tools.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use echovox::cli::{commands, Cli, Commands};
use echovox::config::EchovoxConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "echovox=debug,info" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Echovox v{}", env!("CARGO_PKG_VERSION"));

    let config = EchovoxConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Some(cmd) => handle_command(cmd, &config),
        None => {
            println!("Echovox v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: &EchovoxConfig) -> anyhow::Result<()> {
    let result = match &cmd {
        Commands::Echo {
            input,
            output,
            echo,
        } => commands::echo_file(config, input, output, echo),
        Commands::Impulse {
            output,
            sample_rate,
            duration_secs,
            channels,
        } => commands::write_impulse(output, *sample_rate, *duration_secs, *channels),
        Commands::Preview { text, output, echo } => commands::preview(config, text, output, echo),
        Commands::ShowConfig => commands::show_config(config),
    };

    if let Err(err) = &result {
        for suggestion in err.recovery_suggestions() {
            eprintln!("  hint: {}", suggestion);
        }
    }

    result?;
    Ok(())
}
