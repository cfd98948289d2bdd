//! Warden - offline caching engine
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use warden::cli::args::{ConfigAction, ConfigArgs};
use warden::cli::{Cli, Commands};
use warden::config::{Config, ConfigManager};
use warden::error::WardenResult;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> WardenResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = match config_manager.load().await {
        Ok(config) => config,
        // a broken file must not block rewriting it
        Err(_)
            if matches!(
                cli.command,
                Commands::Config(ConfigArgs {
                    action: Some(ConfigAction::Init { .. } | ConfigAction::Path)
                })
            ) =>
        {
            Config::default()
        }
        Err(e) => return Err(e),
    };

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Fetch(args) => warden::cli::commands::fetch(args, &config).await,
        Commands::Install => warden::cli::commands::install(&config).await,
        Commands::Activate => warden::cli::commands::activate(&config).await,
        Commands::Stats(args) => warden::cli::commands::stats(args, &config).await,
        Commands::Clear(args) => warden::cli::commands::clear(args, &config).await,
        Commands::Message(args) => warden::cli::commands::message(args, &config).await,
        Commands::Revalidate(args) => warden::cli::commands::revalidate(args, &config).await,
        Commands::Push(args) => warden::cli::commands::push(args, &config).await,
        Commands::Config(args) => {
            warden::cli::commands::config(args, &config_manager, &config).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug; `general.verbose` counts as one `-v`
fn init_logging(verbose: u8, config: &Config) {
    let level = verbose.max(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("warden=warn"),
        1 => EnvFilter::new("warden=info"),
        _ => EnvFilter::new("warden=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
