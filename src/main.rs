//! kfzf - local cluster resource cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use kfzf::cli::{Cli, Commands};
use kfzf::config::{Config, ConfigManager};
use kfzf::error::KfzfResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

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

async fn run() -> KfzfResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    // `config` subcommands must work on a broken file so it can be replaced
    let mut config = match config_manager.load().await {
        Ok(config) => config,
        Err(e) if matches!(cli.command, Commands::Config(_)) => {
            eprintln!("{} {}", style("Warning:").yellow(), e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    init_logging(cli.verbose, &config);
    debug!("Loaded configuration from {}", config_manager.path().display());

    // Command-line overrides win over the config file
    if let Some(cluster) = cli.cluster {
        config.cluster.name = cluster;
    }
    if let Some(cache_dir) = cli.cache_dir {
        config.store.cache_dir = Some(cache_dir);
    }

    match cli.command {
        Commands::Ingest(args) => kfzf::cli::commands::ingest(args, &config).await,
        Commands::Show(args) => kfzf::cli::commands::show(args, &config).await,
        Commands::Status => kfzf::cli::commands::status(&config).await,
        Commands::Config(args) => {
            kfzf::cli::commands::config(args, &config_manager, &config).await
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug; logs go to stderr so stdout stays
/// parseable by completion scripts
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("kfzf=warn"),
        1 => EnvFilter::new("kfzf=info"),
        _ => EnvFilter::new("kfzf=debug"),
    };

    if config.general.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}
