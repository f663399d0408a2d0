//! CLI argument definitions using clap derive

use crate::resources::ResourceType;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// kfzf - local cluster resource cache for fuzzy completion
///
/// Keeps an on-disk snapshot of cluster resources so completion never waits
/// on the API server.
#[derive(Parser, Debug)]
#[command(name = "kfzf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "KFZF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cluster name (overrides config)
    #[arg(long, global = true, env = "KFZF_CLUSTER")]
    pub cluster: Option<String>,

    /// Root directory of the dump files (overrides config)
    #[arg(long, global = true, env = "KFZF_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Maintain dump files from a watch event stream
    Ingest(IngestArgs),

    /// Print the cached resources of one type
    Show(ShowArgs),

    /// Show freshness of every dump file
    Status,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the ingest command
#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Resource types to maintain (comma-separated, defaults to config)
    #[arg(short, long, value_delimiter = ',')]
    pub resources: Vec<ResourceType>,

    /// Milliseconds between dump-eligibility checks (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Read watch events from a file instead of stdin
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Resource type (plural, singular or short name)
    pub resource: ResourceType,

    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// One key per line
    #[default]
    Plain,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
