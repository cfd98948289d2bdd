//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Warden - offline caching engine for installable web apps
///
/// Intercepts requests on behalf of an application, serves them from
/// versioned cache partitions or the network, and synthesizes fallbacks
/// when both are unavailable.
#[derive(Parser, Debug)]
#[command(name = "warden")]
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
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Intercept a request and print the response
    Fetch(FetchArgs),

    /// Install the configured version and pre-warm core assets
    Install,

    /// Activate the configured version, deleting stale partitions
    Activate,

    /// Show entry counts and sizes per partition
    Stats(StatsArgs),

    /// Delete every cache partition
    Clear(ClearArgs),

    /// Send a JSON control message
    Message(MessageArgs),

    /// Refresh important resources
    Revalidate(RevalidateArgs),

    /// Deliver a push message and optionally click the notification
    Push(PushArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Absolute URL, or a path resolved against engine.origin
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Declared rendering role: document, style, script, font, image, empty
    #[arg(short, long, default_value = "empty")]
    pub destination: String,

    /// Request header, "Name: value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request body sent with POST, PUT or PATCH
    #[arg(long, value_name = "BODY")]
    pub data: Option<String>,

    /// Print status and headers before the body
    #[arg(short = 'i', long)]
    pub include_headers: bool,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the message command
#[derive(Parser, Debug)]
pub struct MessageArgs {
    /// Message JSON, e.g. '{"type":"GET_VERSION"}'
    pub json: String,
}

/// Arguments for the revalidate command
#[derive(Parser, Debug)]
pub struct RevalidateArgs {
    /// What triggered the run
    #[arg(short, long, default_value = "connectivity-restored")]
    pub trigger: TriggerArg,

    /// Keep running, revalidating every N seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub every: Option<u64>,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
pub struct PushArgs {
    /// Push payload JSON; omit for a push without data
    pub json: Option<String>,

    /// Click the notification after showing it
    #[arg(long, value_name = "ACTION")]
    pub click: Option<ClickArg>,
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

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for stats
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON, as returned to the application
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TriggerArg {
    ConnectivityRestored,
    Periodic,
}

/// Notification click target
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ClickArg {
    /// The notification body
    Body,
    Open,
    Dismiss,
}

impl ClickArg {
    pub fn action(self) -> Option<&'static str> {
        match self {
            Self::Body => None,
            Self::Open => Some("open"),
            Self::Dismiss => Some("dismiss"),
        }
    }
}
