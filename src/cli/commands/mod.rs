//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod download;
mod list;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{discover_config_file, load_config, ConfigLayer};
use crate::services::ApprovalPolicy;

#[derive(Parser)]
#[command(name = "geoa")]
#[command(about = "Download feature-server layers matching a keyword list as GeoJSON")]
#[command(version)]
pub struct Cli {
    /// Config file path (default: ./geoacquire.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// REST services root of the feature server
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Catalog folder to scan (empty string scans the root catalog)
    #[arg(long, global = true)]
    folder: Option<String>,

    /// Directory for downloaded GeoJSON files
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Output spatial reference code (outSR)
    #[arg(long, global = true)]
    spatial_reference: Option<u32>,

    /// Feature count above which a layer needs confirmation
    #[arg(long, global = true)]
    threshold: Option<usize>,

    /// Service name keyword; repeat to give several (replaces the defaults)
    #[arg(short, long = "keyword", global = true)]
    keywords: Vec<String>,

    /// Object IDs per download request
    #[arg(long, global = true)]
    chunk_size: Option<usize>,

    /// Pause between download requests in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the catalog and download matching layers (default)
    Download {
        /// Approve every large or unsized layer without asking
        #[arg(short, long, conflicts_with = "no")]
        yes: bool,
        /// Decline every large or unsized layer without asking
        #[arg(long)]
        no: bool,
    },

    /// Scan the catalog and show layer sizes without downloading
    List,

    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            base_url: self.base_url.clone(),
            folder: self.folder.clone(),
            output_dir: self.output_dir.clone(),
            spatial_reference: self.spatial_reference,
            large_layer_threshold: self.threshold,
            keywords: (!self.keywords.is_empty()).then(|| self.keywords.clone()),
            chunk_size: self.chunk_size,
            inter_chunk_delay_ms: self.delay_ms,
            user_agent: None,
            request_timeout_secs: None,
        }
    }
}

/// Parse arguments, load configuration and run the chosen command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let config_file = discover_config_file(cli.config.as_deref(), &cwd);
    let config = load_config(config_file.as_deref(), cli.overrides())?;

    match cli.command.unwrap_or(Commands::Download {
        yes: false,
        no: false,
    }) {
        Commands::Download { yes, no } => {
            let policy = match (yes, no) {
                (true, _) => Some(ApprovalPolicy::AutoApprove),
                (_, true) => Some(ApprovalPolicy::AutoDeny),
                _ => None,
            };
            download::cmd_download(&config, policy).await
        }
        Commands::List => list::cmd_list(&config).await,
        Commands::Config => config_cmd::cmd_config_show(&config, config_file.as_deref()),
    }
}
