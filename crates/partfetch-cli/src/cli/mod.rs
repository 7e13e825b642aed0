//! CLI for the partfetch segmented downloader.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use partfetch_core::config;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use commands::{run_get, run_plan, run_probe};

/// Top-level CLI for partfetch.
#[derive(Debug, Parser)]
#[command(name = "partfetch")]
#[command(about = "partfetch: fetch one HTTP resource as N concurrent byte ranges", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL in concurrent byte ranges and save it.
    Get(GetArgs),

    /// Show the size and range support a server reports for a URL.
    Probe {
        /// Direct HTTP/HTTPS URL.
        url: String,
    },

    /// Print the byte ranges a download of SIZE bytes would use (no network).
    Plan {
        /// Resource size in bytes.
        size: u64,
        /// Number of segments.
        segments: NonZeroUsize,
    },
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Direct HTTP/HTTPS URL to download.
    pub url: String,

    /// Number of byte ranges to fetch concurrently (default from config).
    pub segments: Option<NonZeroUsize>,

    /// Output file (default: last path segment of the URL).
    pub output: Option<PathBuf>,

    /// At most N segment downloads in flight at once.
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<NonZeroUsize>,

    /// Give up if all segments have not arrived after SECS seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retry a failing segment up to N more times.
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Get(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_get(&cfg, args).await?
            }
            CliCommand::Probe { url } => {
                let cfg = config::load_or_init()?;
                run_probe(&cfg, &url).await?
            }
            CliCommand::Plan { size, segments } => run_plan(size, segments.get())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
