//! range-sync CLI
//!
//! # Usage
//!
//! ```bash
//! # Gather every configured source and publish into output_dir
//! range-sync run --config /etc/range-sync.yaml
//!
//! # Show what would be published without touching output_dir
//! range-sync run --config /etc/range-sync.yaml --dry-run
//!
//! # Query the range server directly
//! range-sync expand '%web-frontend' --host range.example.com:80
//! range-sync expand 'web1,web2,web3' --collapse
//! ```
//!
//! Log filtering follows `RANGE_SYNC_LOG` (e.g. `RANGE_SYNC_LOG=range_sync=debug`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use range_client::{ClientConfig, RangeClient};
use range_sync::{SyncConfig, SyncRunner};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "RANGE_SYNC_LOG";

#[derive(Parser)]
#[command(name = "range-sync")]
#[command(about = "Synchronize range cluster definitions", long_about = None)]
struct Cli {
    /// Debug-level logging when RANGE_SYNC_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read all sources, merge, and publish
    Run {
        /// Sync configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Collect and report, but do not write anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a configuration file
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Expand (or collapse) a range expression
    Expand {
        expression: String,

        /// Range server, host:port
        #[arg(long, default_value = range_client::config::DEFAULT_HOST)]
        host: String,

        /// Print the collapsed form instead of one member per line
        #[arg(long)]
        collapse: bool,

        /// Split expressions longer than this across requests
        #[arg(long, default_value_t = range_client::config::DEFAULT_MAX_CHARS)]
        max_chars: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run { config, dry_run } => run_sync(config, dry_run),
        Commands::Check { config } => {
            load_config(&config)?;
            println!("{}: ok", config.display());
            Ok(())
        }
        Commands::Expand {
            expression,
            host,
            collapse,
            max_chars,
        } => expand(expression, host, collapse, max_chars),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: &Path) -> Result<SyncConfig> {
    SyncConfig::from_yaml(path).with_context(|| format!("failed to load config from {}", path.display()))
}

fn run_sync(path: PathBuf, dry_run: bool) -> Result<()> {
    let config = load_config(&path)?;
    let runner = SyncRunner::from_config(&config)?;

    if dry_run {
        let clusters = runner.collect()?;
        for name in clusters.names() {
            println!("{}", name);
        }
        info!(clusters = clusters.len(), "dry run, nothing published");
        return Ok(());
    }

    let outcome = runner.run()?;
    println!(
        "published {} clusters to {} ({} written, {} deleted, {} protected) in {:.2?}",
        outcome.clusters,
        config.output_dir.display(),
        outcome.report.written.len(),
        outcome.report.deleted.len(),
        outcome.report.protected.len(),
        outcome.duration,
    );

    if !outcome.report.is_clean() {
        for (file, err) in &outcome.report.failed {
            warn!(file = %file, error = %err, "publish failed");
        }
        for (file, err) in &outcome.report.failed_deletes {
            warn!(file = %file, error = %err, "stale file not deleted");
        }
        bail!(
            "{} files failed to publish, {} stale files could not be deleted",
            outcome.report.failed.len(),
            outcome.report.failed_deletes.len()
        );
    }
    Ok(())
}

fn expand(expression: String, host: String, collapse: bool, max_chars: usize) -> Result<()> {
    let config = ClientConfig::new(host).with_max_chars(max_chars);
    let client = RangeClient::connect(&config)?;

    if collapse {
        println!("{}", client.collapse(expression)?);
    } else {
        for member in client.expand_members(expression)? {
            println!("{}", member);
        }
    }
    Ok(())
}
