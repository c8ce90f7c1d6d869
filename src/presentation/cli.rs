//! CLI Argument Parsing
//!
//! Global flags (`--json`, `--verbose`, `--config`) are inherited by all
//! subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::value_objects::{ComponentKind, ConflictStrategy, MergeStrategy, Platform};

/// Cairn - deploy configuration bundles onto AI coding assistant layouts
#[derive(Parser, Debug)]
#[command(name = "cairn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Engine config file (default: ~/.cairn/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a context onto a platform layout
    Deploy(DeployArgs),

    /// Remove a deployment lock left behind by another process
    Unlock {
        #[arg(short, long, value_enum)]
        platform: Platform,

        /// Project directory the lock was taken for
        #[arg(long, default_value = ".")]
        project: PathBuf,
    },

    /// Scan a context for secrets and dangerous commands
    Scan {
        /// Context JSON file
        #[arg(short, long, value_name = "FILE")]
        context: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Context JSON file
    #[arg(short, long, value_name = "FILE")]
    pub context: PathBuf,

    #[arg(short, long, value_enum)]
    pub platform: Platform,

    /// Project directory for project-scoped components
    #[arg(long, default_value = ".")]
    pub project: PathBuf,

    /// Dry run - report what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Validate and scan only
    #[arg(long)]
    pub validate_only: bool,

    /// Conflict strategy (overrides config)
    #[arg(long, value_enum)]
    pub strategy: Option<ConflictStrategy>,

    /// Merge sub-strategy for every component
    #[arg(long, value_enum)]
    pub merge: Option<MergeStrategy>,

    /// Deploy only these components
    #[arg(long, value_enum, value_delimiter = ',')]
    pub include: Vec<ComponentKind>,

    /// Never deploy these components
    #[arg(long, value_enum, value_delimiter = ',')]
    pub exclude: Vec<ComponentKind>,

    /// Overwrite without conflict detection
    #[arg(short, long)]
    pub force: bool,

    /// Snapshot overwritten files under this directory
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Snapshot overwritten files even without the backup strategy
    #[arg(long)]
    pub create_backup: bool,

    /// Keep the backup after a successful run
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub keep_backups: Option<bool>,

    /// Stop dispatching after the first failed component
    #[arg(long)]
    pub no_continue_on_error: bool,

    /// Worker thread limit (overrides config)
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Attach a performance report to the result
    #[arg(long)]
    pub metrics: bool,

    /// Stream deployment events as NDJSON on stdout
    #[arg(long)]
    pub events: bool,
}
