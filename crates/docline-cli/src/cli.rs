use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docline",
    about = "docline: identity-aware structural diff and patch for JSON documents",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the changes that turn OLD into NEW
    Diff(DiffArgs),
    /// Apply a change sequence to a document
    Apply(ApplyArgs),
    /// Show the normalized, order-independent view of a document
    Normalize(NormalizeArgs),
    /// Rebuild a document by replaying diffs onto a base
    Replay(ReplayArgs),
    /// Show the net changes between two replayed versions
    Compare(CompareArgs),
}

/// Options that shape how documents are compared.
#[derive(Args, Clone, Debug, Default)]
pub struct DiffSettings {
    /// Field path to ignore, e.g. `toys/updatedAt` (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub exclude: Vec<String>,
    /// TOML config with per-type settings
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Document type whose config settings apply
    #[arg(long = "type", requires = "config")]
    pub type_name: Option<String>,
}

#[derive(Args)]
pub struct DiffArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    #[command(flatten)]
    pub settings: DiffSettings,
}

#[derive(Args)]
pub struct ApplyArgs {
    pub target: PathBuf,
    /// JSON array of changes
    pub changes: PathBuf,
}

#[derive(Args)]
pub struct NormalizeArgs {
    pub document: PathBuf,
    #[command(flatten)]
    pub settings: DiffSettings,
}

#[derive(Args)]
pub struct ReplayArgs {
    pub base: PathBuf,
    /// Diff files in version order; the first is version 1
    #[arg(required = true)]
    pub diffs: Vec<PathBuf>,
    /// Stop at this version instead of the last
    #[arg(long)]
    pub at: Option<u64>,
}

#[derive(Args)]
pub struct CompareArgs {
    pub base: PathBuf,
    /// Diff files in version order; the first is version 1
    #[arg(required = true)]
    pub diffs: Vec<PathBuf>,
    #[arg(long)]
    pub from: u64,
    #[arg(long)]
    pub to: u64,
    #[command(flatten)]
    pub settings: DiffSettings,
}
