//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// Rewrite LaTeX markup in a Notion page into native equations
///
/// Every paragraph, heading, quote and list item under PAGE is scanned for
/// `$$...$$`, `\[...\]`, `\(...\)`, `\begin{equation}` and `\begin{align}`
/// markup; matching blocks are rewritten so the formulas render as inline
/// equations.
///
/// Examples:
///   eqfix https://www.notion.so/Lecture-Notes-0123abcd456789ef0123456789abcdef
///   eqfix 0123abcd456789ef0123456789abcdef --dry-run
///   eqfix <PAGE> --config eqfix.toml --concurrency 5 --json
#[derive(Parser, Debug)]
#[command(name = "eqfix")]
#[command(author, version, about, long_about)]
pub struct Cli {
    /// Page URL or id to process
    pub page: String,

    /// Notion integration token
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true)]
    pub token: Option<String>,

    /// TOML file with [notion] and [scheduler] tables
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum number of block updates in flight
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Attempts per block update, including the first
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay before the first retry, in milliseconds
    #[arg(long)]
    pub initial_backoff_ms: Option<u64>,

    /// Blocks requested per page when listing children (1-100)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Attempts per children listing, including the first
    #[arg(long)]
    pub fetch_attempts: Option<u32>,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
