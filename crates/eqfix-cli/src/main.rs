//! equation-fixer CLI
//!
//! Resolves a page reference, loads settings and runs one fix pass against
//! the Notion API.
//!
//! # Environment Variables
//!
//! - `NOTION_API_KEY`: integration token (same as `--token`)
//! - `RUST_LOG`: log filter (default: `eqfix=info`); logs go to stderr

mod cli;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eqfix_core::EquationFixer;
use eqfix_notion::{NotionClient, parse_page_reference};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Settings;
use error::{CliError, Result};

const LOG_TARGETS: [&str; 3] = ["eqfix", "eqfix_core", "eqfix_notion"];

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect();
        EnvFilter::new(directives.join(","))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root_id = parse_page_reference(&cli.page)?;
    let settings = Settings::load(cli.config.as_deref())?.apply_flags(&cli);

    let token = cli
        .token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| CliError::user("No Notion token given; pass --token or set NOTION_API_KEY"))?;

    let client = NotionClient::new(token, &settings.notion)?;
    let fixer = EquationFixer::new(Arc::new(client), settings.scheduler)?;

    tracing::debug!(root_id = %root_id, "Starting fix run");
    let report = fixer.run(&root_id).await?;

    if cli.json {
        println!("{}", output::render_json(&report)?);
    } else {
        print!("{}", output::render_text(&report));
    }

    Ok(())
}
