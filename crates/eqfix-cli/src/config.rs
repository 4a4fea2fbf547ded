//! Layered run settings: built-in defaults, then the config file, then flags.
//!
//! ```toml
//! [notion]
//! timeout_secs = 20
//!
//! [scheduler]
//! concurrency = 5
//!
//! [scheduler.retry]
//! max_attempts = 4
//! initial_backoff_ms = 250
//! ```

use std::path::Path;

use eqfix_core::FixerConfig;
use eqfix_notion::NotionConfig;
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub notion: NotionConfig,
    pub scheduler: FixerConfig,
}

impl Settings {
    /// Read settings from `path`, or return the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::user(format!("Cannot read config file {}: {e}", path.display()))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Overlay the flags that were given on the command line.
    pub fn apply_flags(mut self, cli: &Cli) -> Self {
        let scheduler = &mut self.scheduler;
        if let Some(concurrency) = cli.concurrency {
            scheduler.concurrency = concurrency;
        }
        if let Some(page_size) = cli.page_size {
            scheduler.page_size = page_size;
        }
        if let Some(fetch_attempts) = cli.fetch_attempts {
            scheduler.fetch_attempts = fetch_attempts;
        }
        if let Some(max_attempts) = cli.max_attempts {
            scheduler.retry.max_attempts = max_attempts;
        }
        if let Some(initial_backoff_ms) = cli.initial_backoff_ms {
            scheduler.retry.initial_backoff_ms = initial_backoff_ms;
        }
        scheduler.dry_run |= cli.dry_run;
        self
    }
}
