//! Scheduler configuration
//!
//! All knobs are passed explicitly into [`crate::EquationFixer::new`]; there is
//! no process-wide state. Both types deserialize from the `[scheduler]` and
//! `[scheduler.retry]` tables of the CLI config file.

use std::time::Duration;

use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest page size the block source accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Bounded exponential retry without jitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff_ms: u64,
    /// Factor applied to the delay after each retry.
    pub multiplier: f64,
    /// Upper bound on a single delay.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            multiplier: 2.0,
            max_backoff_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Same schedule, different attempt budget.
    pub fn with_max_attempts(&self, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..self.clone()
        }
    }

    /// The delay schedule. Randomization is off, so delays are exactly
    /// `initial * multiplier^n`, capped at `max_backoff_ms`.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_backoff(),
            initial_interval: self.initial_backoff(),
            randomization_factor: 0.0,
            multiplier: self.multiplier,
            max_interval: Duration::from_millis(self.max_backoff_ms),
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }

    fn validate(&self, field: &str) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_config(format!(
                "{field}.max_attempts must be at least 1"
            )));
        }
        if self.multiplier < 1.0 {
            return Err(Error::invalid_config(format!(
                "{field}.multiplier must be at least 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}

/// Options for a fix run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    /// Maximum number of block writes in flight at once.
    pub concurrency: usize,
    /// Page size for listing children.
    pub page_size: u32,
    /// Attempts per "list children" call. 1 means fetches are not retried.
    pub fetch_attempts: u32,
    /// Retry schedule for block writes. Fetch retries reuse its delays.
    pub retry: RetryPolicy,
    /// Rewrite and report without writing anything back.
    pub dry_run: bool,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            page_size: MAX_PAGE_SIZE,
            fetch_attempts: 1,
            retry: RetryPolicy::default(),
            dry_run: false,
        }
    }
}

impl FixerConfig {
    /// Check that all values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::invalid_config("concurrency must be at least 1"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        if self.fetch_attempts == 0 {
            return Err(Error::invalid_config("fetch_attempts must be at least 1"));
        }
        self.retry.validate("retry")
    }

    /// Policy used for "list children" calls.
    pub fn fetch_policy(&self) -> RetryPolicy {
        self.retry.with_max_attempts(self.fetch_attempts)
    }
}
