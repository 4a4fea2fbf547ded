//! [`MemoryNotion`]: an in-memory block store for scheduler tests.
//!
//! Children are served in pages with numeric cursors. Writes can be scripted
//! to fail a number of times or forever, and every write attempt is recorded
//! with the (possibly paused) tokio clock so backoff delays can be measured.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use eqfix_blocks::{Block, BlockPage, BlockUpdate};
use eqfix_core::{BlockSink, BlockSource, SinkError, SourceError};
use serde::Deserialize;
use tokio::time::Instant;

/// One recorded call to [`BlockSink::update_block`].
#[derive(Debug, Clone)]
pub struct WriteCall {
    pub block_id: String,
    pub at: Instant,
    pub update: BlockUpdate,
}

#[derive(Debug)]
enum Script {
    FailFirst { remaining: u32, error: SinkError },
    AlwaysFail(SinkError),
}

/// Fixture file layout: a root id and the children of each parent.
#[derive(Debug, Deserialize)]
struct Fixture {
    root: String,
    children: HashMap<String, Vec<Block>>,
}

#[derive(Debug, Default)]
pub struct MemoryNotion {
    children: HashMap<String, Vec<Block>>,
    scripts: Mutex<HashMap<String, Script>>,
    writes: Mutex<Vec<WriteCall>>,
    applied: Mutex<HashMap<String, BlockUpdate>>,
    list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    write_latency: Duration,
}

impl MemoryNotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fixture of the form `{ "root": "...", "children": { "<parent>": [blocks] } }`.
    ///
    /// Returns the root id alongside the store.
    pub fn from_fixture(json: &str) -> serde_json::Result<(String, Self)> {
        let fixture: Fixture = serde_json::from_str(json)?;
        let store = Self {
            children: fixture.children,
            ..Self::default()
        };
        Ok((fixture.root, store))
    }

    /// Append children under `parent_id`.
    pub fn with_children(mut self, parent_id: &str, blocks: Vec<Block>) -> Self {
        self.children
            .entry(parent_id.to_string())
            .or_default()
            .extend(blocks);
        self
    }

    /// Fail the first `times` writes to `block_id` with `error`, then succeed.
    pub fn fail_first(self, block_id: &str, times: u32, error: SinkError) -> Self {
        self.script(block_id, Script::FailFirst {
            remaining: times,
            error,
        })
    }

    /// Fail every write to `block_id` with `error`.
    pub fn always_fail(self, block_id: &str, error: SinkError) -> Self {
        self.script(block_id, Script::AlwaysFail(error))
    }

    /// Hold every write open for `latency` so concurrent writes overlap.
    pub fn with_write_latency(mut self, latency: Duration) -> Self {
        self.write_latency = latency;
        self
    }

    fn script(self, block_id: &str, script: Script) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(block_id.to_string(), script);
        self
    }

    /// All write attempts, successful or not, in call order.
    pub fn writes(&self) -> Vec<WriteCall> {
        self.writes.lock().unwrap().clone()
    }

    /// Instants of the write attempts made for one block.
    pub fn attempts_for(&self, block_id: &str) -> Vec<Instant> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.block_id == block_id)
            .map(|call| call.at)
            .collect()
    }

    /// The last successfully written payload for a block.
    pub fn applied(&self, block_id: &str) -> Option<BlockUpdate> {
        self.applied.lock().unwrap().get(block_id).cloned()
    }

    pub fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Highest number of writes that were in progress at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn scripted_failure(&self, block_id: &str) -> Option<SinkError> {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(block_id)? {
            Script::AlwaysFail(error) => Some(error.clone()),
            Script::FailFirst { remaining, error } if *remaining > 0 => {
                *remaining -= 1;
                Some(error.clone())
            }
            Script::FailFirst { .. } => None,
        }
    }
}

#[async_trait]
impl BlockSource for MemoryNotion {
    async fn list_children(
        &self,
        parent_id: &str,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<BlockPage, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let Some(all) = self.children.get(parent_id) else {
            return Err(SourceError::Status {
                status: 404,
                message: format!("Could not find block with ID: {parent_id}"),
            });
        };

        let start = match cursor {
            Some(cursor) => cursor.parse::<usize>().map_err(|_| SourceError::Status {
                status: 400,
                message: format!("Invalid start_cursor: {cursor}"),
            })?,
            None => 0,
        };
        let end = (start + page_size as usize).min(all.len());
        let has_more = end < all.len();

        Ok(BlockPage {
            results: all.get(start..end).map(<[Block]>::to_vec).unwrap_or_default(),
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }
}

#[async_trait]
impl BlockSink for MemoryNotion {
    async fn update_block(&self, block_id: &str, update: &BlockUpdate) -> Result<(), SinkError> {
        self.writes.lock().unwrap().push(WriteCall {
            block_id: block_id.to_string(),
            at: Instant::now(),
            update: update.clone(),
        });

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        if !self.write_latency.is_zero() {
            tokio::time::sleep(self.write_latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.scripted_failure(block_id) {
            return Err(error);
        }

        self.applied
            .lock()
            .unwrap()
            .insert(block_id.to_string(), update.clone());
        Ok(())
    }
}
