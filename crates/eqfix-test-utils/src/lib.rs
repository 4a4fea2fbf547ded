//! Shared test utilities for the equation-fixer workspace.
//!
//! This crate is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`blocks`]: terse constructors for blocks and runs
//! - [`store`]: [`MemoryNotion`], an in-memory block source and sink with
//!   scripted write failures

pub mod blocks;
pub mod store;

pub use store::{MemoryNotion, WriteCall};
