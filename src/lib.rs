//! gapfill: Content Gap-Filling Engine
//!
//! Finds (category, dimension, price band) slots of a three-level product taxonomy that
//! have no stored recommendation, asks a generative text API for one, and persists the
//! answer exactly once per slot. Runs as a slow, rate-limited background loop.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gaps;
pub mod logging;
pub mod persist;
pub mod prompt;
pub mod provider;
pub mod scheduler;
pub mod slot;
pub mod store;
pub mod taxonomy;
pub mod types;
