//! Harvest module for running sources concurrently
//!
//! This module contains the orchestration layer, including:
//! - One tokio task per configured source
//! - Per-source retry around fetch and interpretation
//! - Assembly of the ordered report

mod coordinator;

pub use coordinator::{run_harvest, run_source, Harvester};
