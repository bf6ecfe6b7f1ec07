//! Report types
//!
//! A [`Report`] holds exactly one [`ExtractionResult`] per configured source, in
//! configuration order.

use crate::sources::{Platform, ProfileStats};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of harvesting one source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExtractionResult {
    /// The profile was read successfully
    Found {
        platform: Platform,
        stats: ProfileStats,
    },

    /// The source confirmed the profile does not exist
    NotFound { platform: Platform, username: String },

    /// Every attempt failed, or the identity was rejected up front
    Failed { platform: Platform, reason: String },
}

impl ExtractionResult {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Found { platform, .. }
            | Self::NotFound { platform, .. }
            | Self::Failed { platform, .. } => *platform,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Short status label used in text output
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Found { .. } => "found",
            Self::NotFound { .. } => "not found",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Per-status counts across a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.found + self.not_found + self.failed
    }

    /// Share of sources that produced a record, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            (self.found as f64 / self.total() as f64) * 100.0
        }
    }
}

/// The aggregated output of one harvest run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,

    /// SHA-256 of the config file, when the run was driven by one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    pub results: Vec<ExtractionResult>,
}

impl Report {
    pub fn new(results: Vec<ExtractionResult>, config_hash: Option<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            config_hash,
            results,
        }
    }

    pub fn tally(&self) -> Tally {
        self.results.iter().fold(Tally::default(), |mut tally, result| {
            match result {
                ExtractionResult::Found { .. } => tally.found += 1,
                ExtractionResult::NotFound { .. } => tally.not_found += 1,
                ExtractionResult::Failed { .. } => tally.failed += 1,
            }
            tally
        })
    }
}
