//! Harvest coordinator - concurrent per-source orchestration
//!
//! This module fans the configured sources out onto tokio tasks and folds their
//! outcomes into a single report:
//! - Each source runs its own fetch, extract and retry cycle
//! - Sources never share mutable state and never cancel one another
//! - Results are collected in configuration order, whatever order tasks finish in

use crate::config::Config;
use crate::fetch::{AttemptOutcome, HttpResponse, ReqwestTransport, RetryOutcome, Transport};
use crate::output::{ExtractionResult, Report};
use crate::sources::{extractor_for, Extractor, Platform, ProfileStats};
use crate::HarvestError;
use futures::future::try_join_all;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Runs every configured source concurrently and assembles the report
pub struct Harvester {
    transport: Arc<dyn Transport>,
    extractors: Vec<Arc<dyn Extractor>>,
    config_hash: Option<String>,
}

impl Harvester {
    /// Creates a harvester over an explicit transport and extractor list
    pub fn new(transport: Arc<dyn Transport>, extractors: Vec<Arc<dyn Extractor>>) -> Self {
        Self {
            transport,
            extractors,
            config_hash: None,
        }
    }

    /// Creates a harvester for a loaded config, using a reqwest transport
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let transport = ReqwestTransport::with_user_agent(&config.client.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a harvester for a loaded config over the given transport
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Self {
        let extractors = config
            .profiles
            .iter()
            .map(|entry| extractor_for(entry, &config.client))
            .collect();
        Self::new(transport, extractors)
    }

    /// Attaches the config hash embedded in the report
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Configured sources as (platform, identity), in report order
    pub fn sources(&self) -> Vec<(Platform, String)> {
        self.extractors
            .iter()
            .map(|e| (e.platform(), e.identity().to_string()))
            .collect()
    }

    /// Runs all sources and returns one result per source, in configuration order
    ///
    /// A source whose task panics or is cancelled becomes a `Failed` record for that
    /// slot only.
    pub async fn run(&self) -> Report {
        tracing::info!("Starting harvest of {} sources", self.extractors.len());
        let start_time = std::time::Instant::now();

        let handles: Vec<_> = self
            .extractors
            .iter()
            .map(|extractor| {
                let extractor = Arc::clone(extractor);
                let transport = Arc::clone(&self.transport);
                let platform = extractor.platform();
                let handle = tokio::spawn(async move {
                    run_source(extractor.as_ref(), transport.as_ref()).await
                });
                (platform, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (platform, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("[{}] Source task did not complete: {}", platform, e);
                    ExtractionResult::Failed {
                        platform,
                        reason: format!("Source task did not complete: {}", e),
                    }
                }
            };
            results.push(result);
        }

        let report = Report::new(results, self.config_hash.clone());
        let tally = report.tally();
        tracing::info!(
            "Harvest completed in {:?}: {} found, {} not found, {} failed",
            start_time.elapsed(),
            tally.found,
            tally.not_found,
            tally.failed
        );

        report
    }
}

/// Runs one source's full pipeline: build the query, then fetch and interpret
/// under the source's retry policy
///
/// Identity problems short-circuit to `Failed` without touching the transport.
/// Transport errors and panics raised while interpreting a response count as
/// retryable attempts.
pub async fn run_source(extractor: &dyn Extractor, transport: &dyn Transport) -> ExtractionResult {
    let platform = extractor.platform();

    let query = match extractor.build_query() {
        Ok(query) => query,
        Err(e) => {
            tracing::warn!("[{}] {}", platform, e);
            return ExtractionResult::Failed {
                platform,
                reason: e.to_string(),
            };
        }
    };

    tracing::info!(
        "[{}] Fetching profile for '{}'",
        platform,
        extractor.identity()
    );

    let requests = &query.requests;
    let outcome = query
        .retry
        .run(platform.name(), move |attempt| async move {
            tracing::debug!(
                "[{}] Attempt {}: {} request(s)",
                platform,
                attempt,
                requests.len()
            );

            let responses = match try_join_all(requests.iter().map(|r| transport.fetch(r))).await
            {
                Ok(responses) => responses,
                Err(e) => return AttemptOutcome::Retryable(e.to_string()),
            };

            interpret_guarded(extractor, &responses)
        })
        .await;

    match outcome {
        RetryOutcome::Success(stats) => {
            tracing::info!("[{}] Profile found", platform);
            ExtractionResult::Found { platform, stats }
        }
        RetryOutcome::NotFound => {
            tracing::info!("[{}] Profile '{}' does not exist", platform, extractor.identity());
            ExtractionResult::NotFound {
                platform,
                username: extractor.identity().trim().to_string(),
            }
        }
        RetryOutcome::Failed(reason) => {
            tracing::warn!("[{}] {}", platform, reason);
            ExtractionResult::Failed { platform, reason }
        }
    }
}

/// Calls `interpret`, turning a panic into a retryable outcome
fn interpret_guarded(
    extractor: &dyn Extractor,
    responses: &[HttpResponse],
) -> AttemptOutcome<ProfileStats> {
    match std::panic::catch_unwind(AssertUnwindSafe(|| extractor.interpret(responses))) {
        Ok(outcome) => outcome,
        Err(payload) => AttemptOutcome::Retryable(format!(
            "extractor panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a complete harvest for an already-loaded config
///
/// This is the main library entry point. It will:
/// 1. Build the shared HTTP client
/// 2. Create one extractor per profile entry
/// 3. Run every source concurrently and collect the report
pub async fn run_harvest(
    config: &Config,
    config_hash: Option<String>,
) -> Result<Report, HarvestError> {
    let mut harvester = Harvester::from_config(config)?;
    if let Some(hash) = config_hash {
        harvester = harvester.with_config_hash(hash);
    }
    Ok(harvester.run().await)
}
