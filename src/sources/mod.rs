//! Source extractors, one per platform
//!
//! Each extractor knows how to:
//! - Build a [`SourceQuery`] for its identity (or reject the identity up front)
//! - Interpret raw responses as a record, a confirmed absence, or a retryable failure
//!
//! Extractors never touch the network themselves; the harvest pipeline feeds them
//! responses obtained through a [`crate::fetch::Transport`].

mod codechef;
mod codeforces;
mod github;
mod hackerrank;
mod leetcode;
mod platform;
mod skillrack;

pub use codechef::{CodeChefExtractor, CodeChefStats};
pub use codeforces::{CodeforcesExtractor, CodeforcesStats};
pub use github::{GitHubExtractor, GitHubStats};
pub use hackerrank::{HackerRankBadge, HackerRankExtractor, HackerRankStats};
pub use leetcode::{LeetCodeBadge, LeetCodeExtractor, LeetCodeStats, TopicStat};
pub use platform::Platform;
pub use skillrack::{SkillrackCertificate, SkillrackExtractor, SkillrackStats};

use crate::config::{ClientConfig, ProfileEntry};
use crate::fetch::{AttemptOutcome, HttpRequest, HttpResponse, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Identity problems detected before any request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Skipped: missing {0} username")]
    MissingIdentity(Platform),

    #[error("Skipped: Invalid or missing URL ({0})")]
    InvalidUrl(String),

    #[error("GitHub token not provided")]
    MissingToken,
}

/// Everything needed to perform one attempt against a source
#[derive(Debug, Clone)]
pub struct SourceQuery {
    pub platform: Platform,

    /// Requests issued per attempt; their responses reach `interpret` in this order
    pub requests: Vec<HttpRequest>,

    pub retry: RetryPolicy,
}

/// Endpoint, timeout and retry parameters for one configured source
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl SourceSettings {
    /// The platform's built-in defaults
    pub fn defaults(platform: Platform) -> Self {
        Self {
            base_url: platform.default_base_url().to_string(),
            timeout: platform.default_timeout(),
            retry: platform.default_retry(),
        }
    }

    /// Defaults with any per-profile overrides applied
    pub fn for_entry(entry: &ProfileEntry) -> Self {
        let defaults = Self::defaults(entry.platform);
        let retry = RetryPolicy::new(
            entry.max_attempts.unwrap_or(defaults.retry.max_attempts),
            entry
                .backoff_base_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.base_delay),
            entry.backoff.unwrap_or(defaults.retry.strategy),
        );

        Self {
            base_url: entry.base_url.clone().unwrap_or(defaults.base_url),
            timeout: entry
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            retry,
        }
    }
}

/// Normalized record for a found profile
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileStats {
    CodeChef(CodeChefStats),
    Codeforces(CodeforcesStats),
    HackerRank(HackerRankStats),
    Skillrack(SkillrackStats),
    GitHub(GitHubStats),
    LeetCode(LeetCodeStats),
}

/// Builds requests for one source and maps its responses to a record
pub trait Extractor: Send + Sync {
    fn platform(&self) -> Platform;

    /// Username, login, or resume URL this extractor queries
    fn identity(&self) -> &str;

    /// Builds the query, or rejects the identity without any network call
    fn build_query(&self) -> Result<SourceQuery, InputError>;

    /// Maps the responses of one attempt (in request order) to an outcome
    fn interpret(&self, responses: &[HttpResponse]) -> AttemptOutcome<ProfileStats>;
}

/// Builds the extractor for a configured profile entry
///
/// GitHub tokens come from the entry itself, falling back to the environment
/// variable named in the client config.
pub fn extractor_for(entry: &ProfileEntry, client: &ClientConfig) -> Arc<dyn Extractor> {
    let settings = SourceSettings::for_entry(entry);
    let identity = entry.identity.clone();

    match entry.platform {
        Platform::CodeChef => Arc::new(CodeChefExtractor::new(identity, settings)),
        Platform::Codeforces => Arc::new(CodeforcesExtractor::new(identity, settings)),
        Platform::HackerRank => Arc::new(HackerRankExtractor::new(identity, settings)),
        Platform::Skillrack => Arc::new(SkillrackExtractor::new(identity, settings)),
        Platform::GitHub => {
            let token = entry
                .token
                .clone()
                .or_else(|| std::env::var(&client.github_token_env).ok())
                .filter(|t| !t.trim().is_empty());
            Arc::new(GitHubExtractor::new(identity, token, settings))
        }
        Platform::LeetCode => Arc::new(LeetCodeExtractor::new(identity, settings)),
    }
}

/// Why an attempt did not yield a record
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Miss {
    NotFound,
    Invalid(String),
    Rejected(String),
}

/// Folds an extraction result into an attempt outcome
pub(crate) fn finish(result: Result<ProfileStats, Miss>) -> AttemptOutcome<ProfileStats> {
    match result {
        Ok(stats) => AttemptOutcome::Success(stats),
        Err(Miss::NotFound) => AttemptOutcome::NotFound,
        Err(Miss::Invalid(cause)) => AttemptOutcome::Retryable(cause),
        Err(Miss::Rejected(cause)) => AttemptOutcome::Terminal(cause),
    }
}

/// Returns the trimmed username, or rejects an empty one
pub(crate) fn require_username(platform: Platform, identity: &str) -> Result<&str, InputError> {
    let username = identity.trim();
    if username.is_empty() {
        return Err(InputError::MissingIdentity(platform));
    }
    Ok(username)
}

/// Appends path segments to a base URL, percent-encoding each one
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<String, InputError> {
    let mut url = Url::parse(base).map_err(|e| InputError::InvalidUrl(format!("{}: {}", base, e)))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| InputError::InvalidUrl(base.to_string()))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url.to_string())
}

/// GET request carrying the browser-style headers profile pages expect
pub(crate) fn page_request(url: String, timeout: Duration) -> HttpRequest {
    HttpRequest::get(url, timeout)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
}

/// Returns the response at `index`, or an invalid-attempt miss
pub(crate) fn response_at(responses: &[HttpResponse], index: usize) -> Result<&HttpResponse, Miss> {
    responses
        .get(index)
        .ok_or_else(|| Miss::Invalid(format!("missing response #{}", index + 1)))
}

/// Status policy for HTML profile pages: 404 is absence, other non-2xx is transient
pub(crate) fn check_page_status(response: &HttpResponse) -> Result<(), Miss> {
    match response.status {
        404 => Err(Miss::NotFound),
        _ if response.is_success() => Ok(()),
        status => Err(Miss::Invalid(format!("HTTP {}", status))),
    }
}

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Serializes a GraphQL request body
pub(crate) fn graphql_body(query: &str, variables: serde_json::Value) -> String {
    serde_json::json!({ "query": query, "variables": variables }).to_string()
}

/// Parses the first run of ASCII digits in `text`
pub(crate) fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
