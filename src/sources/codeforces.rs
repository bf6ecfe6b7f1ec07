//! Codeforces profile extractor
//!
//! Each attempt fetches two pages concurrently: the profile page and the
//! "contests with user" page. Missing elements fall back to sentinels instead of
//! failing, since the profile layout differs between rated and unrated users.

use super::{
    endpoint, finish, first_number, page_request, require_username, response_at, Extractor,
    InputError, Miss, Platform, ProfileStats, SourceQuery, SourceSettings,
};
use crate::fetch::{AttemptOutcome, Document, HttpResponse};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const UNRATED: &str = "Unrated";
pub const UNRANKED: &str = "Unranked";
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesStats {
    pub username: String,
    pub rating: String,
    pub rank: String,
    pub max_rating: String,
    pub max_rank: String,
    pub contests: usize,
    pub problems_solved: u64,
}

pub struct CodeforcesExtractor {
    username: String,
    settings: SourceSettings,
}

/// "Can't find such user", in any case and with the apostrophe possibly escaped
fn missing_user_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)can(?:'|&#0*39;|&#x0*27;|&apos;|\\u0027|\x{2019})t find such user")
            .expect("valid missing user pattern")
    })
}

fn max_rank_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"max\.\s*(.*?),").expect("valid max rank pattern"))
}

fn max_rating_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*(\d+)").expect("valid max rating pattern"))
}

fn solved_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Problems solved:\s*(\d+)").expect("valid solved pattern"))
}

impl CodeforcesExtractor {
    pub fn new(username: impl Into<String>, settings: SourceSettings) -> Self {
        Self {
            username: username.into(),
            settings,
        }
    }

    fn extract(&self, responses: &[HttpResponse]) -> Result<CodeforcesStats, Miss> {
        let profile = response_at(responses, 0)?;
        let contests = response_at(responses, 1)?;

        if missing_user_pattern().is_match(&profile.body) {
            tracing::info!("[Codeforces] User '{}' not found", self.username);
            return Err(Miss::NotFound);
        }
        for response in [profile, contests] {
            if !response.is_success() {
                return Err(Miss::Invalid(format!("HTTP {}", response.status)));
            }
        }

        let doc = Document::parse(&profile.body);

        let rating = doc
            .select_first(r#"span[style="font-weight:bold;"][class^="user-"]"#)
            .map(|n| n.text())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNRATED.to_string());

        let rank = doc
            .select_first("div.user-rank > span")
            .map(|n| n.text())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNRANKED.to_string());

        let (max_rank, max_rating) = match doc.select_first("span.smaller") {
            Some(node) => parse_max_line(&node.raw_text()),
            None => (NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string()),
        };

        let problems_solved = problems_solved(&doc);

        let contest_doc = Document::parse(&contests.body);
        let contests = contest_doc.select(".user-contests-table tbody tr").len();

        Ok(CodeforcesStats {
            username: self.username.trim().to_string(),
            rating,
            rank,
            max_rating,
            max_rank,
            contests,
            problems_solved,
        })
    }
}

/// Splits "(max. <rank>, <rating>)" into its parts, with "N/A" for whatever is missing
fn parse_max_line(text: &str) -> (String, String) {
    let max_rank = max_rank_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let max_rating = max_rating_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    (max_rank, max_rating)
}

/// Page text pattern first, then the activity counter element, then zero
fn problems_solved(doc: &Document) -> u64 {
    if let Some(count) = solved_pattern()
        .captures(&doc.text())
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
    {
        return count;
    }

    doc.select_first("._UserActivityFrame_counterValue")
        .and_then(|n| first_number(&n.text()))
        .unwrap_or(0)
}

impl Extractor for CodeforcesExtractor {
    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    fn identity(&self) -> &str {
        &self.username
    }

    fn build_query(&self) -> Result<SourceQuery, InputError> {
        let username = require_username(Platform::Codeforces, &self.username)?;
        let base = &self.settings.base_url;
        let timeout = self.settings.timeout;

        Ok(SourceQuery {
            platform: Platform::Codeforces,
            requests: vec![
                page_request(endpoint(base, &["profile", username])?, timeout),
                page_request(endpoint(base, &["contests", "with", username])?, timeout),
            ],
            retry: self.settings.retry,
        })
    }

    fn interpret(&self, responses: &[HttpResponse]) -> AttemptOutcome<ProfileStats> {
        finish(self.extract(responses).map(ProfileStats::Codeforces))
    }
}
