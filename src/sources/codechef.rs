//! CodeChef profile page extractor
//!
//! # Page heuristics
//!
//! A page counts as "not found" when any of these hold:
//! - it contains the explicit "does not exist" message or a 404 marker
//! - it contains "not found" in any letter case
//! - it is shorter than [`MIN_PROFILE_LENGTH`] characters once trimmed
//!
//! The length rule exists because bot-block and interstitial pages are short. It can
//! also misclassify a genuinely tiny page, so absence reported through this
//! rule is a best guess rather than a certainty.

use super::{
    check_page_status, endpoint, finish, first_number, page_request, require_username,
    response_at, Extractor, InputError, Miss, Platform, ProfileStats, SourceQuery,
    SourceSettings,
};
use crate::fetch::{AttemptOutcome, Document, HttpResponse};
use serde::Serialize;

/// Bodies shorter than this are treated as "user not found"
pub const MIN_PROFILE_LENGTH: usize = 1000;

const NOT_FOUND_PHRASE: &str = "The username specified does not exist in our database.";
const NOT_FOUND_MARKER: &str = "404 Page Not Found";
const SOLVED_HEADING: &str = "Total Problems Solved";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChefStats {
    pub username: String,
    pub rating: Option<String>,
    pub fully_solved: u64,
}

pub struct CodeChefExtractor {
    username: String,
    settings: SourceSettings,
}

impl CodeChefExtractor {
    pub fn new(username: impl Into<String>, settings: SourceSettings) -> Self {
        Self {
            username: username.into(),
            settings,
        }
    }

    fn extract(&self, responses: &[HttpResponse]) -> Result<CodeChefStats, Miss> {
        let response = response_at(responses, 0)?;
        check_page_status(response)?;

        let body = response.body.as_str();
        if looks_missing(body) {
            tracing::info!("[CodeChef] User '{}' not found", self.username);
            return Err(Miss::NotFound);
        }

        let doc = Document::parse(body);

        let rating = doc
            .select_first("div.rating-number")
            .map(|node| node.own_text().replace('?', "").trim().to_string())
            .filter(|r| !r.is_empty());

        let solved_heading = doc
            .select("h3")
            .into_iter()
            .map(|h| h.text())
            .find(|text| text.contains(SOLVED_HEADING));

        match (rating, solved_heading) {
            (rating, Some(heading)) => Ok(CodeChefStats {
                username: self.username.trim().to_string(),
                rating,
                fully_solved: first_number(&heading).unwrap_or(0),
            }),
            (Some(rating), None) => Ok(CodeChefStats {
                username: self.username.trim().to_string(),
                rating: Some(rating),
                fully_solved: 0,
            }),
            (None, None) => Err(Miss::Invalid(
                "Invalid or empty CodeChef profile page".to_string(),
            )),
        }
    }
}

/// Applies the not-found heuristics to a raw page body
fn looks_missing(body: &str) -> bool {
    body.contains(NOT_FOUND_PHRASE)
        || body.contains(NOT_FOUND_MARKER)
        || body.to_lowercase().contains("not found")
        || body.trim().chars().count() < MIN_PROFILE_LENGTH
}

impl Extractor for CodeChefExtractor {
    fn platform(&self) -> Platform {
        Platform::CodeChef
    }

    fn identity(&self) -> &str {
        &self.username
    }

    fn build_query(&self) -> Result<SourceQuery, InputError> {
        let username = require_username(Platform::CodeChef, &self.username)?;
        let url = endpoint(&self.settings.base_url, &["users", username])?;

        Ok(SourceQuery {
            platform: Platform::CodeChef,
            requests: vec![page_request(url, self.settings.timeout)],
            retry: self.settings.retry,
        })
    }

    fn interpret(&self, responses: &[HttpResponse]) -> AttemptOutcome<ProfileStats> {
        finish(self.extract(responses).map(ProfileStats::CodeChef))
    }
}
