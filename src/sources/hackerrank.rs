//! HackerRank profile badge extractor

use super::{
    check_page_status, endpoint, finish, page_request, require_username, response_at, Extractor,
    InputError, Miss, Platform, ProfileStats, SourceQuery, SourceSettings,
};
use crate::fetch::{AttemptOutcome, Document, HttpResponse};
use serde::Serialize;

/// Only the first few badges are reported
pub const MAX_BADGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HackerRankBadge {
    pub name: String,
    pub stars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HackerRankStats {
    pub username: String,
    pub badges: Vec<HackerRankBadge>,
}

pub struct HackerRankExtractor {
    username: String,
    settings: SourceSettings,
}

impl HackerRankExtractor {
    pub fn new(username: impl Into<String>, settings: SourceSettings) -> Self {
        Self {
            username: username.into(),
            settings,
        }
    }

    fn extract(&self, responses: &[HttpResponse]) -> Result<HackerRankStats, Miss> {
        let response = response_at(responses, 0)?;
        check_page_status(response)?;

        let doc = Document::parse(&response.body);
        let badges = doc
            .select(".hacker-badge")
            .into_iter()
            .take(MAX_BADGES)
            .map(|badge| HackerRankBadge {
                name: badge
                    .select_first(".badge-title")
                    .map(|n| n.text())
                    .unwrap_or_default(),
                stars: badge.select(".badge-star").len(),
            })
            .collect();

        Ok(HackerRankStats {
            username: self.username.trim().to_string(),
            badges,
        })
    }
}

impl Extractor for HackerRankExtractor {
    fn platform(&self) -> Platform {
        Platform::HackerRank
    }

    fn identity(&self) -> &str {
        &self.username
    }

    fn build_query(&self) -> Result<SourceQuery, InputError> {
        let username = require_username(Platform::HackerRank, &self.username)?;
        let url = endpoint(&self.settings.base_url, &[username])?;

        Ok(SourceQuery {
            platform: Platform::HackerRank,
            requests: vec![page_request(url.clone(), self.settings.timeout).header("Referer", url)],
            retry: self.settings.retry,
        })
    }

    fn interpret(&self, responses: &[HttpResponse]) -> AttemptOutcome<ProfileStats> {
        finish(self.extract(responses).map(ProfileStats::HackerRank))
    }
}
