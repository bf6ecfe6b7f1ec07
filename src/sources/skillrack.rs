//! Skillrack resume page extractor
//!
//! Skillrack is addressed by a full resume URL rather than a username. Statistics are
//! scattered across generic `div.statistic` label/value blocks; certificates live in
//! `div.ui.brown.card` elements.
//!
//! A page that yields rank 0, no programs solved and no certificates is treated as
//! garbled and retried. A brand-new account looks the same, so that rule can
//! misclassify an empty profile as a failed fetch.

use super::{
    finish, page_request, response_at, Extractor, InputError, Miss, Platform, ProfileStats,
    SourceQuery, SourceSettings,
};
use crate::fetch::{AttemptOutcome, Document, HttpResponse};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Language labels reported per language
pub const LANGUAGES: [&str; 5] = ["JAVA", "C", "SQL", "PYTHON3", "CPP"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillrackCertificate {
    pub title: String,
    pub date: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillrackStats {
    pub rank: u64,
    pub programs_solved: u64,
    pub languages: BTreeMap<String, u64>,
    pub certificates: Vec<SkillrackCertificate>,
}

pub struct SkillrackExtractor {
    resume_url: String,
    settings: SourceSettings,
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}-\d{2}-\d{4}( \d{2}:\d{2})?").expect("valid date pattern"))
}

impl SkillrackExtractor {
    pub fn new(resume_url: impl Into<String>, settings: SourceSettings) -> Self {
        Self {
            resume_url: resume_url.into(),
            settings,
        }
    }

    fn extract(&self, responses: &[HttpResponse]) -> Result<SkillrackStats, Miss> {
        let response = response_at(responses, 0)?;
        if !response.is_success() {
            return Err(Miss::Invalid(format!("HTTP {}", response.status)));
        }

        let doc = Document::parse(&response.body);

        let mut stats = SkillrackStats {
            rank: 0,
            programs_solved: 0,
            languages: BTreeMap::new(),
            certificates: Vec::new(),
        };

        for block in doc.select("div.statistic") {
            let (Some(label), Some(value)) = (
                block.select_first("div.label"),
                block.select_first("div.value"),
            ) else {
                continue;
            };
            let label = label.text().to_uppercase();
            let Ok(value) = value.text().parse::<u64>() else {
                tracing::debug!("[Skillrack] Skipping unparseable value for '{}'", label);
                continue;
            };

            if label.contains("RANK") {
                stats.rank = value;
            } else if label.contains("PROGRAMS SOLVED") {
                stats.programs_solved = value;
            } else if LANGUAGES.contains(&label.as_str()) {
                stats.languages.insert(label, value);
            }
        }

        stats.certificates = doc
            .select("div.ui.brown.card")
            .into_iter()
            .filter_map(|card| card.select_first("div.content"))
            .filter_map(|content| {
                let title = content.select_first("b").map(|b| b.text())?;
                let link = content
                    .select_first("a")
                    .and_then(|a| a.attr("href"))
                    .map(str::to_string)?;
                if title.is_empty() || link.is_empty() {
                    return None;
                }
                let date = date_pattern()
                    .find(&content.raw_text())
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                Some(SkillrackCertificate { title, date, link })
            })
            .collect();

        if stats.rank == 0 && stats.programs_solved == 0 && stats.certificates.is_empty() {
            return Err(Miss::Invalid("Invalid Skillrack URL".to_string()));
        }

        Ok(stats)
    }
}

impl Extractor for SkillrackExtractor {
    fn platform(&self) -> Platform {
        Platform::Skillrack
    }

    fn identity(&self) -> &str {
        &self.resume_url
    }

    fn build_query(&self) -> Result<SourceQuery, InputError> {
        let url = self.resume_url.trim();
        if !url.starts_with("http") {
            return Err(InputError::InvalidUrl(url.to_string()));
        }

        Ok(SourceQuery {
            platform: Platform::Skillrack,
            requests: vec![page_request(url.to_string(), self.settings.timeout)],
            retry: self.settings.retry,
        })
    }

    fn interpret(&self, responses: &[HttpResponse]) -> AttemptOutcome<ProfileStats> {
        finish(self.extract(responses).map(ProfileStats::Skillrack))
    }
}
