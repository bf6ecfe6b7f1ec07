//! LeetCode GraphQL extractor
//!
//! A single unauthenticated query returns accepted-submission counts per difficulty,
//! per-language and per-tag solved counts, profile badges, the current year's
//! activity calendar, the contest ranking summary and the raw contest history.
//! Users who never entered a contest have no ranking; their contest fields are
//! reported as null.

use super::{
    endpoint, finish, graphql_body, require_username, response_at, Extractor, GraphQlEnvelope,
    InputError, Miss, Platform, ProfileStats, SourceQuery, SourceSettings,
};
use crate::fetch::{decode_json, AttemptOutcome, HttpRequest, HttpResponse};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const QUERY: &str = r#"
query userProfileStats($username: String!, $year: Int) {
  matchedUser(username: $username) {
    submitStats {
      acSubmissionNum {
        difficulty
        count
      }
    }
    languageProblemCount {
      languageName
      problemsSolved
    }
    tagProblemCounts {
      fundamental {
        tagName
        tagSlug
        problemsSolved
      }
      intermediate {
        tagName
        tagSlug
        problemsSolved
      }
      advanced {
        tagName
        tagSlug
        problemsSolved
      }
    }
    badges {
      id
      name
      shortName
      displayName
      icon
      category
      creationDate
    }
    userCalendar(year: $year) {
      activeYears
      streak
      totalActiveDays
    }
  }
  userContestRanking(username: $username) {
    attendedContestsCount
    rating
    globalRanking
    totalParticipants
    topPercentage
    badge {
      name
    }
  }
  userContestRankingHistory(username: $username) {
    attended
    trendDirection
    problemsSolved
    totalProblems
    finishTimeInSeconds
    rating
    ranking
    contest {
      title
      startTime
    }
  }
}
"#;

/// Difficulty bucket that already holds the overall solved count
const ALL_BUCKET: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeBadge {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub creation_date: Option<String>,
}

/// Problems solved under one topic tag, summed across skill levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStat {
    pub tag_name: String,
    pub problems_solved: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeStats {
    pub username: String,
    pub total_solved: u64,
    pub solved_by_difficulty: BTreeMap<String, u64>,
    pub languages: BTreeMap<String, u64>,
    pub topic_stats: Vec<TopicStat>,
    pub rating: Option<f64>,
    pub global_rank: Option<u64>,
    pub contests: Option<u64>,
    pub top_percentage: Option<f64>,
    pub contest_badge: Option<String>,
    pub badges: Vec<LeetCodeBadge>,
    pub streak: u64,
    pub total_active_days: u64,
    pub active_years: Vec<i32>,
    pub contest_history: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankingData {
    matched_user: Option<MatchedUser>,
    user_contest_ranking: Option<ContestRanking>,
    #[serde(default)]
    user_contest_ranking_history: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchedUser {
    submit_stats: Option<SubmitStats>,
    #[serde(default)]
    language_problem_count: Option<Vec<LanguageCount>>,
    #[serde(default)]
    tag_problem_counts: Option<TagProblemCounts>,
    #[serde(default)]
    badges: Option<Vec<LeetCodeBadge>>,
    #[serde(default)]
    user_calendar: Option<UserCalendar>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitStats {
    #[serde(default)]
    ac_submission_num: Vec<SubmissionCount>,
}

#[derive(Debug, Deserialize)]
struct SubmissionCount {
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageCount {
    language_name: String,
    #[serde(default)]
    problems_solved: u64,
}

#[derive(Debug, Default, Deserialize)]
struct TagProblemCounts {
    #[serde(default)]
    fundamental: Option<Vec<TagCount>>,
    #[serde(default)]
    intermediate: Option<Vec<TagCount>>,
    #[serde(default)]
    advanced: Option<Vec<TagCount>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagCount {
    tag_name: String,
    #[serde(default)]
    problems_solved: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserCalendar {
    #[serde(default)]
    active_years: Option<Vec<i32>>,
    #[serde(default)]
    streak: Option<u64>,
    #[serde(default)]
    total_active_days: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContestRanking {
    attended_contests_count: Option<u64>,
    rating: Option<f64>,
    global_ranking: Option<u64>,
    top_percentage: Option<f64>,
    badge: Option<ContestBadge>,
}

#[derive(Debug, Deserialize)]
struct ContestBadge {
    #[serde(default)]
    name: String,
}

/// Folds the difficulty buckets into a breakdown and an overall count
///
/// The `All` bucket is the overall count when present. Otherwise the buckets are
/// summed, including any without a difficulty label.
fn tally_solved(buckets: &[SubmissionCount]) -> (u64, BTreeMap<String, u64>) {
    let mut by_difficulty = BTreeMap::new();
    for bucket in buckets {
        if let Some(difficulty) = &bucket.difficulty {
            *by_difficulty.entry(difficulty.clone()).or_insert(0) += bucket.count;
        }
    }

    let total = match by_difficulty.get(ALL_BUCKET) {
        Some(all) => *all,
        None => buckets.iter().map(|b| b.count).sum(),
    };
    (total, by_difficulty)
}

/// Merges fundamental, intermediate and advanced tag counts by tag name, keeping
/// first-seen order
fn merge_topics(counts: TagProblemCounts) -> Vec<TopicStat> {
    let mut topics: Vec<TopicStat> = Vec::new();
    let levels = [counts.fundamental, counts.intermediate, counts.advanced];
    for tag in levels.into_iter().flatten().flatten() {
        match topics.iter_mut().find(|t| t.tag_name == tag.tag_name) {
            Some(topic) => topic.problems_solved += tag.problems_solved,
            None => topics.push(TopicStat {
                tag_name: tag.tag_name,
                problems_solved: tag.problems_solved,
            }),
        }
    }
    topics
}

pub struct LeetCodeExtractor {
    username: String,
    settings: SourceSettings,
}

impl LeetCodeExtractor {
    pub fn new(username: impl Into<String>, settings: SourceSettings) -> Self {
        Self {
            username: username.into(),
            settings,
        }
    }

    fn extract(&self, responses: &[HttpResponse]) -> Result<LeetCodeStats, Miss> {
        let response = response_at(responses, 0)?;
        if response.status != 200 {
            return Err(Miss::Invalid(format!(
                "LeetCode API returned status {}",
                response.status
            )));
        }

        let envelope: GraphQlEnvelope<RankingData> = decode_json(&response.body)
            .map_err(|e| Miss::Invalid(format!("Malformed LeetCode response: {}", e)))?;
        let Some(data) = envelope.data else {
            return Err(Miss::Invalid("LeetCode response carried no data".to_string()));
        };
        let Some(user) = data.matched_user else {
            tracing::info!("[LeetCode] User '{}' not found", self.username);
            return Err(Miss::NotFound);
        };

        let buckets = user
            .submit_stats
            .map(|s| s.ac_submission_num)
            .unwrap_or_default();
        let (total_solved, solved_by_difficulty) = tally_solved(&buckets);

        let mut languages = BTreeMap::new();
        for language in user.language_problem_count.unwrap_or_default() {
            *languages.entry(language.language_name).or_insert(0) += language.problems_solved;
        }

        let topic_stats = merge_topics(user.tag_problem_counts.unwrap_or_default());
        let calendar = user.user_calendar;

        let ranking = data.user_contest_ranking;
        let contest_badge = ranking
            .as_ref()
            .and_then(|r| r.badge.as_ref())
            .map(|b| b.name.clone())
            .filter(|name| !name.is_empty());

        Ok(LeetCodeStats {
            username: self.username.trim().to_string(),
            total_solved,
            solved_by_difficulty,
            languages,
            topic_stats,
            rating: ranking.as_ref().and_then(|r| r.rating),
            global_rank: ranking.as_ref().and_then(|r| r.global_ranking),
            contests: ranking.as_ref().and_then(|r| r.attended_contests_count),
            top_percentage: ranking.as_ref().and_then(|r| r.top_percentage),
            contest_badge,
            badges: user.badges.unwrap_or_default(),
            streak: calendar.as_ref().and_then(|c| c.streak).unwrap_or(0),
            total_active_days: calendar
                .as_ref()
                .and_then(|c| c.total_active_days)
                .unwrap_or(0),
            active_years: calendar.and_then(|c| c.active_years).unwrap_or_default(),
            contest_history: data.user_contest_ranking_history.unwrap_or_default(),
        })
    }
}

impl Extractor for LeetCodeExtractor {
    fn platform(&self) -> Platform {
        Platform::LeetCode
    }

    fn identity(&self) -> &str {
        &self.username
    }

    fn build_query(&self) -> Result<SourceQuery, InputError> {
        let username = require_username(Platform::LeetCode, &self.username)?;
        let url = endpoint(&self.settings.base_url, &["graphql"])?;
        let year = chrono::Utc::now().year();
        let body = graphql_body(
            QUERY,
            serde_json::json!({ "username": username, "year": year }),
        );

        Ok(SourceQuery {
            platform: Platform::LeetCode,
            requests: vec![HttpRequest::post_json(url, body, self.settings.timeout)],
            retry: self.settings.retry,
        })
    }

    fn interpret(&self, responses: &[HttpResponse]) -> AttemptOutcome<ProfileStats> {
        finish(self.extract(responses).map(ProfileStats::LeetCode))
    }
}
