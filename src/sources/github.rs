//! GitHub GraphQL extractor
//!
//! One query fetches up to 100 owned repositories with their default-branch commit
//! count and per-language byte sizes. Commits and language sizes are summed across
//! repositories. A bearer token is required; without one no request is made.

use super::{
    finish, graphql_body, response_at, Extractor, GraphQlEnvelope, InputError, Miss, Platform,
    ProfileStats, SourceQuery, SourceSettings,
};
use crate::fetch::{decode_json, AttemptOutcome, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of languages listed in `topLanguages`
pub const TOP_LANGUAGES: usize = 5;

const QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    repositories(first: 100, ownerAffiliations: OWNER) {
      totalCount
      nodes {
        name
        defaultBranchRef {
          target {
            ... on Commit {
              history {
                totalCount
              }
            }
          }
        }
        languages(first: 10) {
          edges {
            node {
              name
            }
            size
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubStats {
    pub username: String,
    pub total_repos: u64,
    pub total_commits: u64,
    pub languages: BTreeMap<String, u64>,
    pub top_languages: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UserData {
    user: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
struct User {
    #[serde(default)]
    repositories: Repositories,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repositories {
    #[serde(default)]
    total_count: u64,
    #[serde(default)]
    nodes: Vec<Option<Repository>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    default_branch_ref: Option<BranchRef>,
    languages: Option<LanguageConnection>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    target: Option<CommitTarget>,
}

#[derive(Debug, Deserialize)]
struct CommitTarget {
    history: Option<History>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct History {
    #[serde(default)]
    total_count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct LanguageConnection {
    #[serde(default)]
    edges: Vec<LanguageEdge>,
}

#[derive(Debug, Deserialize)]
struct LanguageEdge {
    #[serde(default)]
    size: u64,
    node: Option<LanguageNode>,
}

#[derive(Debug, Deserialize)]
struct LanguageNode {
    name: String,
}

impl Repository {
    /// Commit count on the default branch, 0 when unavailable
    fn commit_count(&self) -> u64 {
        self.default_branch_ref
            .as_ref()
            .and_then(|b| b.target.as_ref())
            .and_then(|t| t.history.as_ref())
            .map_or(0, |h| h.total_count)
    }
}

/// Sums language byte sizes per language name across repositories
fn sum_languages<'a>(repos: impl IntoIterator<Item = &'a Repository>) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for edge in repos
        .into_iter()
        .filter_map(|r| r.languages.as_ref())
        .flat_map(|l| l.edges.iter())
    {
        if let Some(node) = &edge.node {
            *totals.entry(node.name.clone()).or_insert(0) += edge.size;
        }
    }
    totals
}

/// Languages ordered by total bytes, largest first
fn top_languages(languages: &BTreeMap<String, u64>) -> Vec<String> {
    let mut ranked: Vec<(&String, &u64)> = languages.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_LANGUAGES)
        .map(|(name, _)| name.clone())
        .collect()
}

pub struct GitHubExtractor {
    login: String,
    token: Option<String>,
    settings: SourceSettings,
}

impl GitHubExtractor {
    pub fn new(login: impl Into<String>, token: Option<String>, settings: SourceSettings) -> Self {
        Self {
            login: login.into(),
            token,
            settings,
        }
    }

    fn extract(&self, responses: &[HttpResponse]) -> Result<GitHubStats, Miss> {
        let response = response_at(responses, 0)?;
        match response.status {
            200 => {}
            401 => {
                return Err(Miss::Rejected(
                    "GitHub rejected the token (HTTP 401)".to_string(),
                ))
            }
            status => {
                return Err(Miss::Invalid(format!(
                    "GitHub API returned status {}",
                    status
                )))
            }
        }

        let envelope: GraphQlEnvelope<UserData> = decode_json(&response.body)
            .map_err(|e| Miss::Invalid(format!("Malformed GitHub response: {}", e)))?;

        let user = match envelope.data.and_then(|d| d.user) {
            Some(user) => user,
            None if envelope
                .errors
                .iter()
                .any(|e| e.kind.as_deref() == Some("NOT_FOUND")) =>
            {
                tracing::info!("[GitHub] User '{}' not found", self.login);
                return Err(Miss::NotFound);
            }
            None => {
                let detail = envelope
                    .errors
                    .first()
                    .map(|e| format!(": {}", e.message))
                    .unwrap_or_default();
                return Err(Miss::Invalid(format!("User not found or no data{}", detail)));
            }
        };

        let repos: Vec<&Repository> = user.repositories.nodes.iter().flatten().collect();
        let total_commits = repos.iter().map(|r| r.commit_count()).sum();
        let languages = sum_languages(repos.iter().copied());
        let top_languages = top_languages(&languages);

        Ok(GitHubStats {
            username: self.login.trim().to_string(),
            total_repos: user.repositories.total_count,
            total_commits,
            languages,
            top_languages,
        })
    }
}

impl Extractor for GitHubExtractor {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    fn identity(&self) -> &str {
        &self.login
    }

    fn build_query(&self) -> Result<SourceQuery, InputError> {
        let token = self.token.as_deref().ok_or(InputError::MissingToken)?;
        let login = super::require_username(Platform::GitHub, &self.login)?;
        let url = super::endpoint(&self.settings.base_url, &["graphql"])?;
        let body = graphql_body(QUERY, serde_json::json!({ "login": login }));

        let request = HttpRequest::post_json(url, body, self.settings.timeout)
            .header("Authorization", format!("Bearer {}", token));

        Ok(SourceQuery {
            platform: Platform::GitHub,
            requests: vec![request],
            retry: self.settings.retry,
        })
    }

    fn interpret(&self, responses: &[HttpResponse]) -> AttemptOutcome<ProfileStats> {
        finish(self.extract(responses).map(ProfileStats::GitHub))
    }
}
