//! End-to-end harvests against mocked profile sites

use crate::config_from;
use algo_harvest::fetch::EXHAUSTED_MESSAGE;
use algo_harvest::harvest::run_harvest;
use algo_harvest::output::format_json_lines;
use algo_harvest::{ExtractionResult, Harvester, Platform, ProfileStats};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// CodeChef profile page long enough to pass the length heuristic
fn codechef_page(rating: &str, solved: u64) -> String {
    format!(
        r#"<html><body>
        <div class="rating-number">{}<sup>?</sup></div>
        <section><h3>Total Problems Solved: {}</h3></section>
        <footer>{}</footer>
        </body></html>"#,
        rating,
        solved,
        "lorem ipsum ".repeat(100)
    )
}

#[tokio::test]
async fn test_full_harvest_in_config_order() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    // CodeChef answers last; the report must still list it first
    Mock::given(method("GET"))
        .and(path("/users/iam_elango"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(codechef_page("1864", 321))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/profile/tourist"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="user-rank"><span>Legendary Grandmaster</span></div>
               <span style="font-weight:bold;" class="user-legendary">3822</span>
               <span class="smaller">(max. legendary grandmaster, 4229)</span>
               <div>Problems solved: 2750</div>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/contests/with/tourist"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<table class="user-contests-table"><tbody><tr><td>1</td></tr><tr><td>2</td></tr></tbody></table>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/resume"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="statistic"><div class="value">77</div><div class="label">RANK</div></div>
               <div class="statistic"><div class="value">900</div><div class="label">PROGRAMS SOLVED</div></div>
               <div class="statistic"><div class="value">300</div><div class="label">JAVA</div></div>"#,
        ))
        .mount(&mock_server)
        .await;

    let config = config_from(&format!(
        r#"
[[profile]]
platform = "codechef"
identity = "iam_elango"
base-url = "{base}"

[[profile]]
platform = "codeforces"
identity = "tourist"
base-url = "{base}"

[[profile]]
platform = "skillrack"
identity = "{base}/resume?id=1"
"#
    ));

    let report = run_harvest(&config, Some("cafe".to_string())).await.unwrap();

    let platforms: Vec<Platform> = report.results.iter().map(|r| r.platform()).collect();
    assert_eq!(
        platforms,
        vec![Platform::CodeChef, Platform::Codeforces, Platform::Skillrack]
    );

    match &report.results[0] {
        ExtractionResult::Found {
            stats: ProfileStats::CodeChef(stats),
            ..
        } => {
            assert_eq!(stats.rating.as_deref(), Some("1864"));
            assert_eq!(stats.fully_solved, 321);
        }
        other => panic!("unexpected CodeChef result: {:?}", other),
    }

    match &report.results[1] {
        ExtractionResult::Found {
            stats: ProfileStats::Codeforces(stats),
            ..
        } => {
            assert_eq!(stats.rating, "3822");
            assert_eq!(stats.max_rating, "4229");
            assert_eq!(stats.contests, 2);
            assert_eq!(stats.problems_solved, 2750);
        }
        other => panic!("unexpected Codeforces result: {:?}", other),
    }

    match &report.results[2] {
        ExtractionResult::Found {
            stats: ProfileStats::Skillrack(stats),
            ..
        } => {
            assert_eq!(stats.rank, 77);
            assert_eq!(stats.programs_solved, 900);
            assert_eq!(stats.languages.get("JAVA"), Some(&300));
        }
        other => panic!("unexpected Skillrack result: {:?}", other),
    }

    assert_eq!(report.config_hash.as_deref(), Some("cafe"));
    let lines = format_json_lines(&report).unwrap();
    assert_eq!(lines.lines().count(), 3);
}

#[tokio::test]
async fn test_retries_exhaust_without_affecting_other_sources() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("matchedUser"))
        .and(body_string_contains("\"username\":\"alice\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "matchedUser": { "submitStats": { "acSubmissionNum": [
                    { "count": 3 },
                    { "count": 7 }
                ] } },
                "userContestRanking": null,
                "userContestRankingHistory": []
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_from(&format!(
        r#"
[[profile]]
platform = "hackerrank"
identity = "flaky"
base-url = "{base}"
max-attempts = 3
backoff-base-ms = 10

[[profile]]
platform = "leetcode"
identity = "alice"
base-url = "{base}"
"#
    ));

    let report = run_harvest(&config, None).await.unwrap();

    match &report.results[0] {
        ExtractionResult::Failed { platform, reason } => {
            assert_eq!(*platform, Platform::HackerRank);
            assert!(reason.starts_with(EXHAUSTED_MESSAGE));
        }
        other => panic!("expected HackerRank failure, got {:?}", other),
    }

    match &report.results[1] {
        ExtractionResult::Found {
            stats: ProfileStats::LeetCode(stats),
            ..
        } => {
            assert_eq!(stats.total_solved, 10);
            assert_eq!(stats.rating, None);
            assert_eq!(stats.contests, None);
        }
        other => panic!("unexpected LeetCode result: {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_stops_after_one_attempt() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/nobody"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_from(&format!(
        r#"
[[profile]]
platform = "hackerrank"
identity = "nobody"
base-url = "{base}"
"#
    ));

    let report = run_harvest(&config, None).await.unwrap();
    assert_eq!(
        report.results[0],
        ExtractionResult::NotFound {
            platform: Platform::HackerRank,
            username: "nobody".to_string()
        }
    );
}

#[tokio::test]
async fn test_github_aggregates_with_bearer_token() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer t0k3n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "user": { "repositories": {
                "totalCount": 2,
                "nodes": [
                    {
                        "name": "one",
                        "defaultBranchRef": { "target": { "history": { "totalCount": 5 } } },
                        "languages": { "edges": [ { "node": { "name": "Go" }, "size": 100 } ] }
                    },
                    {
                        "name": "two",
                        "defaultBranchRef": { "target": { "history": { "totalCount": 7 } } },
                        "languages": { "edges": [
                            { "node": { "name": "Go" }, "size": 50 },
                            { "node": { "name": "Rust" }, "size": 30 }
                        ] }
                    }
                ]
            } } }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config_from(&format!(
        r#"
[client]
github-token-env = "ALGO_HARVEST_IT_UNSET_TOKEN"

[[profile]]
platform = "github"
identity = "octocat"
token = "t0k3n"
base-url = "{base}"
"#
    ));

    let report = Harvester::from_config(&config).unwrap().run().await;

    match &report.results[0] {
        ExtractionResult::Found {
            stats: ProfileStats::GitHub(stats),
            ..
        } => {
            assert_eq!(stats.total_repos, 2);
            assert_eq!(stats.total_commits, 12);
            assert_eq!(stats.languages.get("Go"), Some(&150));
            assert_eq!(stats.languages.get("Rust"), Some(&30));
            assert_eq!(stats.top_languages, vec!["Go", "Rust"]);
        }
        other => panic!("unexpected GitHub result: {:?}", other),
    }
}

#[tokio::test]
async fn test_input_errors_never_reach_the_network() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = config_from(&format!(
        r#"
[client]
github-token-env = "ALGO_HARVEST_IT_UNSET_TOKEN"

[[profile]]
platform = "skillrack"
identity = "ftp://example.com/resume"

[[profile]]
platform = "github"
identity = "octocat"
base-url = "{base}"
"#
    ));

    let report = run_harvest(&config, None).await.unwrap();

    assert!(report
        .results
        .iter()
        .all(|r| matches!(r, ExtractionResult::Failed { .. })));
    assert_eq!(report.tally().failed, 2);
}

#[tokio::test]
async fn test_timeout_counts_as_failed_attempt() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = config_from(&format!(
        r#"
[[profile]]
platform = "hackerrank"
identity = "slowpoke"
base-url = "{base}"
timeout-secs = 1
max-attempts = 2
backoff-base-ms = 10
"#
    ));

    let report = run_harvest(&config, None).await.unwrap();

    match &report.results[0] {
        ExtractionResult::Failed { reason, .. } => {
            assert!(reason.starts_with(EXHAUSTED_MESSAGE));
            assert!(reason.contains("timeout"));
        }
        other => panic!("expected timeout failure, got {:?}", other),
    }
}
