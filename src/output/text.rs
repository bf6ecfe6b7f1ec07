//! Plain-text report rendering
//!
//! One line per source, in report order, followed by a totals line.

use crate::output::report::{ExtractionResult, Report};
use crate::sources::ProfileStats;

/// Formats a report as human-readable text
///
/// # Arguments
///
/// * `report` - The harvest report
///
/// # Returns
///
/// The formatted report, newline-terminated
pub fn format_text_report(report: &Report) -> String {
    let mut out = String::new();

    for result in &report.results {
        out.push_str(&format_result_line(result));
        out.push('\n');
    }

    let tally = report.tally();
    out.push_str(&format!(
        "{} sources: {} found, {} not found, {} failed ({:.0}% success)\n",
        tally.total(),
        tally.found,
        tally.not_found,
        tally.failed,
        tally.success_rate()
    ));

    out
}

/// Formats one result as a single line
pub fn format_result_line(result: &ExtractionResult) -> String {
    let detail = match result {
        ExtractionResult::Found { stats, .. } => summarize(stats),
        ExtractionResult::NotFound { username, .. } => format!("'{}' does not exist", username),
        ExtractionResult::Failed { reason, .. } => reason.clone(),
    };

    format!(
        "{:<11} {:<10} {}",
        result.platform().name(),
        result.status_label(),
        detail
    )
}

/// Headline numbers for a found profile
fn summarize(stats: &ProfileStats) -> String {
    match stats {
        ProfileStats::CodeChef(s) => format!(
            "{} rating={} solved={}",
            s.username,
            s.rating.as_deref().unwrap_or("-"),
            s.fully_solved
        ),
        ProfileStats::Codeforces(s) => format!(
            "{} rating={} rank={} max={} ({}) contests={} solved={}",
            s.username, s.rating, s.rank, s.max_rating, s.max_rank, s.contests, s.problems_solved
        ),
        ProfileStats::HackerRank(s) => {
            let badges: Vec<String> = s
                .badges
                .iter()
                .map(|b| format!("{}({}*)", b.name, b.stars))
                .collect();
            format!("{} badges=[{}]", s.username, badges.join(", "))
        }
        ProfileStats::Skillrack(s) => format!(
            "rank={} solved={} certificates={}",
            s.rank,
            s.programs_solved,
            s.certificates.len()
        ),
        ProfileStats::GitHub(s) => format!(
            "{} repos={} commits={} top=[{}]",
            s.username,
            s.total_repos,
            s.total_commits,
            s.top_languages.join(", ")
        ),
        ProfileStats::LeetCode(s) => format!(
            "{} solved={} rating={} contests={}",
            s.username,
            s.total_solved,
            s.rating
                .map(|r| format!("{:.0}", r))
                .unwrap_or_else(|| "-".to_string()),
            s.contests
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
    }
}
