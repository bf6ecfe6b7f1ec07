//! Output module for harvest reports
//!
//! This module handles:
//! - The report data model (one tagged result per configured source)
//! - Rendering reports as text lines
//! - Rendering reports as JSON lines or a single JSON document

mod json;
mod report;
mod text;

pub use json::{format_json_lines, format_json_report};
pub use report::{ExtractionResult, Report, Tally};
pub use text::{format_result_line, format_text_report};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    JsonLines,
    Json,
}

/// Renders a report in the requested format
pub fn render(report: &Report, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Text => Ok(format_text_report(report)),
        OutputFormat::JsonLines => format_json_lines(report),
        OutputFormat::Json => format_json_report(report),
    }
}
