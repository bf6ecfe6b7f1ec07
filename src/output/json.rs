//! JSON report rendering

use crate::output::report::Report;
use serde_json::json;

/// Formats a report as JSON lines: one object per source, in report order
///
/// Each object is the serialized [`crate::ExtractionResult`] with the run timestamp
/// and config hash attached.
pub fn format_json_lines(report: &Report) -> Result<String, serde_json::Error> {
    let mut out = String::new();

    for result in &report.results {
        let mut value = serde_json::to_value(result)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("generatedAt".to_string(), json!(report.generated_at));
            if let Some(hash) = &report.config_hash {
                object.insert("configHash".to_string(), json!(hash));
            }
        }
        out.push_str(&serde_json::to_string(&value)?);
        out.push('\n');
    }

    Ok(out)
}

/// Formats the whole report as one pretty-printed JSON document
pub fn format_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
