//! Markdown report generation
//!
//! This module generates the human-readable report of the current cycle:
//! lifecycle status, error statistics and one table row per stored result.

use crate::output::traits::{OutputResult, ReportSummary};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report
///
/// # Arguments
///
/// * `summary` - The report data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn write_markdown_report(summary: &ReportSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a report summary as markdown
pub fn format_markdown_report(summary: &ReportSummary) -> String {
    let mut md = String::new();

    md.push_str("# URL Audit Report\n\n");

    // Cycle metadata
    md.push_str("## Cycle\n\n");
    md.push_str(&format!(
        "- **Generated**: {}\n",
        summary.generated_at.to_rfc3339()
    ));
    if let Some(started) = summary.status.date_started {
        md.push_str(&format!("- **Started**: {}\n", started.to_rfc3339()));
    }
    if let Some(completed) = summary.status.date_completed {
        md.push_str(&format!("- **Completed**: {}\n", completed.to_rfc3339()));
    }
    let state = if summary.did_complete {
        "complete".to_string()
    } else {
        format!("in progress ({} accounts remaining)", summary.accounts_remaining)
    };
    md.push_str(&format!("- **Status**: {}\n\n", state));

    // Overall statistics
    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Reported URLs**: {}\n", summary.results.len()));
    md.push_str(&format!("- **Errors**: {}\n", summary.num_errors));
    md.push_str(&format!(
        "- **Error Rate**: {:.2}%\n\n",
        summary.error_rate()
    ));

    let by_outcome = summary.errors_by_outcome();
    if !by_outcome.is_empty() {
        md.push_str("## Errors by Outcome\n\n");
        md.push_str("| Outcome | Count |\n");
        md.push_str("|---------|-------|\n");
        for (outcome, count) in by_outcome {
            md.push_str(&format!("| {} | {} |\n", escape_cell(&outcome), count));
        }
        md.push('\n');
    }

    md.push_str("## Results\n\n");
    if summary.results.is_empty() {
        md.push_str("No URLs to report.\n");
        return md;
    }

    md.push_str("| Account | Type | Campaign | Ad Group | Text | URL | Outcome | Checked |\n");
    md.push_str("|---------|------|----------|----------|------|-----|---------|---------|\n");

    for result in &summary.results {
        let text = result
            .ad_text
            .as_deref()
            .or(result.keyword_text.as_deref())
            .or(result.sitelink_text.as_deref())
            .unwrap_or("");

        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&result.account_id),
            result.entity_type,
            escape_cell(&result.campaign_name),
            escape_cell(result.ad_group_name.as_deref().unwrap_or("")),
            escape_cell(text),
            escape_cell(&result.url),
            escape_cell(&result.outcome.to_string()),
            result.timestamp.format("%Y-%m-%d %H:%M"),
        ));
    }

    md
}

/// Keeps cell content from breaking the table layout
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
