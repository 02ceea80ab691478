//! Plain-text rendering of a check report for the console

use crate::check::types::{CheckReport, UpdateVerdict};

/// Renders the summary printed after each run
pub fn render_report(report: &CheckReport) -> String {
    let mut lines = vec![
        "Summary:".to_string(),
        format!("  Host: {}", report.hostname().unwrap_or("unknown")),
    ];
    if let Some(metadata) = &report.metadata {
        lines.push(format!("  Checked at: {}", metadata.timestamp.to_rfc3339()));
    }
    lines.push(format!("  Containers checked: {}", report.total));
    lines.push(format!("  Updates available: {}", report.available.len()));
    lines.push(format!("  Failed: {}", report.failed.len()));

    if !report.available.is_empty() {
        lines.push("\nUpdates available:".to_string());
        for update in &report.available {
            lines.push(container_line(update));
            lines.push(format!("      current: {}", update.current_version));
            lines.push(format!("      latest:  {}", update.latest_version));
        }
    }

    if !report.failed.is_empty() {
        lines.push("\nFailed:".to_string());
        for failed in &report.failed {
            lines.push(container_line(failed));
            if let Some(error) = &failed.error {
                lines.push(format!("      error: {}", error));
            }
        }
    }

    if !report.up_to_date.is_empty() {
        lines.push(format!("\nUp to date ({}):", report.up_to_date.len()));
        lines.extend(report.up_to_date.iter().map(container_line));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn container_line(verdict: &UpdateVerdict) -> String {
    format!(
        "  - {} ({})",
        verdict.container.name, verdict.container.image
    )
}
