//! CLI presentation: text and JSON rendering of engine results.

use crate::error::EngineError;
use crate::gaps::CoverageReport;
use crate::scheduler::{RoundSummary, SchedulerStats};
use comfy_table::Table;
use serde_json::json;

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, EngineError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| EngineError::Config(format!("Failed to render JSON: {}", e)))
}

/// Coverage table, one row per category plus a total row.
pub fn format_coverage_text(report: &CoverageReport) -> String {
    if report.categories.is_empty() {
        return "Taxonomy is empty. Load categories with `gapfill import-taxonomy <file>`."
            .to_string();
    }

    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Category", "Path", "Required", "Satisfied", "Missing"]);
    for category in &report.categories {
        table.add_row(vec![
            category.category_id.to_string(),
            category.path.clone(),
            category.required.to_string(),
            category.satisfied.to_string(),
            category.missing().to_string(),
        ]);
    }
    table.add_row(vec![
        "Total".to_string(),
        String::new(),
        report.required().to_string(),
        report.satisfied().to_string(),
        report.missing().to_string(),
    ]);
    table.to_string()
}

pub fn format_coverage_json(report: &CoverageReport) -> Result<String, EngineError> {
    to_json(&json!({
        "required": report.required(),
        "satisfied": report.satisfied(),
        "missing": report.missing(),
        "categories": report.categories.iter().map(|c| json!({
            "category_id": c.category_id,
            "path": c.path,
            "required": c.required,
            "satisfied": c.satisfied,
            "missing": c.missing(),
        })).collect::<Vec<_>>(),
    }))
}

pub fn format_round_summary(summary: &RoundSummary, format: &str) -> Result<String, EngineError> {
    if format == "json" {
        return to_json(summary);
    }
    let total = summary
        .total_results
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    Ok(format!(
        "Missing: {}\nAttempted: {}\nGenerated: {}\nAlready satisfied: {}\nFailed: {}\nTotal results: {}",
        summary.missing,
        summary.attempted,
        summary.generated,
        summary.already_satisfied,
        summary.failed,
        total
    ))
}

pub fn format_run_stats(stats: &SchedulerStats) -> String {
    let mut classes: Vec<_> = stats.failures_by_class.iter().collect();
    classes.sort();
    let failures = if classes.is_empty() {
        "none".to_string()
    } else {
        classes
            .iter()
            .map(|(class, count)| format!("{}={}", class, count))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "Stopped after {} round(s): {} generated, {} already satisfied, {} failed ({})",
        stats.rounds_completed, stats.generated, stats.already_satisfied, stats.failed, failures
    )
}
