//! Reporting and export: plain text, Markdown, JSON, and CSV artifacts.
//!
//! - **Text**: one `Test Stat = ..., p-value = ...` line per check
//! - **Markdown**: tables for the descriptive section, checks, and post-hoc pairs
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: group summaries for external tools
//!
//! Persisted JSON carries a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use promolab_core::describe::GroupSummary;
use promolab_core::TestOutcome;

use crate::posthoc::PairwiseComparison;
use crate::procedure::{CheckStatus, NamedCheck};
use crate::report::{AnalysisReport, SCHEMA_VERSION};

/// Output format for a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn render(self, report: &AnalysisReport) -> Result<String> {
        match self {
            ReportFormat::Text => Ok(render_text(report)),
            ReportFormat::Markdown => Ok(render_markdown(report)),
            ReportFormat::Json => export_json(report),
        }
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a report to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize a report from JSON, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export group summaries as CSV.
///
/// Columns: promotion, market_size, count, mean, sum
pub fn export_group_summary_csv(groups: &[GroupSummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["promotion", "market_size", "count", "mean", "sum"])?;
    for g in groups {
        wtr.write_record([
            &g.promotion.to_string(),
            &g.market_size.map(|m| m.to_string()).unwrap_or_default(),
            &g.count.to_string(),
            &format!("{:.4}", g.mean),
            &format!("{:.2}", g.sum),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Text ───────────────────────────────────────────────────────────

fn status_line(status: &CheckStatus) -> String {
    match status {
        CheckStatus::Completed { outcome, decision } => match outcome {
            TestOutcome::Defined(r) => format!(
                "Test Stat = {:.4}, p-value = {:.4} ({})",
                r.statistic,
                r.p_value,
                decision.label()
            ),
            TestOutcome::Undefined { reason } => format!("undefined: {reason}"),
        },
        CheckStatus::Failed { error } => format!("failed: {error}"),
    }
}

fn p_cell(p: Option<f64>) -> String {
    p.map_or_else(|| "-".to_string(), |p| format!("{p:.4}"))
}

/// Human-readable report for the terminal.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = format!(
        "Promotion analysis\n  dataset {} ({} rows), alpha = {}, gating = {}\n\n",
        report.dataset_hash.short(),
        report.rows,
        report.alpha.value(),
        report.gating.as_str()
    );

    out.push_str("Sales by promotion\n");
    for g in &report.description.by_promotion {
        out.push_str(&format!(
            "  promotion {}: n = {}, mean = {:.2}, sum = {:.2}\n",
            g.promotion, g.count, g.mean, g.sum
        ));
    }
    out.push('\n');

    for check in report.checks() {
        out.push_str(&format!(
            "{}\n  H0: {}\n  {}\n",
            check.name,
            check.null_hypothesis,
            status_line(&check.status)
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "Recommended strategy: {}\n",
        report.strategy.as_str()
    ));
    out.push_str(&format!(
        "Verdict ({}{}): {}, p-value = {}\n",
        report.verdict.basis.label(),
        if report.verdict.advisory {
            ", strategy advisory"
        } else {
            ""
        },
        report.verdict.summary(),
        p_cell(report.verdict.p_value)
    ));

    if let Some(first) = report.posthoc.first() {
        out.push_str(&format!("\nPost-hoc ({})\n", first.test.name()));
        for row in &report.posthoc {
            out.push_str(&format!("  {}\n", pair_line(row)));
        }
    }
    out
}

fn pair_line(row: &PairwiseComparison) -> String {
    match (&row.note, row.raw_p) {
        (Some(note), _) => format!("{} vs {}: {note}", row.first, row.second),
        (None, raw) => format!(
            "{} vs {}: p-value = {}, adjusted = {}{}",
            row.first,
            row.second,
            p_cell(raw),
            p_cell(row.adjusted_p),
            if row.significant { " *" } else { "" }
        ),
    }
}

// ─── Markdown ───────────────────────────────────────────────────────

fn check_row(check: &NamedCheck) -> String {
    let (stat, p, decision) = match &check.status {
        CheckStatus::Completed { outcome, decision } => match outcome.result() {
            Some(r) => (
                format!("{:.4}", r.statistic),
                format!("{:.4}", r.p_value),
                decision.label().to_string(),
            ),
            None => ("-".into(), "-".into(), decision.label().to_string()),
        },
        CheckStatus::Failed { error } => ("-".into(), "-".into(), format!("failed: {error}")),
    };
    format!(
        "| {} | {} | {} | {} | {} |",
        check.name,
        check.kind.label(),
        stat,
        p,
        decision
    )
}

/// Markdown report with tables for each section.
pub fn render_markdown(report: &AnalysisReport) -> String {
    let mut md = format!(
        "# Promotion Analysis\n\n\
| Field | Value |\n\
|-------|-------|\n\
| Dataset | `{}` |\n\
| Rows | {} |\n\
| Alpha | {} |\n\
| Gating | {} |\n\
| Generated | {} |\n",
        report.dataset_hash.short(),
        report.rows,
        report.alpha.value(),
        report.gating.as_str(),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    md.push_str("\n## Sales by Promotion\n\n");
    md.push_str("| Promotion | Count | Mean | Sum |\n");
    md.push_str("|-----------|-------|------|-----|\n");
    for g in &report.description.by_promotion {
        md.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} |\n",
            g.promotion, g.count, g.mean, g.sum
        ));
    }

    md.push_str("\n## Checks\n\n");
    md.push_str("| Check | Test | Statistic | p-value | Decision |\n");
    md.push_str("|-------|------|-----------|---------|----------|\n");
    for check in report.checks() {
        md.push_str(&check_row(check));
        md.push('\n');
    }

    md.push_str("\n## Verdict\n\n");
    md.push_str(&format!(
        "- **Recommended strategy:** {}\n\
- **Decided by:** {}{}\n\
- **Result:** {} (p-value = {})\n",
        report.strategy.as_str(),
        report.verdict.basis.label(),
        if report.verdict.advisory {
            " (strategy advisory)"
        } else {
            ""
        },
        report.verdict.summary(),
        p_cell(report.verdict.p_value)
    ));

    if !report.posthoc.is_empty() {
        md.push_str("\n## Post-hoc Comparisons\n\n");
        md.push_str("| Pair | Test | Statistic | p-value | Adjusted | Significant |\n");
        md.push_str("|------|------|-----------|---------|----------|-------------|\n");
        for row in &report.posthoc {
            md.push_str(&format!(
                "| {} vs {} | {} | {} | {} | {} | {} |\n",
                row.first,
                row.second,
                row.test.name(),
                row.statistic
                    .map_or_else(|| "-".to_string(), |s| format!("{s:.4}")),
                p_cell(row.raw_p),
                p_cell(row.adjusted_p),
                if row.significant { "yes" } else { "no" }
            ));
        }
    }
    md
}

// ─── Files ──────────────────────────────────────────────────────────

/// Render `report` and write it to `path`, creating parent directories.
pub fn save_report(report: &AnalysisReport, format: ReportFormat, path: &Path) -> Result<()> {
    let rendered = format.render(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, rendered)
        .with_context(|| format!("failed to write report: {}", path.display()))
}
