//! PromoLab Runner: analysis procedure, post-hoc comparisons, reports.
//!
//! This crate builds on `promolab-core` to provide:
//! - TOML analysis configuration (alpha, gating mode, promotions)
//! - The check sequence: per-group normality, variance homogeneity,
//!   omnibus comparison, strategy selection, verdict
//! - Pairwise post-hoc comparisons with Benjamini-Hochberg adjustment
//! - Report export as text, Markdown, JSON, and CSV

pub mod config;
pub mod export;
pub mod fdr;
pub mod posthoc;
pub mod procedure;
pub mod report;

pub use config::{AnalysisConfig, ConfigError, GatingMode};
pub use export::{
    export_group_summary_csv, export_json, import_json, render_markdown, render_text,
    save_report, ReportFormat,
};
pub use fdr::benjamini_hochberg;
pub use posthoc::{pairwise_comparisons, PairwiseComparison, PairwiseTest};
pub use procedure::{
    evaluate, run_analysis, select_strategy, AnalysisError, CheckKind, CheckStatus,
    ComparisonStrategy, Evaluation, NamedCheck, Verdict,
};
pub use report::{AnalysisReport, SCHEMA_VERSION};
