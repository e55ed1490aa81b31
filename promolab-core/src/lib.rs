//! PromoLab Core: domain types, ingest, partitioning, descriptive statistics,
//! hypothesis tests.
//!
//! This crate contains everything the promotion analysis computes:
//! - Domain types (observations, promotions, market sizes)
//! - CSV ingest with row validation and a dataset fingerprint
//! - Group partitioner (sales by promotion)
//! - Descriptive tables (column summaries, group-bys, value counts, pivot)
//! - Hypothesis tests (Shapiro-Wilk, Levene, Kruskal-Wallis, ANOVA,
//!   Mann-Whitney U, two-sample t) built on first-principles special functions

pub mod data;
pub mod describe;
pub mod domain;
pub mod fingerprint;
pub mod partition;
pub mod stats;

pub use data::{load_csv, read_csv, save_csv, write_csv, DataError, Dataset};
pub use domain::{MarketSize, Observation, Promotion};
pub use partition::{partition, require_group, require_groups, sales_for_promotion, Group};
pub use stats::{
    Decision, SignificanceLevel, StatsError, TestOutcome, TestResult, DEFAULT_ALPHA,
};
