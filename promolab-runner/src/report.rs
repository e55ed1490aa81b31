//! The persisted analysis report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promolab_core::describe::Description;
use promolab_core::domain::DatasetHash;
use promolab_core::SignificanceLevel;

use crate::config::GatingMode;
use crate::posthoc::PairwiseComparison;
use crate::procedure::{CheckKind, CheckStatus, ComparisonStrategy, NamedCheck, Verdict};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub dataset_hash: DatasetHash,
    pub rows: usize,
    pub alpha: SignificanceLevel,
    pub gating: GatingMode,
    pub description: Description,
    /// One Shapiro-Wilk check per promotion, in configured order.
    pub normality: Vec<NamedCheck>,
    pub variance: NamedCheck,
    /// Omnibus comparisons that ran (both under advisory gating).
    pub comparisons: Vec<NamedCheck>,
    pub strategy: ComparisonStrategy,
    pub verdict: Verdict,
    #[serde(default)]
    pub posthoc: Vec<PairwiseComparison>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl AnalysisReport {
    /// Every named check in report order.
    pub fn checks(&self) -> impl Iterator<Item = &NamedCheck> {
        self.normality
            .iter()
            .chain(std::iter::once(&self.variance))
            .chain(self.comparisons.iter())
    }

    pub fn comparison(&self, kind: CheckKind) -> Option<&NamedCheck> {
        self.comparisons.iter().find(|c| c.kind == kind)
    }

    /// Names of checks that errored.
    pub fn failed_checks(&self) -> Vec<&str> {
        self.checks()
            .filter(|c| matches!(c.status, CheckStatus::Failed { .. }))
            .map(|c| c.name.as_str())
            .collect()
    }
}
