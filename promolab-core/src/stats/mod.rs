//! Hypothesis tests and their shared result types.
//!
//! Implements from first principles:
//! - Shapiro-Wilk normality test (Royston's approximation)
//! - Levene / Brown-Forsythe variance homogeneity test
//! - Kruskal-Wallis H test and one-way ANOVA for k-sample comparison
//! - Mann-Whitney U and two-sample t-tests for pairwise comparison
//!
//! Every test is a pure function of its inputs. Inputs that make a statistic
//! mathematically undefined (zero range, zero dispersion) produce
//! [`TestOutcome::Undefined`] instead of a NaN, so the decision rule stays
//! well-defined downstream.

pub mod anova;
pub mod kruskal;
pub mod levene;
pub mod mann_whitney;
pub mod ranks;
pub mod shapiro;
pub mod special;
pub mod ttest;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Promotion;

pub use anova::one_way_anova;
pub use kruskal::kruskal_wallis;
pub use levene::{levene, Center};
pub use mann_whitney::mann_whitney_u;
pub use shapiro::shapiro_wilk;
pub use ttest::{two_sample_t_test, VarianceAssumption};

/// Conventional significance threshold.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Errors raised before a statistic can be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("{test}: needs at least {required} observations per sample, got {actual}")]
    InsufficientData {
        test: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{test}: needs more pooled observations ({actual}) than samples ({samples})")]
    InsufficientPooledData {
        test: &'static str,
        samples: usize,
        actual: usize,
    },

    #[error("{test}: supports at most {max} observations, got {actual}")]
    TooManyObservations {
        test: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{test}: needs at least {required} samples, got {actual}")]
    TooFewSamples {
        test: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("{test}: input contains non-finite values")]
    NonFinite { test: &'static str },

    #[error("promotion {promotion} has no observations")]
    MissingGroup { promotion: Promotion },

    #[error("significance level must lie strictly between 0 and 1, got {0}")]
    InvalidSignificance(f64),
}

/// Significance threshold alpha, validated to lie in (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SignificanceLevel(f64);

impl SignificanceLevel {
    pub fn new(alpha: f64) -> Result<Self, StatsError> {
        if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
            Ok(Self(alpha))
        } else {
            Err(StatsError::InvalidSignificance(alpha))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for SignificanceLevel {
    fn default() -> Self {
        Self(DEFAULT_ALPHA)
    }
}

impl TryFrom<f64> for SignificanceLevel {
    type Error = StatsError;

    fn try_from(alpha: f64) -> Result<Self, Self::Error> {
        Self::new(alpha)
    }
}

impl From<SignificanceLevel> for f64 {
    fn from(level: SignificanceLevel) -> f64 {
        level.0
    }
}

/// A computed test statistic and its p-value in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
}

impl TestResult {
    /// Build a result, clamping round-off that pushes p outside [0, 1].
    pub fn new(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic,
            p_value: p_value.clamp(0.0, 1.0),
        }
    }

    /// Reject H0 iff p < alpha.
    pub fn decision(&self, alpha: SignificanceLevel) -> Decision {
        if self.p_value < alpha.value() {
            Decision::Reject
        } else {
            Decision::FailToReject
        }
    }
}

/// Result of a test that ran: either a number or an explicit undefined state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    Defined(TestResult),
    Undefined { reason: String },
}

impl TestOutcome {
    pub(crate) fn undefined(reason: impl Into<String>) -> Self {
        TestOutcome::Undefined {
            reason: reason.into(),
        }
    }

    /// Wrap a raw computation, mapping any non-finite value to `Undefined`.
    pub(crate) fn from_raw(statistic: f64, p_value: f64, what: &str) -> Self {
        if statistic.is_nan() || !p_value.is_finite() {
            TestOutcome::undefined(format!("{what} is not defined for this input"))
        } else {
            TestOutcome::Defined(TestResult::new(statistic, p_value))
        }
    }

    pub fn result(&self) -> Option<&TestResult> {
        match self {
            TestOutcome::Defined(r) => Some(r),
            TestOutcome::Undefined { .. } => None,
        }
    }

    pub fn p_value(&self) -> Option<f64> {
        self.result().map(|r| r.p_value)
    }

    pub fn decision(&self, alpha: SignificanceLevel) -> Decision {
        match self {
            TestOutcome::Defined(r) => r.decision(alpha),
            TestOutcome::Undefined { .. } => Decision::Undetermined,
        }
    }
}

/// Accept/reject decision for a null hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Reject,
    FailToReject,
    Undetermined,
}

impl Decision {
    pub fn is_reject(self) -> bool {
        self == Decision::Reject
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Reject => "reject H0",
            Decision::FailToReject => "fail to reject H0",
            Decision::Undetermined => "undetermined",
        }
    }
}

pub(crate) fn ensure_finite(test: &'static str, values: &[f64]) -> Result<(), StatsError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(StatsError::NonFinite { test })
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
