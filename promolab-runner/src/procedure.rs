//! The analysis procedure: normality, variance, omnibus comparison, post-hoc.
//!
//! Each check is independent. A check that errors is recorded as a failed
//! named check and the remaining checks still run. Only a configuration
//! problem or a promotion with no observations aborts the run, and both are
//! detected before any statistic is computed.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use promolab_core::describe::describe;
use promolab_core::stats::{kruskal_wallis, levene, one_way_anova, shapiro_wilk, Center};
use promolab_core::{
    require_groups, Dataset, Decision, Group, Promotion, SignificanceLevel, StatsError,
    TestOutcome, TestResult,
};

use crate::config::{AnalysisConfig, ConfigError, GatingMode};
use crate::posthoc::{pairwise_comparisons, PairwiseComparison, PairwiseTest};
use crate::report::{AnalysisReport, SCHEMA_VERSION};

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// Which statistical check a [`NamedCheck`] ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Normality,
    VarianceHomogeneity,
    KruskalWallis,
    Anova,
}

impl CheckKind {
    pub fn label(self) -> &'static str {
        match self {
            CheckKind::Normality => "Shapiro-Wilk",
            CheckKind::VarianceHomogeneity => "Levene",
            CheckKind::KruskalWallis => "Kruskal-Wallis",
            CheckKind::Anova => "one-way ANOVA",
        }
    }
}

/// How a check ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CheckStatus {
    Completed {
        outcome: TestOutcome,
        decision: Decision,
    },
    Failed {
        error: String,
    },
}

impl CheckStatus {
    /// Failed checks count as undetermined.
    pub fn decision(&self) -> Decision {
        match self {
            CheckStatus::Completed { decision, .. } => *decision,
            CheckStatus::Failed { .. } => Decision::Undetermined,
        }
    }

    pub fn result(&self) -> Option<&TestResult> {
        match self {
            CheckStatus::Completed { outcome, .. } => outcome.result(),
            CheckStatus::Failed { .. } => None,
        }
    }
}

/// One labelled check in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCheck {
    pub name: String,
    pub kind: CheckKind,
    /// Set for per-group checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Promotion>,
    pub null_hypothesis: String,
    pub status: CheckStatus,
}

/// Test family recommended by the normality and variance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStrategy {
    Parametric,
    RankBased,
}

impl ComparisonStrategy {
    /// Omnibus test for this family.
    pub fn omnibus(self) -> CheckKind {
        match self {
            ComparisonStrategy::Parametric => CheckKind::Anova,
            ComparisonStrategy::RankBased => CheckKind::KruskalWallis,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonStrategy::Parametric => "parametric",
            ComparisonStrategy::RankBased => "rank-based",
        }
    }
}

/// The authoritative answer to "do the promotions differ?".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Omnibus test the decision was taken from.
    pub basis: CheckKind,
    pub decision: Decision,
    pub p_value: Option<f64>,
    /// Set under advisory gating: the strategy was reported, not applied.
    pub advisory: bool,
}

impl Verdict {
    pub fn summary(&self) -> &'static str {
        match self.decision {
            Decision::Reject => "at least one promotion's sales distribution differs",
            Decision::FailToReject => "no difference between promotions detected",
            Decision::Undetermined => "the comparison could not be decided",
        }
    }
}

/// Everything computed from the promotion groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub normality: Vec<NamedCheck>,
    pub variance: NamedCheck,
    pub comparisons: Vec<NamedCheck>,
    pub strategy: ComparisonStrategy,
    pub verdict: Verdict,
    pub posthoc: Vec<PairwiseComparison>,
}

fn run_check<F>(
    name: String,
    kind: CheckKind,
    promotion: Option<Promotion>,
    null_hypothesis: String,
    alpha: SignificanceLevel,
    test: F,
) -> NamedCheck
where
    F: FnOnce() -> Result<TestOutcome, StatsError>,
{
    let status = match test() {
        Ok(outcome) => {
            let decision = outcome.decision(alpha);
            match &outcome {
                TestOutcome::Defined(r) => debug!(
                    check = %name,
                    statistic = r.statistic,
                    p_value = r.p_value,
                    decision = decision.label(),
                    "check completed"
                ),
                TestOutcome::Undefined { reason } => {
                    warn!(check = %name, %reason, "check undefined for this input")
                }
            }
            CheckStatus::Completed { outcome, decision }
        }
        Err(e) => {
            warn!(check = %name, error = %e, "check failed");
            CheckStatus::Failed {
                error: e.to_string(),
            }
        }
    };
    NamedCheck {
        name,
        kind,
        promotion,
        null_hypothesis,
        status,
    }
}

/// Shapiro-Wilk on one promotion group.
pub fn normality_check(group: &Group, alpha: SignificanceLevel) -> NamedCheck {
    run_check(
        format!("normality (promotion {})", group.promotion),
        CheckKind::Normality,
        Some(group.promotion),
        format!("sales for promotion {} are normally distributed", group.promotion),
        alpha,
        || shapiro_wilk(group.as_slice()),
    )
}

/// Levene / Brown-Forsythe across the groups.
pub fn variance_check(groups: &[Group], center: Center, alpha: SignificanceLevel) -> NamedCheck {
    let samples: Vec<&[f64]> = groups.iter().map(Group::as_slice).collect();
    run_check(
        "variance homogeneity".to_string(),
        CheckKind::VarianceHomogeneity,
        None,
        "all promotion groups have equal variance".to_string(),
        alpha,
        || levene(&samples, center),
    )
}

/// Omnibus comparison of every group with the family's test.
pub fn comparison_check(
    groups: &[Group],
    family: ComparisonStrategy,
    alpha: SignificanceLevel,
) -> NamedCheck {
    let samples: Vec<&[f64]> = groups.iter().map(Group::as_slice).collect();
    type Omnibus = fn(&[&[f64]]) -> Result<TestOutcome, StatsError>;
    let (null_hypothesis, test): (&str, Omnibus) = match family {
        ComparisonStrategy::Parametric => ("all promotions have equal mean sales", one_way_anova),
        ComparisonStrategy::RankBased => (
            "all promotions share the same sales distribution",
            kruskal_wallis,
        ),
    };
    let kind = family.omnibus();
    run_check(
        kind.label().to_string(),
        kind,
        None,
        null_hypothesis.to_string(),
        alpha,
        || test(&samples),
    )
}

/// Parametric only when no group rejects normality and variances are
/// homogeneous. An undefined or failed check counts against it.
pub fn select_strategy(normality: &[NamedCheck], variance: &NamedCheck) -> ComparisonStrategy {
    let normal = normality
        .iter()
        .all(|c| c.status.decision() == Decision::FailToReject);
    let homogeneous = variance.status.decision() == Decision::FailToReject;
    if normal && homogeneous {
        ComparisonStrategy::Parametric
    } else {
        ComparisonStrategy::RankBased
    }
}

/// Run every check on pre-partitioned groups.
pub fn evaluate(groups: &[Group], config: &AnalysisConfig) -> Evaluation {
    let alpha = config.alpha;

    let normality: Vec<NamedCheck> = groups.iter().map(|g| normality_check(g, alpha)).collect();
    let variance = variance_check(groups, config.levene_center, alpha);
    let strategy = select_strategy(&normality, &variance);

    let (families, deciding_family) = match config.gating {
        GatingMode::Advisory => (
            vec![ComparisonStrategy::Parametric, ComparisonStrategy::RankBased],
            ComparisonStrategy::RankBased,
        ),
        GatingMode::Enforced => (vec![strategy], strategy),
    };
    let comparisons: Vec<NamedCheck> = families
        .into_iter()
        .map(|family| comparison_check(groups, family, alpha))
        .collect();

    let basis = deciding_family.omnibus();
    let deciding = comparisons.iter().find(|c| c.kind == basis);
    let verdict = Verdict {
        basis,
        decision: deciding.map_or(Decision::Undetermined, |c| c.status.decision()),
        p_value: deciding.and_then(|c| c.status.result()).map(|r| r.p_value),
        advisory: config.gating == GatingMode::Advisory,
    };
    info!(
        strategy = strategy.as_str(),
        basis = basis.label(),
        decision = verdict.decision.label(),
        "verdict"
    );

    let posthoc = if config.posthoc {
        let test = match deciding_family {
            ComparisonStrategy::Parametric
                if variance.status.decision() == Decision::FailToReject =>
            {
                PairwiseTest::StudentT
            }
            ComparisonStrategy::Parametric => PairwiseTest::WelchT,
            ComparisonStrategy::RankBased => PairwiseTest::MannWhitney,
        };
        pairwise_comparisons(groups, test, alpha)
    } else {
        Vec::new()
    };

    Evaluation {
        normality,
        variance,
        comparisons,
        strategy,
        verdict,
        posthoc,
    }
}

/// Full analysis of a dataset: partition, checks, descriptive tables.
pub fn run_analysis(
    dataset: &Dataset,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, AnalysisError> {
    config.validate()?;
    let promotions = config.distinct_promotions();
    let groups = require_groups(dataset.observations(), &promotions)?;
    let grouped: usize = groups.iter().map(|g| g.sales.len()).sum();
    debug!(
        rows = dataset.len(),
        groups = groups.len(),
        hash = dataset.hash().short(),
        "partitioned dataset"
    );
    if grouped < dataset.len() {
        info!(
            excluded = dataset.len() - grouped,
            "rows for promotions outside the configured set are not compared"
        );
    }

    let evaluation = evaluate(&groups, config);

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Utc::now(),
        dataset_hash: dataset.hash().clone(),
        rows: dataset.len(),
        alpha: config.alpha,
        gating: config.gating,
        description: describe(dataset.observations()),
        normality: evaluation.normality,
        variance: evaluation.variance,
        comparisons: evaluation.comparisons,
        strategy: evaluation.strategy,
        verdict: evaluation.verdict,
        posthoc: evaluation.posthoc,
    })
}
