//! End-to-end analysis runs over synthetic and hand-written campaigns.

use promolab_core::data::{generate_campaign, DataError, SyntheticConfig};
use promolab_core::domain::ObservationError;
use promolab_core::{read_csv, Dataset, Decision, Promotion, StatsError};
use promolab_runner::{
    run_analysis, AnalysisConfig, AnalysisError, CheckKind, CheckStatus, ConfigError,
    GatingMode, PairwiseTest,
};

fn campaign(seed: u64, effects: &[(u8, f64)]) -> Dataset {
    let mut config = SyntheticConfig {
        seed,
        ..SyntheticConfig::default()
    };
    for &(p, delta) in effects {
        config = config.with_effect(Promotion(p), delta);
    }
    Dataset::new(generate_campaign(&config)).unwrap()
}

#[test]
fn strong_effect_is_rejected_with_significant_pairs() {
    let ds = campaign(7, &[(1, 20.0)]);
    let report = run_analysis(&ds, &AnalysisConfig::default()).unwrap();

    assert_eq!(report.rows, ds.len());
    assert_eq!(report.normality.len(), 3);
    assert_eq!(report.comparisons.len(), 2);
    assert_eq!(report.verdict.basis, CheckKind::KruskalWallis);
    assert_eq!(report.verdict.decision, Decision::Reject);

    assert_eq!(report.posthoc.len(), 3);
    assert!(report.posthoc.iter().all(|p| p.test == PairwiseTest::MannWhitney));
    // Promotion 1 stands apart from both others.
    assert!(report.posthoc[0].significant);
    assert!(report.posthoc[1].significant);
}

#[test]
fn report_carries_dataset_metadata() {
    let ds = campaign(3, &[]);
    let report = run_analysis(&ds, &AnalysisConfig::default()).unwrap();
    assert_eq!(&report.dataset_hash, ds.hash());
    assert_eq!(report.description.rows, ds.len());
    assert_eq!(report.description.by_promotion.len(), 3);
    assert_eq!(report.schema_version, promolab_runner::SCHEMA_VERSION);
    assert!(report.failed_checks().is_empty());
    assert_eq!(report.checks().count(), 3 + 1 + 2);
}

#[test]
fn enforced_gating_decides_with_selected_family() {
    let ds = campaign(5, &[(2, 12.0)]);
    let config = AnalysisConfig {
        gating: GatingMode::Enforced,
        ..AnalysisConfig::default()
    };
    let report = run_analysis(&ds, &config).unwrap();
    assert_eq!(report.comparisons.len(), 1);
    assert_eq!(report.verdict.basis, report.strategy.omnibus());
    assert!(!report.verdict.advisory);
    assert!(report.comparison(report.strategy.omnibus()).is_some());
}

#[test]
fn missing_promotion_aborts_before_checks() {
    let csv = "\
MarketID,MarketSize,LocationID,AgeOfStore,Promotion,week,SalesInThousands
1,Small,1,4,1,1,30.0
1,Small,1,4,1,2,32.0
1,Small,2,4,2,1,31.0
1,Small,2,4,2,2,29.5
";
    let ds = read_csv(csv.as_bytes()).unwrap();
    let err = run_analysis(&ds, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Stats(StatsError::MissingGroup { promotion: Promotion(3) })
    ));
}

#[test]
fn rows_outside_trial_promotions_are_rejected_on_load() {
    let csv = "\
MarketID,MarketSize,LocationID,AgeOfStore,Promotion,week,SalesInThousands
1,Small,1,4,1,1,30.0
1,Small,1,4,1,2,32.0
1,Small,1,4,1,3,33.5
1,Small,2,4,2,1,41.0
1,Small,2,4,2,2,39.5
1,Small,2,4,2,3,40.0
1,Small,3,4,3,1,51.0
1,Small,3,4,3,2,52.5
1,Small,3,4,3,3,50.0
1,Small,4,4,7,1,60.0
1,Small,5,4,0,1,20.0
";
    match read_csv(csv.as_bytes()) {
        Err(DataError::InvalidRow { record, source }) => {
            assert_eq!(record, 10);
            assert_eq!(source, ObservationError::PromotionOutOfRange(Promotion(7)));
        }
        other => panic!("expected invalid row, got {other:?}"),
    }

    // Without the stray rows every loaded observation lands in a group.
    let valid: String = csv.lines().take(10).map(|l| format!("{l}\n")).collect();
    let ds = read_csv(valid.as_bytes()).unwrap();
    let report = run_analysis(&ds, &AnalysisConfig::default()).unwrap();
    let grouped: usize = report.description.by_promotion.iter().map(|g| g.count).sum();
    assert_eq!(grouped, report.rows);
    assert_eq!(report.description.by_promotion.len(), 3);
}

#[test]
fn subset_of_promotions_can_be_compared() {
    let csv = "\
MarketID,MarketSize,LocationID,AgeOfStore,Promotion,week,SalesInThousands
1,Small,1,4,1,1,30.0
1,Small,1,4,1,2,32.0
1,Small,1,4,1,3,33.5
1,Small,2,4,2,1,31.0
1,Small,2,4,2,2,29.5
1,Small,2,4,2,3,28.0
";
    let ds = read_csv(csv.as_bytes()).unwrap();
    let config = AnalysisConfig {
        promotions: vec![Promotion(1), Promotion(2)],
        ..AnalysisConfig::default()
    };
    let report = run_analysis(&ds, &config).unwrap();
    assert_eq!(report.normality.len(), 2);
    assert_eq!(report.posthoc.len(), 1);
}

#[test]
fn tiny_groups_record_failed_checks_and_continue() {
    let csv = "\
MarketID,MarketSize,LocationID,AgeOfStore,Promotion,week,SalesInThousands
1,Small,1,4,1,1,30.0
1,Small,1,4,1,2,32.0
1,Small,2,4,2,1,41.0
1,Small,2,4,2,2,39.5
1,Small,3,4,3,1,51.0
1,Small,3,4,3,2,52.5
";
    let ds = read_csv(csv.as_bytes()).unwrap();
    let report = run_analysis(&ds, &AnalysisConfig::default()).unwrap();

    assert_eq!(report.failed_checks().len(), 3);
    assert!(report
        .normality
        .iter()
        .all(|c| matches!(c.status, CheckStatus::Failed { .. })));
    // Levene and the omnibus tests only need two values per group.
    assert!(matches!(report.variance.status, CheckStatus::Completed { .. }));
    assert_ne!(report.verdict.decision, Decision::Undetermined);
}

#[test]
fn invalid_config_is_rejected() {
    let ds = campaign(1, &[]);
    let config = AnalysisConfig {
        promotions: vec![Promotion(1)],
        ..AnalysisConfig::default()
    };
    assert!(matches!(
        run_analysis(&ds, &config),
        Err(AnalysisError::Config(ConfigError::TooFewPromotions(1)))
    ));
}

#[test]
fn repeated_runs_agree_apart_from_timestamp() {
    let ds = campaign(9, &[(3, 4.0)]);
    let config = AnalysisConfig::default();
    let mut a = run_analysis(&ds, &config).unwrap();
    let b = run_analysis(&ds, &config).unwrap();
    a.generated_at = b.generated_at;
    assert_eq!(a, b);
}
