//! Serializable analysis configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! alpha = 0.05
//! gating = "advisory"
//! levene_center = "median"
//! posthoc = true
//! promotions = [1, 2, 3]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use promolab_core::stats::Center;
use promolab_core::{Promotion, SignificanceLevel};

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("need at least two distinct promotions to compare, got {0}")]
    TooFewPromotions(usize),
}

/// How the normality and variance checks influence the verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatingMode {
    /// Both omnibus tests run; the rank-based test decides and the
    /// strategy recommendation is reported alongside.
    #[default]
    Advisory,
    /// Only the test family the checks select runs, and it decides.
    Enforced,
}

impl GatingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GatingMode::Advisory => "advisory",
            GatingMode::Enforced => "enforced",
        }
    }
}

/// Parameters for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Significance threshold for every decision in the run.
    pub alpha: SignificanceLevel,
    pub gating: GatingMode,
    /// Center used by the variance homogeneity check.
    pub levene_center: Center,
    /// Run pairwise post-hoc comparisons.
    pub posthoc: bool,
    /// Promotions to compare, in report order.
    pub promotions: Vec<Promotion>,
    /// Optional input path; the CLI `--data` flag takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: SignificanceLevel::default(),
            gating: GatingMode::default(),
            levene_center: Center::default(),
            posthoc: true,
            promotions: Promotion::TRIAL.to_vec(),
            data: None,
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check the promotion list names at least two distinct promotions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let distinct = self.distinct_promotions().len();
        if distinct < 2 {
            return Err(ConfigError::TooFewPromotions(distinct));
        }
        Ok(())
    }

    /// Configured promotions with duplicates removed, first occurrence kept.
    pub fn distinct_promotions(&self) -> Vec<Promotion> {
        let mut seen = Vec::with_capacity(self.promotions.len());
        for p in &self.promotions {
            if !seen.contains(p) {
                seen.push(*p);
            }
        }
        seen
    }
}
