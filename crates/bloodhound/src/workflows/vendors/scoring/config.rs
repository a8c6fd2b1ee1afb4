use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rule weights and thresholds for the vendor risk rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: RuleWeights,
    pub thresholds: RuleThresholds,
}

/// Points contributed by each indicator when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleWeights {
    pub new_registration: u8,
    pub recent_registration: u8,
    pub non_filing: u8,
    pub shell_director: u8,
    pub busy_director: u8,
    pub virtual_address: u8,
    pub residential_address: u8,
    pub itc_concentration: u8,
    pub thin_history: u8,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            new_registration: 30,
            recent_registration: 15,
            non_filing: 30,
            shell_director: 25,
            busy_director: 10,
            virtual_address: 15,
            residential_address: 10,
            itc_concentration: 15,
            thin_history: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Registrations younger than this many days are "new".
    pub new_registration_days: u32,
    pub recent_registration_days: u32,
    /// Non-filing fires strictly above this many months.
    pub non_filing_months: u32,
    /// Regulatory grace period before a lapse becomes a breach.
    pub filing_grace_months: u32,
    pub shell_director_companies: u32,
    pub busy_director_companies: u32,
    /// Average ITC per transaction above which credit looks concentrated.
    pub concentration_ticket_size: Decimal,
    pub concentration_max_transactions: u32,
    pub thin_history_transactions: u32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            new_registration_days: 30,
            recent_registration_days: 90,
            non_filing_months: 2,
            filing_grace_months: 2,
            shell_director_companies: 20,
            busy_director_companies: 10,
            concentration_ticket_size: Decimal::from(100_000),
            concentration_max_transactions: 10,
            thin_history_transactions: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("failed to read scoring policy: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scoring policy JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("weight for `{stronger}` must not be lower than weight for `{weaker}`")]
    NonMonotonicWeights {
        stronger: &'static str,
        weaker: &'static str,
    },
    #[error("threshold `{narrower}` must be below `{wider}`")]
    OverlappingThresholds {
        narrower: &'static str,
        wider: &'static str,
    },
    #[error("threshold `{field}` must be positive")]
    NonPositiveThreshold { field: &'static str },
}

impl ScoringConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScoringConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScoringConfigError> {
        let config: ScoringConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject policies where a stronger indicator would score below its weaker
    /// sibling or where tiered thresholds overlap.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let weights = &self.weights;
        let thresholds = &self.thresholds;

        if weights.new_registration < weights.recent_registration {
            return Err(ScoringConfigError::NonMonotonicWeights {
                stronger: "new_registration",
                weaker: "recent_registration",
            });
        }
        if weights.shell_director < weights.busy_director {
            return Err(ScoringConfigError::NonMonotonicWeights {
                stronger: "shell_director",
                weaker: "busy_director",
            });
        }
        if weights.virtual_address < weights.residential_address {
            return Err(ScoringConfigError::NonMonotonicWeights {
                stronger: "virtual_address",
                weaker: "residential_address",
            });
        }

        if thresholds.new_registration_days >= thresholds.recent_registration_days {
            return Err(ScoringConfigError::OverlappingThresholds {
                narrower: "new_registration_days",
                wider: "recent_registration_days",
            });
        }
        if thresholds.busy_director_companies >= thresholds.shell_director_companies {
            return Err(ScoringConfigError::OverlappingThresholds {
                narrower: "busy_director_companies",
                wider: "shell_director_companies",
            });
        }
        if thresholds.concentration_ticket_size <= Decimal::ZERO {
            return Err(ScoringConfigError::NonPositiveThreshold {
                field: "concentration_ticket_size",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        ScoringConfig::default()
            .validate()
            .expect("defaults are monotonic");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config = ScoringConfig::from_json(r#"{ "weights": { "thin_history": 8 } }"#)
            .expect("partial policy parses");
        assert_eq!(config.weights.thin_history, 8);
        assert_eq!(config.weights.non_filing, 30);
        assert_eq!(config.thresholds.recent_registration_days, 90);
    }

    #[test]
    fn rejects_inverted_director_weights() {
        let err = ScoringConfig::from_json(
            r#"{ "weights": { "shell_director": 5, "busy_director": 10 } }"#,
        )
        .expect_err("inverted weights rejected");

        match err {
            ScoringConfigError::NonMonotonicWeights { stronger, weaker } => {
                assert_eq!(stronger, "shell_director");
                assert_eq!(weaker, "busy_director");
            }
            other => panic!("expected monotonicity error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_overlapping_registration_windows() {
        let err = ScoringConfig::from_json(r#"{ "thresholds": { "new_registration_days": 120 } }"#)
            .expect_err("overlap rejected");
        assert!(matches!(err, ScoringConfigError::OverlappingThresholds { .. }));
    }
}
