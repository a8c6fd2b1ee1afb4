mod advisory;
mod config;
mod rules;
mod tiering;

pub use advisory::{CONTINUE_MONITORING, PAYMENT_BLOCK_ACTION};
pub use config::{RuleThresholds, RuleWeights, ScoringConfig, ScoringConfigError};
pub use tiering::{tier, BadgeColors, CRITICAL_FLOOR, HIGH_FLOOR, MEDIUM_FLOOR};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{RiskLevel, RiskScore, VendorAttributes, VendorProfile, VendorRecord};
use super::validation::{profile_from_attributes, EngineError};

/// Stateless evaluator applying the scoring policy to vendor attributes.
///
/// Every method re-validates the raw attributes, so derived fields always
/// reflect what is stored right now.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    config: ScoringConfig,
}

impl RiskEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, attributes: &VendorAttributes) -> Result<ScoreCard, EngineError> {
        let profile = profile_from_attributes(attributes)?;
        Ok(self.score_profile(&profile))
    }

    pub fn breaches(&self, attributes: &VendorAttributes) -> Result<Vec<String>, EngineError> {
        let profile = profile_from_attributes(attributes)?;
        Ok(advisory::breaches(&profile, &self.config.thresholds))
    }

    pub fn recommended_actions(
        &self,
        attributes: &VendorAttributes,
    ) -> Result<Vec<String>, EngineError> {
        let profile = profile_from_attributes(attributes)?;
        let card = self.score_profile(&profile);
        Ok(advisory::recommended_actions(
            &profile,
            card.score,
            &self.config.thresholds,
        ))
    }

    /// Score, tier, breaches and actions computed in a single pass.
    pub fn assess(&self, attributes: &VendorAttributes) -> Result<RiskAssessment, EngineError> {
        let profile = profile_from_attributes(attributes)?;
        let card = self.score_profile(&profile);
        let thresholds = &self.config.thresholds;

        Ok(RiskAssessment {
            risk_score: card.score,
            risk_level: tier(card.score),
            risk_factors: card.factor_descriptions(),
            breaches: advisory::breaches(&profile, thresholds),
            recommended_actions: advisory::recommended_actions(&profile, card.score, thresholds),
        })
    }

    /// Recompute the derived fields of a stored record. On failure the stale
    /// assessment is dropped.
    pub fn rescore(&self, record: &mut VendorRecord) -> Result<RiskLevel, EngineError> {
        match self.assess(&record.attributes) {
            Ok(assessment) => {
                let level = assessment.risk_level;
                record.set_assessment(assessment);
                Ok(level)
            }
            Err(err) => {
                record.clear_assessment();
                Err(err)
            }
        }
    }

    /// Rescore every record; one failure never stops the rest.
    pub fn rescore_batch(&self, records: &mut [VendorRecord]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for (index, record) in records.iter_mut().enumerate() {
            match self.rescore(record) {
                Ok(_) => outcome.scored += 1,
                Err(error) => {
                    warn!(index, field = error.field(), %error, "vendor could not be scored");
                    outcome
                        .failures
                        .push(RecordFailure::new(index, &record.attributes, error));
                }
            }
        }
        outcome
    }

    fn score_profile(&self, profile: &VendorProfile) -> ScoreCard {
        let (factors, score) = rules::score_profile(profile, &self.config);
        ScoreCard { score, factors }
    }
}

/// Indicator behind a single factor, stable across weight changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskIndicator {
    NewRegistration,
    RecentRegistration,
    NonFiling,
    ShellDirector,
    BusyDirector,
    VirtualAddress,
    ResidentialAddress,
    ItcConcentration,
    ThinHistory,
}

/// Discrete contribution to a score, kept for audit trails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub indicator: RiskIndicator,
    pub points: u8,
    pub description: String,
}

impl RiskFactor {
    pub(crate) fn new(indicator: RiskIndicator, points: u8, description: String) -> Self {
        Self {
            indicator,
            points,
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    pub score: RiskScore,
    /// Most severe first.
    pub factors: Vec<RiskFactor>,
}

impl ScoreCard {
    pub fn factor_descriptions(&self) -> Vec<String> {
        self.factors
            .iter()
            .map(|factor| factor.description.clone())
            .collect()
    }
}

/// Derived fields persisted alongside a vendor's raw attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: RiskScore,
    pub risk_level: RiskLevel,
    pub risk_factors: Vec<String>,
    pub breaches: Vec<String>,
    pub recommended_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    pub field: &'static str,
    pub reason: String,
    #[serde(skip)]
    pub error: EngineError,
}

impl RecordFailure {
    pub fn new(index: usize, attributes: &VendorAttributes, error: EngineError) -> Self {
        Self {
            index,
            gstin: attributes.gstin.clone(),
            field: error.field(),
            reason: error.to_string(),
            error,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub scored: usize,
    pub failures: Vec<RecordFailure>,
}
