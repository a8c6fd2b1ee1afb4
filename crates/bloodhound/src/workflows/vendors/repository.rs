use serde::Serialize;

use super::domain::{Gstin, VendorRecord};
use super::scoring::BadgeColors;

/// Number of recommended actions surfaced in summary views.
pub const VIEW_ACTION_LIMIT: usize = 4;

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Records are keyed by their normalized GSTIN.
pub trait VendorRepository: Send + Sync {
    fn insert(&self, record: VendorRecord) -> Result<VendorRecord, RepositoryError>;
    fn update(&self, record: VendorRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, gstin: &Gstin) -> Result<Option<VendorRecord>, RepositoryError>;
    fn all(&self) -> Result<Vec<VendorRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("vendor already exists")]
    Conflict,
    #[error("vendor not found")]
    NotFound,
    #[error("vendor record has no usable GSTIN")]
    MissingKey,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of a vendor's current risk standing.
#[derive(Debug, Clone, Serialize)]
pub struct VendorRiskView {
    pub gstin: String,
    pub name: Option<String>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<BadgeColors>,
    pub risk_factors: Vec<String>,
    pub breaches: Vec<String>,
    pub recommended_actions: Vec<String>,
}

impl VendorRecord {
    pub fn status_view(&self) -> VendorRiskView {
        let gstin = self
            .key()
            .map(String::from)
            .or_else(|| self.attributes.gstin.clone())
            .unwrap_or_default();
        let level = self.risk_level();

        VendorRiskView {
            gstin,
            name: self.attributes.name.clone(),
            status: if self.assessment().is_some() {
                "scored"
            } else {
                "unscored"
            },
            risk_score: self.risk_score().map(|score| score.value()),
            risk_level: level.map(|level| level.label()),
            badge: level.map(|level| level.badge()),
            risk_factors: self.risk_factors().to_vec(),
            breaches: self.breaches().to_vec(),
            recommended_actions: self
                .recommended_actions()
                .iter()
                .take(VIEW_ACTION_LIMIT)
                .cloned()
                .collect(),
        }
    }
}
