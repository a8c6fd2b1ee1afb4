//! Vendor compliance risk: validation, scoring, tiering, and advisory rules,
//! plus the service and HTTP surface that keep stored vendors scored.

pub mod domain;
pub mod provider;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AddressType, FilingStatus, Gstin, GstinError, InsolvencyStatus, MergeMode, MsmeCategory,
    RegistrationStatus, RiskLevel, RiskScore, VendorAttributes, VendorProfile, VendorRecord,
    Watchlist,
};
pub use provider::{DataProvider, DataSource, ProviderError};
pub use repository::{RepositoryError, VendorRepository, VendorRiskView};
pub use router::{vendor_router, VendorApiState};
pub use scoring::{
    tier, BadgeColors, BatchOutcome, RecordFailure, RiskAssessment, RiskEngine, RiskFactor,
    RiskIndicator, RuleThresholds, RuleWeights, ScoreCard, ScoringConfig, ScoringConfigError,
    CONTINUE_MONITORING, PAYMENT_BLOCK_ACTION,
};
pub use service::{IngestReport, PortfolioSummary, TierCounts, VendorService, VendorServiceError};
pub use validation::{profile_from_attributes, EngineError, RangeError, ValidationError};
