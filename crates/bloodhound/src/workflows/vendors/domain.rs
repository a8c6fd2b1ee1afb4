use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scoring::RiskAssessment;
use super::validation::ValidationError;

/// Fifteen character GST registration number, stored upper-cased.
///
/// Layout: two digit state code, ten character PAN, entity number, a default
/// `Z`-position character and a check character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

pub const GSTIN_LENGTH: usize = 15;
const PAN_RANGE: std::ops::Range<usize> = 2..12;

impl Gstin {
    pub fn parse(raw: &str) -> Result<Self, GstinError> {
        let normalized: String = raw
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        if !normalized.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(GstinError::NonAlphanumeric);
        }

        if normalized.len() != GSTIN_LENGTH {
            return Err(GstinError::Length(normalized.len()));
        }

        let bytes = normalized.as_bytes();
        if !bytes[..2].iter().all(u8::is_ascii_digit) {
            return Err(GstinError::StateCode);
        }

        let pan = &bytes[PAN_RANGE];
        let pan_shape = pan[..5].iter().all(u8::is_ascii_alphabetic)
            && pan[5..9].iter().all(u8::is_ascii_digit)
            && pan[9].is_ascii_alphabetic();
        if !pan_shape {
            return Err(GstinError::EmbeddedPan);
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Permanent account number embedded at offset 2.
    pub fn pan(&self) -> &str {
        &self.0[PAN_RANGE]
    }

    pub fn state_code(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for Gstin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Gstin {
    type Error = GstinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Gstin> for String {
    fn from(value: Gstin) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GstinError {
    #[error("expected 15 characters, found {0}")]
    Length(usize),
    #[error("only ASCII letters and digits are allowed")]
    NonAlphanumeric,
    #[error("first two characters must be a numeric state code")]
    StateCode,
    #[error("characters 3-12 must form a PAN (AAAAA9999A)")]
    EmbeddedPan,
}

/// GSTR-3B return state for the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingStatus {
    #[serde(alias = "filed")]
    Filed,
    #[serde(rename = "Not Filed", alias = "not_filed", alias = "NotFiled")]
    NotFiled,
    #[serde(alias = "delayed")]
    Delayed,
}

impl FilingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Filed => "Filed",
            Self::NotFiled => "Not Filed",
            Self::Delayed => "Delayed",
        }
    }
}

/// Principal place of business classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressType {
    #[serde(alias = "residential")]
    Residential,
    #[serde(alias = "commercial")]
    Commercial,
    #[serde(alias = "virtual")]
    Virtual,
    #[serde(alias = "industrial")]
    Industrial,
}

impl AddressType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Commercial => "Commercial",
            Self::Virtual => "Virtual",
            Self::Industrial => "Industrial",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[serde(alias = "active")]
    Active,
    #[serde(alias = "suspended")]
    Suspended,
    #[serde(alias = "cancelled")]
    Cancelled,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Suspended => "Suspended",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsolvencyStatus {
    #[serde(alias = "clear")]
    Clear,
    #[serde(rename = "Under CIRP", alias = "under_cirp")]
    UnderCirp,
}

impl InsolvencyStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::UnderCirp => "Under CIRP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsmeCategory {
    Micro,
    Small,
    Medium,
}

/// Discrete severity bucket; variant order is severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Critical")]
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
            Self::Critical => "Critical",
        }
    }
}

/// Score on the closed interval `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RiskScore(u8);

impl RiskScore {
    pub const MAX: RiskScore = RiskScore(100);
    pub const MIN: RiskScore = RiskScore(0);

    /// Clamp an additive point total into the score range.
    pub fn from_points(points: u32) -> Self {
        Self(points.min(u32::from(Self::MAX.0)) as u8)
    }

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RiskScore {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("risk score {value} exceeds 100"))
    }
}

impl From<RiskScore> for u8 {
    fn from(value: RiskScore) -> Self {
        value.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw vendor attributes as held by the store or produced by a provider.
///
/// Every field is optional here so the scoring boundary can report which
/// required attribute is absent instead of guessing a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gstr3b_status: Option<FilingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_not_filed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itc_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director_companies: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_status: Option<RegistrationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insolvency_status: Option<InsolvencyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msme_category: Option<MsmeCategory>,
}

/// How provider output is folded into an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Present fields overwrite stored ones.
    Replace,
    /// Like `Replace`, except ledger figures are added to the stored totals.
    AccumulateLedger,
}

impl VendorAttributes {
    /// Fold `update` into these attributes. An accumulated ledger total that
    /// would overflow is rejected and leaves `self` untouched.
    pub fn merge(
        &mut self,
        update: VendorAttributes,
        mode: MergeMode,
    ) -> Result<(), ValidationError> {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        let (transaction_count, itc_amount) = match mode {
            MergeMode::Replace => (
                update.transaction_count.or(self.transaction_count),
                update.itc_amount.or(self.itc_amount),
            ),
            MergeMode::AccumulateLedger => {
                let transaction_count = match update.transaction_count {
                    Some(count) => Some(
                        self.transaction_count
                            .unwrap_or(0)
                            .checked_add(count)
                            .ok_or_else(|| ledger_overflow("transaction_count", count))?,
                    ),
                    None => self.transaction_count,
                };
                let itc_amount = match update.itc_amount {
                    Some(amount) => Some(
                        self.itc_amount
                            .unwrap_or(Decimal::ZERO)
                            .checked_add(amount)
                            .ok_or_else(|| ledger_overflow("itc_amount", amount))?,
                    ),
                    None => self.itc_amount,
                };
                (transaction_count, itc_amount)
            }
        };

        take(&mut self.name, update.name.filter(|name| !name.trim().is_empty()));
        take(&mut self.gstin, update.gstin);
        take(&mut self.registration_days, update.registration_days);
        take(&mut self.gstr3b_status, update.gstr3b_status);
        take(&mut self.months_not_filed, update.months_not_filed);
        take(&mut self.director_companies, update.director_companies);
        take(&mut self.address_type, update.address_type);
        take(&mut self.registration_status, update.registration_status);
        take(&mut self.insolvency_status, update.insolvency_status);
        take(&mut self.msme_category, update.msme_category);
        self.transaction_count = transaction_count;
        self.itc_amount = itc_amount;

        Ok(())
    }
}

fn ledger_overflow(field: &'static str, added: impl fmt::Display) -> ValidationError {
    ValidationError::OutOfDomain {
        field,
        value: format!("running total overflows when adding {added}"),
    }
}

/// Validated, strongly typed view of a vendor used by the rule engine.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorProfile {
    pub name: String,
    pub gstin: Gstin,
    pub registration_days: u32,
    pub gstr3b_status: FilingStatus,
    pub months_not_filed: u32,
    pub transaction_count: u32,
    pub itc_amount: Decimal,
    pub director_companies: u32,
    pub address_type: AddressType,
    pub registration_status: Option<RegistrationStatus>,
    pub insolvency_status: Option<InsolvencyStatus>,
}

/// Stored vendor: raw attributes plus the derived assessment.
///
/// The assessment can only be written by the risk engine; everything else
/// reads it through the accessors below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    #[serde(flatten)]
    pub attributes: VendorAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assessment: Option<RiskAssessment>,
}

impl VendorRecord {
    pub fn new(attributes: VendorAttributes) -> Self {
        Self {
            attributes,
            assessment: None,
        }
    }

    /// Normalized storage key, if the record carries a well-formed GSTIN.
    pub fn key(&self) -> Option<Gstin> {
        self.attributes
            .gstin
            .as_deref()
            .and_then(|raw| Gstin::parse(raw).ok())
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        self.assessment.as_ref()
    }

    pub fn risk_score(&self) -> Option<RiskScore> {
        self.assessment.as_ref().map(|assessment| assessment.risk_score)
    }

    pub fn risk_level(&self) -> Option<RiskLevel> {
        self.assessment.as_ref().map(|assessment| assessment.risk_level)
    }

    pub fn risk_factors(&self) -> &[String] {
        self.assessment
            .as_ref()
            .map(|assessment| assessment.risk_factors.as_slice())
            .unwrap_or(&[])
    }

    pub fn breaches(&self) -> &[String] {
        self.assessment
            .as_ref()
            .map(|assessment| assessment.breaches.as_slice())
            .unwrap_or(&[])
    }

    pub fn recommended_actions(&self) -> &[String] {
        self.assessment
            .as_ref()
            .map(|assessment| assessment.recommended_actions.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn set_assessment(&mut self, assessment: RiskAssessment) {
        self.assessment = Some(assessment);
    }

    pub(crate) fn clear_assessment(&mut self) {
        self.assessment = None;
    }
}

/// GSTINs a session has flagged for enhanced monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watchlist {
    entries: BTreeSet<Gstin>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the GSTIN was already watched.
    pub fn add(&mut self, gstin: Gstin) -> bool {
        self.entries.insert(gstin)
    }

    pub fn remove(&mut self, gstin: &Gstin) -> bool {
        self.entries.remove(gstin)
    }

    pub fn contains(&self, gstin: &Gstin) -> bool {
        self.entries.contains(gstin)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gstin> {
        self.entries.iter()
    }
}
