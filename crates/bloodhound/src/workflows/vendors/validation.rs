use rust_decimal::Decimal;

use super::domain::{Gstin, VendorAttributes, VendorProfile};

/// A required attribute is absent, malformed, or outside its domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required attribute `{field}`")]
    MissingField { field: &'static str },
    #[error("attribute `{field}` is malformed: {reason}")]
    Malformed { field: &'static str, reason: String },
    #[error("attribute `{field}` is out of range: {value}")]
    OutOfDomain { field: &'static str, value: String },
}

/// Attribute values that leave the score undefined.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("attribute `{field}` is negative ({value}); risk cannot be scored")]
    NegativeAttribute { field: &'static str, value: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Range(#[from] RangeError),
}

impl EngineError {
    /// Name of the offending attribute.
    pub fn field(&self) -> &'static str {
        match self {
            EngineError::Validation(ValidationError::MissingField { field })
            | EngineError::Validation(ValidationError::Malformed { field, .. })
            | EngineError::Validation(ValidationError::OutOfDomain { field, .. })
            | EngineError::Range(RangeError::NegativeAttribute { field, .. }) => *field,
        }
    }
}

fn required<T: Clone>(value: &Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value
        .clone()
        .ok_or(ValidationError::MissingField { field })
}

fn count(value: i64, field: &'static str) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::OutOfDomain {
        field,
        value: value.to_string(),
    })
}

/// Parse the storage key of a record.
pub fn parse_gstin(attributes: &VendorAttributes) -> Result<Gstin, EngineError> {
    let raw = required(&attributes.gstin, "gstin")?;
    Gstin::parse(&raw).map_err(|err| {
        ValidationError::Malformed {
            field: "gstin",
            reason: err.to_string(),
        }
        .into()
    })
}

/// Convert stored attributes into the typed profile the rule engine consumes.
///
/// Required attributes are checked in declaration order so the first missing
/// one is the one reported.
pub fn profile_from_attributes(
    attributes: &VendorAttributes,
) -> Result<VendorProfile, EngineError> {
    let name = required(&attributes.name, "name")?;
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::Malformed {
            field: "name",
            reason: "vendor name is blank".to_string(),
        }
        .into());
    }

    let gstin = parse_gstin(attributes)?;

    let registration_days = required(&attributes.registration_days, "registration_days")?;
    if registration_days < 0 {
        return Err(RangeError::NegativeAttribute {
            field: "registration_days",
            value: registration_days,
        }
        .into());
    }
    let registration_days = count(registration_days, "registration_days")?;

    let gstr3b_status = required(&attributes.gstr3b_status, "gstr3b_status")?;
    let months_not_filed = count(
        required(&attributes.months_not_filed, "months_not_filed")?,
        "months_not_filed",
    )?;
    let transaction_count = count(
        required(&attributes.transaction_count, "transaction_count")?,
        "transaction_count",
    )?;

    let itc_amount = required(&attributes.itc_amount, "itc_amount")?;
    if itc_amount < Decimal::ZERO {
        return Err(ValidationError::OutOfDomain {
            field: "itc_amount",
            value: itc_amount.to_string(),
        }
        .into());
    }

    let director_companies = count(
        required(&attributes.director_companies, "director_companies")?,
        "director_companies",
    )?;
    let address_type = required(&attributes.address_type, "address_type")?;

    Ok(VendorProfile {
        name,
        gstin,
        registration_days,
        gstr3b_status,
        months_not_filed,
        transaction_count,
        itc_amount,
        director_companies,
        address_type,
        registration_status: attributes.registration_status,
        insolvency_status: attributes.insolvency_status,
    })
}
