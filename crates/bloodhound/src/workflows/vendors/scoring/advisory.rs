use rust_decimal::Decimal;

use super::super::domain::{
    FilingStatus, InsolvencyStatus, RegistrationStatus, RiskScore, VendorProfile,
};
use super::config::RuleThresholds;
use super::tiering::CRITICAL_FLOOR;

pub const PAYMENT_BLOCK_ACTION: &str = "BLOCK ALL PAYMENTS";
pub const CONTINUE_MONITORING: &str = "Continue monitoring";

/// Compliance rule violations. Reported separately from risk factors even when
/// the underlying attribute also feeds the score.
pub fn breaches(profile: &VendorProfile, thresholds: &RuleThresholds) -> Vec<String> {
    let mut breaches = Vec::new();

    if profile.gstr3b_status == FilingStatus::NotFiled {
        breaches.push("GSTR-3B not filed for the current period".to_string());
    }

    if profile.months_not_filed > thresholds.filing_grace_months {
        breaches.push(format!(
            "Filing lapse of {} months exceeds the {}-month grace period",
            profile.months_not_filed, thresholds.filing_grace_months
        ));
    }

    match profile.registration_status {
        Some(status @ (RegistrationStatus::Suspended | RegistrationStatus::Cancelled)) => {
            breaches.push(format!("GST registration {}", status.label().to_lowercase()));
        }
        Some(RegistrationStatus::Active) | None => {}
    }

    if profile.insolvency_status == Some(InsolvencyStatus::UnderCirp) {
        breaches.push("Insolvency proceedings (CIRP) in progress".to_string());
    }

    if profile.itc_amount > Decimal::ZERO && profile.transaction_count == 0 {
        breaches.push("ITC claimed without supporting transactions".to_string());
    }

    breaches
}

/// Ordered cascade; callers render a prefix, so the payment block always
/// leads when it fires.
pub fn recommended_actions(
    profile: &VendorProfile,
    score: RiskScore,
    thresholds: &RuleThresholds,
) -> Vec<String> {
    let mut actions = Vec::new();

    if score.value() >= CRITICAL_FLOOR {
        actions.push(PAYMENT_BLOCK_ACTION.to_string());
    }

    if profile.registration_days < thresholds.new_registration_days {
        actions.push(format!(
            "Conduct enhanced due diligence: vendor registered {} days ago",
            profile.registration_days
        ));
    }

    if profile.months_not_filed > thresholds.non_filing_months {
        actions.push(format!(
            "Issue filing-risk notice: GSTR-3B not filed for {} months",
            profile.months_not_filed
        ));
    }

    if profile.director_companies > thresholds.shell_director_companies {
        actions.push(format!(
            "Review director network: shell-company risk ({} linked companies)",
            profile.director_companies
        ));
    }

    if actions.is_empty() {
        actions.push(CONTINUE_MONITORING.to_string());
    }

    actions
}
