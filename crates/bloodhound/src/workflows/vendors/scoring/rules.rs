use rust_decimal::Decimal;

use super::super::domain::{AddressType, FilingStatus, RiskScore, VendorProfile};
use super::config::ScoringConfig;
use super::{RiskFactor, RiskIndicator};

/// Apply every rule in priority order, then order the fired factors by
/// contribution. The sort is stable, so equal contributions keep rule order.
pub(crate) fn score_profile(
    profile: &VendorProfile,
    config: &ScoringConfig,
) -> (Vec<RiskFactor>, RiskScore) {
    let weights = &config.weights;
    let thresholds = &config.thresholds;
    let mut factors = Vec::new();

    if profile.registration_days < thresholds.new_registration_days {
        factors.push(RiskFactor::new(
            RiskIndicator::NewRegistration,
            weights.new_registration,
            format!("Newly registered (<{} days)", thresholds.new_registration_days),
        ));
    } else if profile.registration_days < thresholds.recent_registration_days {
        factors.push(RiskFactor::new(
            RiskIndicator::RecentRegistration,
            weights.recent_registration,
            format!(
                "Recently registered (<{} days)",
                thresholds.recent_registration_days
            ),
        ));
    }

    if profile.gstr3b_status == FilingStatus::NotFiled
        || profile.months_not_filed > thresholds.non_filing_months
    {
        let months = profile.months_not_filed.max(1);
        factors.push(RiskFactor::new(
            RiskIndicator::NonFiling,
            weights.non_filing,
            format!("Non-filing for {months} months"),
        ));
    }

    let directors = profile.director_companies;
    if directors > thresholds.shell_director_companies {
        factors.push(RiskFactor::new(
            RiskIndicator::ShellDirector,
            weights.shell_director,
            format!("Director linked to {directors} companies (shell-company signal)"),
        ));
    } else if directors > thresholds.busy_director_companies {
        factors.push(RiskFactor::new(
            RiskIndicator::BusyDirector,
            weights.busy_director,
            format!("Director linked to {directors} companies"),
        ));
    }

    match profile.address_type {
        AddressType::Virtual => factors.push(RiskFactor::new(
            RiskIndicator::VirtualAddress,
            weights.virtual_address,
            "Registered at Virtual address".to_string(),
        )),
        AddressType::Residential => factors.push(RiskFactor::new(
            RiskIndicator::ResidentialAddress,
            weights.residential_address,
            "Registered at Residential address".to_string(),
        )),
        AddressType::Commercial | AddressType::Industrial => {}
    }

    let has_credit = profile.itc_amount > Decimal::ZERO;
    let transactions = profile.transaction_count;

    if has_credit && transactions < thresholds.concentration_max_transactions {
        let concentrated = match profile.itc_amount.checked_div(Decimal::from(transactions)) {
            Some(average) => average > thresholds.concentration_ticket_size,
            // zero transactions: every rupee of credit sits on no ledger entry
            None => true,
        };
        if concentrated {
            factors.push(RiskFactor::new(
                RiskIndicator::ItcConcentration,
                weights.itc_concentration,
                "High ITC concentration in few transactions".to_string(),
            ));
        }
    }

    if has_credit && transactions < thresholds.thin_history_transactions {
        factors.push(RiskFactor::new(
            RiskIndicator::ThinHistory,
            weights.thin_history,
            "Thin transaction history".to_string(),
        ));
    }

    factors.sort_by(|left, right| right.points.cmp(&left.points));

    let points: u32 = factors.iter().map(|factor| u32::from(factor.points)).sum();
    (factors, RiskScore::from_points(points))
}
