use super::common::*;
use crate::workflows::vendors::domain::{
    AddressType, FilingStatus, InsolvencyStatus, RegistrationStatus, RiskLevel,
};
use crate::workflows::vendors::scoring::{CONTINUE_MONITORING, PAYMENT_BLOCK_ACTION};
use rust_decimal::Decimal;

#[test]
fn shell_vendor_gets_the_full_action_cascade() {
    let actions = engine()
        .recommended_actions(&shell_vendor())
        .expect("actions");

    assert_eq!(
        actions,
        vec![
            PAYMENT_BLOCK_ACTION.to_string(),
            "Conduct enhanced due diligence: vendor registered 10 days ago".to_string(),
            "Issue filing-risk notice: GSTR-3B not filed for 4 months".to_string(),
            "Review director network: shell-company risk (25 linked companies)".to_string(),
        ]
    );
}

#[test]
fn shell_vendor_breaches_filing_rules() {
    let breaches = engine().breaches(&shell_vendor()).expect("breaches");

    assert_eq!(
        breaches,
        vec![
            "GSTR-3B not filed for the current period".to_string(),
            "Filing lapse of 4 months exceeds the 2-month grace period".to_string(),
        ]
    );
}

#[test]
fn clean_vendor_falls_back_to_monitoring() {
    let engine = engine();
    let vendor = established_vendor();

    assert_eq!(
        engine.recommended_actions(&vendor).expect("actions"),
        vec![CONTINUE_MONITORING.to_string()]
    );
    assert!(engine.breaches(&vendor).expect("breaches").is_empty());
}

#[test]
fn new_vendor_below_critical_is_not_blocked() {
    let actions = engine().recommended_actions(&new_vendor()).expect("actions");

    assert_eq!(
        actions,
        vec!["Conduct enhanced due diligence: vendor registered 15 days ago".to_string()]
    );
}

#[test]
fn medium_vendor_is_flagged_without_payment_block() {
    let mut vendor = established_vendor();
    vendor.registration_days = Some(45);
    vendor.gstr3b_status = Some(FilingStatus::Delayed);
    vendor.months_not_filed = Some(3);
    vendor.director_companies = Some(12);
    vendor.address_type = Some(AddressType::Residential);

    let assessment = engine().assess(&vendor).expect("assessment");

    assert_eq!(assessment.risk_score.value(), 65);
    assert_eq!(assessment.risk_level, RiskLevel::Medium);
    assert_eq!(
        assessment.recommended_actions,
        vec!["Issue filing-risk notice: GSTR-3B not filed for 3 months".to_string()]
    );
    assert_eq!(
        assessment.breaches,
        vec!["Filing lapse of 3 months exceeds the 2-month grace period".to_string()]
    );
}

#[test]
fn registry_and_ledger_signals_raise_breaches_but_not_points() {
    let mut vendor = established_vendor();
    vendor.registration_status = Some(RegistrationStatus::Suspended);
    vendor.insolvency_status = Some(InsolvencyStatus::UnderCirp);
    vendor.transaction_count = Some(0);
    vendor.itc_amount = Some(Decimal::from(2_500));

    let assessment = engine().assess(&vendor).expect("assessment");

    assert_eq!(
        assessment.breaches,
        vec![
            "GST registration suspended".to_string(),
            "Insolvency proceedings (CIRP) in progress".to_string(),
            "ITC claimed without supporting transactions".to_string(),
        ]
    );
    // only the ledger rules contribute
    assert_eq!(assessment.risk_score.value(), 20);
}

#[test]
fn cancelled_registration_is_reported_in_lowercase() {
    let mut vendor = established_vendor();
    vendor.registration_status = Some(RegistrationStatus::Cancelled);

    let breaches = engine().breaches(&vendor).expect("breaches");
    assert_eq!(breaches, vec!["GST registration cancelled".to_string()]);
}

#[test]
fn clear_insolvency_and_active_registration_are_silent() {
    let mut vendor = established_vendor();
    vendor.registration_status = Some(RegistrationStatus::Active);
    vendor.insolvency_status = Some(InsolvencyStatus::Clear);

    assert!(engine().breaches(&vendor).expect("breaches").is_empty());
}

#[test]
fn payment_block_follows_score_not_indicator_count() {
    let mut vendor = established_vendor();
    vendor.registration_days = Some(100);
    vendor.gstr3b_status = Some(FilingStatus::NotFiled);
    vendor.months_not_filed = Some(1);
    vendor.director_companies = Some(30);
    vendor.address_type = Some(AddressType::Virtual);
    vendor.transaction_count = Some(2);
    vendor.itc_amount = Some(Decimal::from(900_000));

    // 30 + 25 + 15 + 15 + 5
    let assessment = engine().assess(&vendor).expect("assessment");
    assert_eq!(assessment.risk_score.value(), 90);
    assert_eq!(assessment.recommended_actions[0], PAYMENT_BLOCK_ACTION);
    assert!(!assessment
        .recommended_actions
        .iter()
        .any(|action| action.starts_with("Issue filing-risk notice")));
}
