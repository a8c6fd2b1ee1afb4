use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::vendors::{
    AddressType, FilingStatus, InsolvencyStatus, MsmeCategory, RegistrationStatus,
    VendorAttributes,
};

/// GST network registration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstnProfile {
    pub gstin: String,
    pub legal_name: String,
    pub trade_name: String,
    pub registration_date: NaiveDate,
    pub status: RegistrationStatus,
    pub taxpayer_type: String,
    pub address_type: AddressType,
    /// Return period (`YYYY-MM`) of the latest GSTR-3B, `None` when not filed.
    pub gstr3b_last_filed: Option<String>,
    pub months_not_filed: u32,
}

/// Ministry of Corporate Affairs view of the director behind a PAN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McaProfile {
    pub pan: String,
    pub director_name: String,
    pub total_companies: u32,
    pub active_companies: u32,
    pub dissolved_companies: u32,
    pub recent_incorporations: u32,
    pub flagged_entities: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsolvencyCheck {
    pub pan: String,
    pub insolvency_status: InsolvencyStatus,
    pub nclt_cases: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsmeCheck {
    pub gstin: String,
    pub udyam_registered: bool,
    pub msme_category: MsmeCategory,
}

/// Synthetic ledger figures used to seed demo portfolios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub transaction_count: u32,
    pub itc_amount: Decimal,
}

/// Combined result of every registry lookup for one GSTIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCheckReport {
    pub gstin_data: GstnProfile,
    pub mca_data: McaProfile,
    pub ibbi_data: InsolvencyCheck,
    pub udyam_data: MsmeCheck,
    pub pan_extracted: String,
    pub checked_on: NaiveDate,
}

impl RegistryCheckReport {
    pub fn registration_days(&self) -> i64 {
        (self.checked_on - self.gstin_data.registration_date).num_days()
    }

    /// Vendor attributes this report can vouch for. Ledger figures are left
    /// unset so stored transaction history is never overwritten.
    pub fn to_attributes(&self) -> VendorAttributes {
        let gstn = &self.gstin_data;
        let gstr3b_status = if gstn.gstr3b_last_filed.is_some() {
            FilingStatus::Filed
        } else {
            FilingStatus::NotFiled
        };

        VendorAttributes {
            name: Some(gstn.legal_name.clone()),
            gstin: Some(gstn.gstin.clone()),
            registration_days: Some(self.registration_days()),
            gstr3b_status: Some(gstr3b_status),
            months_not_filed: Some(i64::from(gstn.months_not_filed)),
            director_companies: Some(i64::from(self.mca_data.total_companies)),
            address_type: Some(gstn.address_type),
            registration_status: Some(gstn.status),
            insolvency_status: Some(self.ibbi_data.insolvency_status),
            msme_category: Some(self.udyam_data.msme_category),
            ..VendorAttributes::default()
        }
    }
}

impl LedgerSnapshot {
    pub fn apply(&self, attributes: &mut VendorAttributes) {
        attributes.transaction_count = Some(i64::from(self.transaction_count));
        attributes.itc_amount = Some(self.itc_amount);
    }
}
