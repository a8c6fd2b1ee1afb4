//! Synthetic stand-ins for the GSTN, MCA, IBBI, and Udyam lookups.
//!
//! Every value is drawn from a seedable RNG so demo portfolios and tests are
//! reproducible. Nothing here talks to a network.

mod profiles;

pub use profiles::{
    GstnProfile, InsolvencyCheck, LedgerSnapshot, McaProfile, MsmeCheck, RegistryCheckReport,
};

use std::sync::Mutex;

use chrono::{Duration, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::debug;

use crate::workflows::vendors::{
    AddressType, DataProvider, DataSource, Gstin, InsolvencyStatus, MsmeCategory,
    ProviderError, RegistrationStatus, VendorAttributes,
};

/// PAN used when an identifier is too short to carry one.
pub const FALLBACK_PAN: &str = "ABCDE1234F";

const STATUS_DRAW: [RegistrationStatus; 5] = [
    RegistrationStatus::Active,
    RegistrationStatus::Active,
    RegistrationStatus::Active,
    RegistrationStatus::Suspended,
    RegistrationStatus::Cancelled,
];

const ADDRESS_DRAW: [AddressType; 7] = [
    AddressType::Commercial,
    AddressType::Commercial,
    AddressType::Commercial,
    AddressType::Industrial,
    AddressType::Industrial,
    AddressType::Residential,
    AddressType::Virtual,
];

const TRADE_NAMES: [&str; 8] = [
    "Shree Ganesh Traders",
    "Apex Components",
    "Sai Logistics",
    "Kaveri Textiles",
    "Bharat Steel Works",
    "Nilgiri Agro Foods",
    "Orbit Electricals",
    "Sagar Packaging",
];

/// Characters 3-12 of a GSTIN, upper-cased.
pub fn extract_pan(gstin: &str) -> String {
    if gstin.chars().count() >= 15 {
        gstin.chars().skip(2).take(10).collect::<String>().to_uppercase()
    } else {
        FALLBACK_PAN.to_string()
    }
}

/// Mock registry lookups backed by one shared RNG.
pub struct SyntheticRegistry {
    rng: Mutex<StdRng>,
    today: NaiveDate,
    portfolio: Vec<Gstin>,
    fabricate_ledger: bool,
}

impl Default for SyntheticRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticRegistry {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            today: Utc::now().date_naive(),
            portfolio: Vec::new(),
            fabricate_ledger: false,
        }
    }

    /// Date the lookups are evaluated against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// GSTINs returned by [`DataProvider::fetch`].
    pub fn with_gstins(mut self, gstins: Vec<Gstin>) -> Self {
        self.portfolio = gstins;
        self
    }

    /// Generate `count` random GSTINs for the provider portfolio.
    pub fn with_generated_portfolio(mut self, count: usize) -> Self {
        self.portfolio = self.generate_gstins(count);
        self
    }

    /// Also fabricate transaction counts and ITC for the provider portfolio.
    pub fn with_ledger(mut self) -> Self {
        self.fabricate_ledger = true;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn portfolio(&self) -> &[Gstin] {
        &self.portfolio
    }

    fn draw<T>(&self, draw: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.rng.lock().expect("registry rng mutex poisoned");
        draw(&mut *guard)
    }

    pub fn fetch_gstn(&self, gstin: &Gstin) -> GstnProfile {
        let (age_days, status, address_type, name_index, lapse) = self.draw(|rng| {
            (
                rng.gen_range(10..=1500i64),
                *STATUS_DRAW.choose(rng).unwrap_or(&RegistrationStatus::Active),
                *ADDRESS_DRAW.choose(rng).unwrap_or(&AddressType::Commercial),
                rng.gen_range(0..TRADE_NAMES.len()),
                rng.gen_range(1..=6u32),
            )
        });

        let registration_date = self.today - Duration::days(age_days);
        let prefix = &gstin.as_str()[..4];
        let trade_name = format!("{} {prefix}", TRADE_NAMES[name_index]);

        let (gstr3b_last_filed, months_not_filed) = match status {
            RegistrationStatus::Active => (self.last_period(), 0),
            RegistrationStatus::Suspended | RegistrationStatus::Cancelled => (None, lapse),
        };

        GstnProfile {
            gstin: gstin.to_string(),
            legal_name: format!("{trade_name} Pvt Ltd"),
            trade_name,
            registration_date,
            status,
            taxpayer_type: "Regular".to_string(),
            address_type,
            gstr3b_last_filed,
            months_not_filed,
        }
    }

    fn last_period(&self) -> Option<String> {
        self.today
            .checked_sub_months(Months::new(1))
            .map(|date| date.format("%Y-%m").to_string())
    }

    pub fn fetch_mca(&self, pan: &str) -> McaProfile {
        let (total, inactive, dissolved, recent) = self.draw(|rng| {
            (
                rng.gen_range(1..=25u32),
                rng.gen_range(0..=2u32),
                rng.gen_range(0..=2u32),
                rng.gen_range(0..=1u32),
            )
        });

        McaProfile {
            pan: pan.to_string(),
            director_name: format!("Director {}", &pan[..pan.len().min(4)]),
            total_companies: total,
            active_companies: total.saturating_sub(inactive),
            dissolved_companies: dissolved,
            recent_incorporations: recent,
            flagged_entities: if total > 20 { 2 } else { 0 },
        }
    }

    /// One in five PANs comes back under insolvency resolution.
    pub fn fetch_ibbi(&self, pan: &str) -> InsolvencyCheck {
        let under_cirp = self.draw(|rng| rng.gen_bool(0.2));
        InsolvencyCheck {
            pan: pan.to_string(),
            insolvency_status: if under_cirp {
                InsolvencyStatus::UnderCirp
            } else {
                InsolvencyStatus::Clear
            },
            nclt_cases: u32::from(under_cirp),
        }
    }

    pub fn fetch_udyam(&self, gstin: &Gstin) -> MsmeCheck {
        let category = self.draw(|rng| {
            *[MsmeCategory::Micro, MsmeCategory::Small, MsmeCategory::Medium]
                .choose(rng)
                .unwrap_or(&MsmeCategory::Micro)
        });
        MsmeCheck {
            gstin: gstin.to_string(),
            udyam_registered: true,
            msme_category: category,
        }
    }

    pub fn run_all_checks(&self, gstin: &Gstin) -> RegistryCheckReport {
        let pan = extract_pan(gstin.as_str());
        let report = RegistryCheckReport {
            gstin_data: self.fetch_gstn(gstin),
            mca_data: self.fetch_mca(&pan),
            ibbi_data: self.fetch_ibbi(&pan),
            udyam_data: self.fetch_udyam(gstin),
            pan_extracted: pan,
            checked_on: self.today,
        };
        debug!(%gstin, status = report.gstin_data.status.label(), "registry checks complete");
        report
    }

    /// Small portfolios skew towards thin histories so every tier shows up.
    pub fn synthesize_ledger(&self) -> LedgerSnapshot {
        self.draw(|rng| {
            let transaction_count: u32 = if rng.gen_bool(0.25) {
                rng.gen_range(1..=4)
            } else {
                rng.gen_range(5..=250)
            };
            let ticket: u32 = rng.gen_range(5_000..=180_000);
            LedgerSnapshot {
                transaction_count,
                itc_amount: Decimal::from(u64::from(transaction_count) * u64::from(ticket)),
            }
        })
    }

    pub fn generate_gstins(&self, count: usize) -> Vec<Gstin> {
        const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

        let mut gstins = Vec::with_capacity(count);
        while gstins.len() < count {
            let raw = self.draw(|rng| {
                let mut raw = format!("{:02}", rng.gen_range(1..=37));
                for _ in 0..5 {
                    raw.push(char::from(LETTERS[rng.gen_range(0..LETTERS.len())]));
                }
                raw.push_str(&format!("{:04}", rng.gen_range(0..10_000)));
                raw.push(char::from(LETTERS[rng.gen_range(0..LETTERS.len())]));
                raw.push(char::from(b'0' + rng.gen_range(1..=9u8)));
                raw.push('Z');
                raw.push(char::from(
                    ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())],
                ));
                raw
            });
            if let Ok(gstin) = Gstin::parse(&raw) {
                gstins.push(gstin);
            }
        }
        gstins
    }

    /// Run the checks for `gstins` now and expose the results as a provider
    /// that never fabricates ledger data.
    pub fn lookup(&self, gstins: &[Gstin]) -> RegistryLookup {
        RegistryLookup {
            reports: gstins.iter().map(|gstin| self.run_all_checks(gstin)).collect(),
        }
    }
}

impl DataProvider for SyntheticRegistry {
    fn source(&self) -> DataSource {
        DataSource::SyntheticRegistry
    }

    fn fetch(&self) -> Result<Vec<VendorAttributes>, ProviderError> {
        Ok(self
            .portfolio
            .iter()
            .map(|gstin| {
                let mut attributes = self.run_all_checks(gstin).to_attributes();
                if self.fabricate_ledger {
                    self.synthesize_ledger().apply(&mut attributes);
                }
                attributes
            })
            .collect())
    }
}

/// Completed registry checks, replayable as a data provider.
pub struct RegistryLookup {
    reports: Vec<RegistryCheckReport>,
}

impl RegistryLookup {
    pub fn reports(&self) -> &[RegistryCheckReport] {
        &self.reports
    }
}

impl DataProvider for RegistryLookup {
    fn source(&self) -> DataSource {
        DataSource::SyntheticRegistry
    }

    fn fetch(&self) -> Result<Vec<VendorAttributes>, ProviderError> {
        Ok(self
            .reports
            .iter()
            .map(RegistryCheckReport::to_attributes)
            .collect())
    }
}
