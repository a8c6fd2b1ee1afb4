//! Purchase ledger import: CSV rows aggregated into per-vendor ledger totals.

mod normalizer;
mod parser;

pub use parser::LedgerEntry;

use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use rust_decimal::Decimal;
use tracing::info;

use crate::workflows::vendors::{DataProvider, DataSource, Gstin, ProviderError, VendorAttributes};

/// Validated ledger upload. Parsing happens up front, so a malformed file is
/// rejected before any vendor record is touched.
#[derive(Debug, Clone)]
pub struct CsvLedgerImport {
    entries: Vec<LedgerEntry>,
}

impl CsvLedgerImport {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ProviderError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProviderError> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProviderError> {
        let entries = parser::parse_entries(reader)?;
        info!(rows = entries.len(), "ledger file parsed");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// One record per GSTIN in first-seen order, carrying the row count and
    /// the summed tax as ITC. A per-vendor tax total that overflows fails on
    /// the row that pushed it over.
    pub fn aggregate(&self) -> Result<Vec<VendorAttributes>, ProviderError> {
        let mut positions: HashMap<Option<String>, usize> = HashMap::new();
        let mut vendors: Vec<VendorAttributes> = Vec::new();

        for entry in &self.entries {
            let key = entry.gstin.as_deref().map(|raw| {
                Gstin::parse(raw)
                    .map(String::from)
                    .unwrap_or_else(|_| raw.trim().to_ascii_uppercase())
            });

            let index = *positions.entry(key.clone()).or_insert_with(|| {
                vendors.push(VendorAttributes {
                    gstin: key,
                    transaction_count: Some(0),
                    itc_amount: Some(Decimal::ZERO),
                    ..VendorAttributes::default()
                });
                vendors.len() - 1
            });

            let vendor = &mut vendors[index];
            if vendor.name.is_none() {
                vendor.name = entry.vendor_name.clone();
            }
            vendor.transaction_count = vendor.transaction_count.map(|count| count + 1);
            let itc = vendor.itc_amount.unwrap_or(Decimal::ZERO);
            let total = itc.checked_add(entry.tax).ok_or_else(|| ProviderError::Row {
                line: entry.line,
                reason: format!(
                    "tax total for {} overflows",
                    vendor.gstin.as_deref().unwrap_or("rows without a GSTIN")
                ),
            })?;
            vendor.itc_amount = Some(total);
        }

        Ok(vendors)
    }
}

impl DataProvider for CsvLedgerImport {
    fn source(&self) -> DataSource {
        DataSource::FileIngestion
    }

    fn fetch(&self) -> Result<Vec<VendorAttributes>, ProviderError> {
        self.aggregate()
    }
}
