use std::io::Read;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use super::normalizer::{normalize_header, normalize_name, parse_amount};
use crate::workflows::vendors::ProviderError;

/// One purchase ledger line after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub line: u64,
    pub vendor_name: Option<String>,
    pub gstin: Option<String>,
    pub amount: Decimal,
    pub tax: Decimal,
}

pub(crate) fn parse_entries<R: Read>(reader: R) -> Result<Vec<LedgerEntry>, ProviderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: csv::StringRecord = csv_reader.headers()?.iter().map(normalize_header).collect();
    csv_reader.set_headers(headers.clone());

    let mut entries = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line = record.position().map(|position| position.line()).unwrap_or(0);
        let row: LedgerRow = record.deserialize(Some(&headers))?;
        entries.push(row.into_entry(line)?);
    }

    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(
        rename = "vendor_name",
        alias = "name",
        alias = "vendor",
        alias = "party_name",
        alias = "supplier_name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    vendor_name: Option<String>,
    #[serde(
        rename = "gstin",
        alias = "gstin_uin",
        alias = "gst_no",
        alias = "gst_number",
        alias = "vendor_gstin",
        alias = "supplier_gstin",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    gstin: Option<String>,
    #[serde(
        rename = "transaction_amount",
        alias = "transaction_amount_inr",
        alias = "amount",
        alias = "amount_inr",
        alias = "invoice_amount",
        alias = "invoice_value",
        alias = "taxable_value",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    amount: Option<String>,
    #[serde(
        rename = "tax_amount",
        alias = "tax_amount_inr",
        alias = "tax",
        alias = "gst_amount",
        alias = "total_tax",
        alias = "itc",
        alias = "itc_amount",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    tax: Option<String>,
}

impl LedgerRow {
    fn into_entry(self, line: u64) -> Result<LedgerEntry, ProviderError> {
        let row_error = |reason: String| ProviderError::Row { line, reason };

        let amount = self
            .amount
            .as_deref()
            .ok_or_else(|| row_error("missing transaction amount".to_string()))
            .and_then(|raw| parse_amount(raw).map_err(row_error))?;
        let tax = self
            .tax
            .as_deref()
            .ok_or_else(|| row_error("missing tax amount".to_string()))
            .and_then(|raw| parse_amount(raw).map_err(row_error))?;

        if amount < Decimal::ZERO {
            return Err(row_error(format!("negative transaction amount {amount}")));
        }
        if tax < Decimal::ZERO {
            return Err(row_error(format!("negative tax amount {tax}")));
        }
        if tax > amount {
            return Err(row_error(format!(
                "tax amount {tax} exceeds transaction amount {amount}"
            )));
        }

        Ok(LedgerEntry {
            line,
            vendor_name: self.vendor_name.as_deref().map(normalize_name),
            gstin: self.gstin,
            amount,
            tax,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
