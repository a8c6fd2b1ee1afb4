use serde::Serialize;

use super::domain::{MergeMode, VendorAttributes};

/// Where a batch of vendor attributes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    SyntheticRegistry,
    FileIngestion,
    Manual,
}

impl DataSource {
    pub const fn label(self) -> &'static str {
        match self {
            DataSource::SyntheticRegistry => "synthetic registry",
            DataSource::FileIngestion => "file ingestion",
            DataSource::Manual => "manual entry",
        }
    }

    /// Ledger uploads add to what is already on file; other sources replace it.
    pub const fn merge_mode(self) -> MergeMode {
        match self {
            DataSource::FileIngestion => MergeMode::AccumulateLedger,
            DataSource::SyntheticRegistry | DataSource::Manual => MergeMode::Replace,
        }
    }
}

/// Producer of vendor attribute payloads consumed by the vendor service.
pub trait DataProvider {
    fn source(&self) -> DataSource;

    fn fetch(&self) -> Result<Vec<VendorAttributes>, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read vendor data: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse vendor data: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {reason}")]
    Row { line: u64, reason: String },
    #[error("data provider unavailable: {0}")]
    Unavailable(String),
}
