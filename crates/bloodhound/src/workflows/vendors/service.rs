use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{Gstin, RiskLevel, VendorAttributes, VendorRecord, Watchlist};
use super::provider::{DataProvider, DataSource, ProviderError};
use super::repository::{RepositoryError, VendorRepository, VendorRiskView};
use super::scoring::{BatchOutcome, RecordFailure, RiskEngine, ScoringConfig};
use super::validation::{parse_gstin, EngineError};

/// Number of vendors listed in the portfolio's top-risk table.
pub const TOP_RISK_LIMIT: usize = 5;

/// Service composing the vendor store with the risk engine.
pub struct VendorService<R> {
    repository: Arc<R>,
    engine: Arc<RiskEngine>,
}

impl<R> VendorService<R>
where
    R: VendorRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: ScoringConfig) -> Self {
        Self {
            repository,
            engine: Arc::new(RiskEngine::new(config)),
        }
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Upsert a single vendor. The merged record must score, otherwise nothing
    /// is written and the engine error is returned.
    pub fn submit(&self, attributes: VendorAttributes) -> Result<VendorRecord, VendorServiceError> {
        let gstin = parse_gstin(&attributes)?;
        let existing = self.repository.fetch(&gstin)?;
        let created = existing.is_none();

        let mut record = existing.unwrap_or_default();
        record
            .attributes
            .merge(attributes, DataSource::Manual.merge_mode())
            .map_err(EngineError::from)?;
        record.attributes.gstin = Some(gstin.to_string());

        let level = self.engine.rescore(&mut record)?;
        self.store(record.clone(), created)?;

        info!(%gstin, risk_level = level.label(), created, "vendor submitted");
        Ok(record)
    }

    /// Pull a batch from `provider` and fold it into the store.
    ///
    /// Records that fail validation are still stored (without an assessment)
    /// when they carry a usable GSTIN, and every failure is reported. An update
    /// whose ledger totals would overflow is reported and not applied.
    pub fn ingest<P>(&self, provider: &P) -> Result<IngestReport, VendorServiceError>
    where
        P: DataProvider + ?Sized,
    {
        let source = provider.source();
        let batch = provider.fetch()?;
        let mode = source.merge_mode();

        let mut report = IngestReport {
            source,
            received: batch.len(),
            created: 0,
            updated: 0,
            scored: 0,
            failures: Vec::new(),
        };

        for (index, attributes) in batch.into_iter().enumerate() {
            let gstin = match parse_gstin(&attributes) {
                Ok(gstin) => gstin,
                Err(error) => {
                    warn!(index, source = source.label(), %error, "vendor row has no usable GSTIN");
                    report
                        .failures
                        .push(RecordFailure::new(index, &attributes, error));
                    continue;
                }
            };

            let existing = self.repository.fetch(&gstin)?;
            let created = existing.is_none();
            let mut record = existing.unwrap_or_default();
            record.attributes.gstin = Some(gstin.to_string());
            if let Err(error) = record.attributes.merge(attributes, mode) {
                let error = EngineError::from(error);
                warn!(%gstin, field = error.field(), %error, "vendor update rejected");
                report
                    .failures
                    .push(RecordFailure::new(index, &record.attributes, error));
                continue;
            }
            record.attributes.gstin = Some(gstin.to_string());

            match self.engine.rescore(&mut record) {
                Ok(_) => report.scored += 1,
                Err(error) => {
                    warn!(%gstin, field = error.field(), %error, "vendor could not be scored");
                    report
                        .failures
                        .push(RecordFailure::new(index, &record.attributes, error));
                }
            }

            self.store(record, created)?;
            if created {
                report.created += 1;
            } else {
                report.updated += 1;
            }
        }

        info!(
            source = source.label(),
            received = report.received,
            created = report.created,
            updated = report.updated,
            failed = report.failures.len(),
            "vendor batch ingested"
        );
        Ok(report)
    }

    /// Recompute every stored assessment, writing each record once.
    pub fn rescore_all(&self) -> Result<BatchOutcome, VendorServiceError> {
        let mut records = self.repository.all()?;
        let outcome = self.engine.rescore_batch(&mut records);
        for record in records {
            self.repository.update(record)?;
        }

        info!(
            scored = outcome.scored,
            failed = outcome.failures.len(),
            "vendor portfolio rescored"
        );
        Ok(outcome)
    }

    pub fn get(&self, gstin: &Gstin) -> Result<VendorRecord, VendorServiceError> {
        let record = self
            .repository
            .fetch(gstin)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn list(&self) -> Result<Vec<VendorRecord>, VendorServiceError> {
        Ok(self.repository.all()?)
    }

    /// Stored records for the watched GSTINs; entries with no record are skipped.
    pub fn watched(&self, watchlist: &Watchlist) -> Result<Vec<VendorRecord>, VendorServiceError> {
        let mut records = Vec::with_capacity(watchlist.len());
        for gstin in watchlist.iter() {
            if let Some(record) = self.repository.fetch(gstin)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    pub fn portfolio(&self) -> Result<PortfolioSummary, VendorServiceError> {
        let records = self.repository.all()?;
        Ok(PortfolioSummary::from_records(&records))
    }

    fn store(&self, record: VendorRecord, created: bool) -> Result<(), RepositoryError> {
        if created {
            self.repository.insert(record).map(|_| ())
        } else {
            self.repository.update(record)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub source: DataSource,
    pub received: usize,
    pub created: usize,
    pub updated: usize,
    pub scored: usize,
    pub failures: Vec<RecordFailure>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }

    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Critical => self.critical,
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}

/// Dashboard roll-up over a set of vendor records.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub total_vendors: usize,
    pub unscored: usize,
    pub tiers: TierCounts,
    /// Input tax credit held with High or Critical vendors.
    pub itc_at_risk: Decimal,
    pub vendors_with_breaches: usize,
    pub top_risks: Vec<VendorRiskView>,
}

impl PortfolioSummary {
    pub fn from_records(records: &[VendorRecord]) -> Self {
        let mut tiers = TierCounts::default();
        let mut unscored = 0;
        let mut itc_at_risk = Decimal::ZERO;
        let mut vendors_with_breaches = 0;

        for record in records {
            let Some(level) = record.risk_level() else {
                unscored += 1;
                continue;
            };
            tiers.record(level);
            if level >= RiskLevel::High {
                let itc = record.attributes.itc_amount.unwrap_or(Decimal::ZERO);
                // saturates at Decimal::MAX
                itc_at_risk = itc_at_risk.checked_add(itc).unwrap_or(Decimal::MAX);
            }
            if !record.breaches().is_empty() {
                vendors_with_breaches += 1;
            }
        }

        let mut ranked: Vec<&VendorRecord> = records
            .iter()
            .filter(|record| record.risk_score().is_some())
            .collect();
        ranked.sort_by(|left, right| right.risk_score().cmp(&left.risk_score()));

        Self {
            total_vendors: records.len(),
            unscored,
            tiers,
            itc_at_risk,
            vendors_with_breaches,
            top_risks: ranked
                .into_iter()
                .take(TOP_RISK_LIMIT)
                .map(VendorRecord::status_view)
                .collect(),
        }
    }
}

/// Error raised by the vendor service.
#[derive(Debug, thiserror::Error)]
pub enum VendorServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
