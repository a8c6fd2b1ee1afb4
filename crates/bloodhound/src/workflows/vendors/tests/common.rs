use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::accounts::{AccountId, AuthSession, EntityId, Role, SessionRegistry};
use crate::workflows::registry::SyntheticRegistry;
use crate::workflows::vendors::domain::{
    AddressType, FilingStatus, Gstin, VendorAttributes, VendorRecord,
};
use crate::workflows::vendors::provider::{DataProvider, DataSource, ProviderError};
use crate::workflows::vendors::repository::{RepositoryError, VendorRepository};
use crate::workflows::vendors::scoring::{RiskEngine, ScoringConfig};
use crate::workflows::vendors::{vendor_router, VendorApiState, VendorService};

pub(super) const APEX_GSTIN: &str = "29AAACA1234C1Z2";
pub(super) const SHREE_GSTIN: &str = "27ABCDE1234F1Z5";
pub(super) const KAVERI_GSTIN: &str = "33AABCK1234L1Z9";

pub(super) fn gstin(raw: &str) -> Gstin {
    Gstin::parse(raw).expect("valid gstin")
}

pub(super) fn engine() -> RiskEngine {
    RiskEngine::new(ScoringConfig::default())
}

/// Registered three years ago, filing on time, broad ledger history.
pub(super) fn established_vendor() -> VendorAttributes {
    VendorAttributes {
        name: Some("Shree Ganesh Traders".to_string()),
        gstin: Some(SHREE_GSTIN.to_string()),
        registration_days: Some(1000),
        gstr3b_status: Some(FilingStatus::Filed),
        months_not_filed: Some(0),
        transaction_count: Some(200),
        itc_amount: Some(Decimal::from(100_000)),
        director_companies: Some(2),
        address_type: Some(AddressType::Commercial),
        ..VendorAttributes::default()
    }
}

/// Two weeks old but otherwise unremarkable.
pub(super) fn new_vendor() -> VendorAttributes {
    VendorAttributes {
        name: Some("Kaveri Textiles".to_string()),
        gstin: Some(KAVERI_GSTIN.to_string()),
        registration_days: Some(15),
        gstr3b_status: Some(FilingStatus::Filed),
        months_not_filed: Some(0),
        transaction_count: Some(10),
        itc_amount: Some(Decimal::from(50_000)),
        director_companies: Some(5),
        address_type: Some(AddressType::Commercial),
        ..VendorAttributes::default()
    }
}

/// Every high-weight indicator fires.
pub(super) fn shell_vendor() -> VendorAttributes {
    VendorAttributes {
        name: Some("Apex Components".to_string()),
        gstin: Some(APEX_GSTIN.to_string()),
        registration_days: Some(10),
        gstr3b_status: Some(FilingStatus::NotFiled),
        months_not_filed: Some(4),
        transaction_count: Some(3),
        itc_amount: Some(Decimal::from(800_000)),
        director_companies: Some(25),
        address_type: Some(AddressType::Virtual),
        ..VendorAttributes::default()
    }
}

pub(super) fn build_service() -> (VendorService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = VendorService::new(repository.clone(), ScoringConfig::default());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<BTreeMap<Gstin, VendorRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl VendorRepository for MemoryRepository {
    fn insert(&self, record: VendorRecord) -> Result<VendorRecord, RepositoryError> {
        let key = record.key().ok_or(RepositoryError::MissingKey)?;
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    fn update(&self, record: VendorRecord) -> Result<(), RepositoryError> {
        let key = record.key().ok_or(RepositoryError::MissingKey)?;
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        match guard.get_mut(&key) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, gstin: &Gstin) -> Result<Option<VendorRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(gstin).cloned())
    }

    fn all(&self) -> Result<Vec<VendorRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct ConflictRepository;

impl VendorRepository for ConflictRepository {
    fn insert(&self, _record: VendorRecord) -> Result<VendorRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: VendorRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _gstin: &Gstin) -> Result<Option<VendorRecord>, RepositoryError> {
        Ok(None)
    }

    fn all(&self) -> Result<Vec<VendorRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl VendorRepository for UnavailableRepository {
    fn insert(&self, _record: VendorRecord) -> Result<VendorRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: VendorRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _gstin: &Gstin) -> Result<Option<VendorRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<VendorRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Provider returning a canned batch.
pub(super) struct FixedProvider {
    pub(super) source: DataSource,
    pub(super) batch: Vec<VendorAttributes>,
}

impl FixedProvider {
    pub(super) fn new(source: DataSource, batch: Vec<VendorAttributes>) -> Self {
        Self { source, batch }
    }
}

impl DataProvider for FixedProvider {
    fn source(&self) -> DataSource {
        self.source
    }

    fn fetch(&self) -> Result<Vec<VendorAttributes>, ProviderError> {
        Ok(self.batch.clone())
    }
}

pub(super) struct OfflineProvider;

impl DataProvider for OfflineProvider {
    fn source(&self) -> DataSource {
        DataSource::SyntheticRegistry
    }

    fn fetch(&self) -> Result<Vec<VendorAttributes>, ProviderError> {
        Err(ProviderError::Unavailable("registry offline".to_string()))
    }
}

pub(super) fn registry() -> SyntheticRegistry {
    SyntheticRegistry::seeded(42).with_today(NaiveDate::from_ymd_opt(2025, 3, 15).expect("date"))
}

pub(super) struct ApiFixture<R> {
    pub(super) router: axum::Router,
    pub(super) sessions: Arc<SessionRegistry>,
    pub(super) service: Arc<VendorService<R>>,
    pub(super) client_token: String,
    pub(super) ca_token: String,
}

pub(super) fn api_fixture<R>(service: VendorService<R>) -> ApiFixture<R>
where
    R: VendorRepository + 'static,
{
    let sessions = Arc::new(SessionRegistry::new());
    let client_token = sessions.issue(AuthSession {
        account_id: AccountId(1),
        role: Role::Client,
        entity_id: Some(EntityId(1)),
    });
    let ca_token = sessions.issue(AuthSession {
        account_id: AccountId(2),
        role: Role::Ca,
        entity_id: None,
    });

    let service = Arc::new(service);
    let router = vendor_router(VendorApiState {
        service: service.clone(),
        sessions: sessions.clone(),
        registry: Arc::new(registry()),
    });

    ApiFixture {
        router,
        sessions,
        service,
        client_token,
        ca_token,
    }
}

pub(super) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
