use bloodhound::accounts::{Account, AccountStore, AccountStoreError};
use bloodhound::workflows::vendors::{Gstin, RepositoryError, VendorRecord, VendorRepository};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Vendor records keyed by GSTIN; iteration order is GSTIN order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryVendorRepository {
    records: Arc<Mutex<BTreeMap<Gstin, VendorRecord>>>,
}

impl VendorRepository for InMemoryVendorRepository {
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

/// Accounts keyed by normalized email.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAccountStore {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
}

impl AccountStore for InMemoryAccountStore {
    fn insert(&self, account: Account) -> Result<Account, AccountStoreError> {
        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        if guard.contains_key(&account.email) {
            return Err(AccountStoreError::DuplicateEmail);
        }
        if let Some(profile) = &account.ca_profile {
            let taken = guard.values().any(|existing| {
                existing
                    .ca_profile
                    .as_ref()
                    .is_some_and(|other| other.membership_no == profile.membership_no)
            });
            if taken {
                return Err(AccountStoreError::DuplicateMembership);
            }
        }
        guard.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    fn update(&self, account: Account) -> Result<(), AccountStoreError> {
        let mut guard = self.accounts.lock().expect("account mutex poisoned");
        match guard.get_mut(&account.email) {
            Some(slot) => {
                *slot = account;
                Ok(())
            }
            None => Err(AccountStoreError::NotFound),
        }
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        Ok(guard.get(email).cloned())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
