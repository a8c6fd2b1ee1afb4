use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use tracing::{info, warn};

use super::domain::{Account, AccountId, AuthSession, CaProfile, EntityId, Role, SignupRequest};
use super::store::{AccountStore, AccountStoreError};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const SALT_LEN: usize = 16;

static ACCOUNT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ENTITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Signup and signin over an account store.
pub struct IdentityService<S> {
    store: Arc<S>,
    hasher: Argon2<'static>,
}

impl<S> IdentityService<S>
where
    S: AccountStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            hasher: Argon2::default(),
        }
    }

    pub fn signup(&self, request: SignupRequest) -> Result<Account, AccountError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || !email.contains('@') {
            return Err(AccountError::InvalidEmail);
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        let full_name = required_text(Some(&request.full_name), "full_name")?;

        let (ca_profile, entity_id) = match request.role {
            Role::Ca => {
                let firm_name = required_text(request.firm_name.as_deref(), "firm_name")?;
                let membership_no =
                    required_text(request.membership_no.as_deref(), "membership_no")?;
                let profile = CaProfile {
                    firm_name,
                    membership_no,
                    invite_code: generate_invite_code(),
                };
                (Some(profile), None)
            }
            Role::Client => {
                let id = ENTITY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
                (None, Some(EntityId(id)))
            }
        };

        let account = Account {
            id: AccountId(ACCOUNT_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            email,
            password_hash: self.hash_password(&request.password)?,
            full_name,
            role: request.role,
            company_name: request
                .company_name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            entity_id,
            ca_profile,
            active: true,
            created_at: Utc::now(),
            last_login: None,
        };

        let stored = self.store.insert(account)?;
        info!(account_id = stored.id.0, role = ?stored.role, "account created");
        Ok(stored)
    }

    /// Verify credentials and stamp `last_login`.
    pub fn signin(&self, email: &str, password: &str) -> Result<AuthSession, AccountError> {
        let email = normalize_email(email);
        let mut account = self
            .store
            .find_by_email(&email)?
            .ok_or(AccountError::EmailNotFound)?;

        if !account.active {
            return Err(AccountError::Deactivated);
        }

        if !self.verify_password(password, &account.password_hash)? {
            warn!(account_id = account.id.0, "rejected signin with incorrect password");
            return Err(AccountError::IncorrectPassword);
        }

        account.last_login = Some(Utc::now());
        let session = AuthSession::from(&account);
        self.store.update(account)?;
        Ok(session)
    }

    fn hash_password(&self, password: &str) -> Result<String, AccountError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|err| AccountError::Hashing(err.to_string()))?;
        let hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| AccountError::Hashing(err.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, stored: &str) -> Result<bool, AccountError> {
        let parsed =
            PasswordHash::new(stored).map_err(|err| AccountError::Hashing(err.to_string()))?;
        Ok(self
            .hasher
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn required_text(value: Option<&str>, field: &'static str) -> Result<String, AccountError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(AccountError::MissingField { field })
}

/// `CA-` followed by eight upper-case hex digits.
pub fn generate_invite_code() -> String {
    let value: u32 = rand::thread_rng().gen();
    format!("CA-{value:08X}")
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least {min} characters.")]
    WeakPassword { min: usize },
    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },
    #[error("Email not found. Please sign up first.")]
    EmailNotFound,
    #[error("Account is deactivated. Contact support.")]
    Deactivated,
    #[error("Incorrect password.")]
    IncorrectPassword,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Store(#[from] AccountStoreError),
}
