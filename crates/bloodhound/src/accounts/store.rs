use super::domain::Account;

/// Persistence contract for user accounts.
pub trait AccountStore: Send + Sync {
    /// Fails with `DuplicateEmail` or `DuplicateMembership` when a unique
    /// field is already taken.
    fn insert(&self, account: Account) -> Result<Account, AccountStoreError>;
    fn update(&self, account: Account) -> Result<(), AccountStoreError>;
    fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AccountStoreError {
    #[error("Email already registered. Please login.")]
    DuplicateEmail,
    #[error("CA Membership number already registered.")]
    DuplicateMembership,
    #[error("account not found")]
    NotFound,
    #[error("account store unavailable: {0}")]
    Unavailable(String),
}
