//! Signup, signin, and bearer sessions for clients and chartered accountants.

pub mod domain;
pub mod router;
pub mod service;
pub mod session;
pub mod store;


pub use domain::{
    Account, AccountId, AuthSession, CaProfile, EntityId, LoginRequest, Role, SignupRequest,
};
pub use router::{account_router, bearer_token};
pub use service::{generate_invite_code, AccountError, IdentityService, MIN_PASSWORD_LENGTH};
pub use session::SessionRegistry;
pub use store::{AccountStore, AccountStoreError};
