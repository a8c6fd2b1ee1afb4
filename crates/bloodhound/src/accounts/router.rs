use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::{LoginRequest, SignupRequest};
use super::service::{AccountError, IdentityService};
use super::session::SessionRegistry;
use super::store::{AccountStore, AccountStoreError};

pub struct AccountApiState<S> {
    pub identity: IdentityService<S>,
    pub sessions: Arc<SessionRegistry>,
}

/// Router builder exposing signup, login, and logout.
pub fn account_router<S>(identity: IdentityService<S>, sessions: Arc<SessionRegistry>) -> Router
where
    S: AccountStore + 'static,
{
    let state = Arc::new(AccountApiState { identity, sessions });
    Router::new()
        .route("/api/v1/auth/signup", post(signup_handler::<S>))
        .route("/api/v1/auth/login", post(login_handler::<S>))
        .route("/api/v1/auth/logout", post(logout_handler::<S>))
        .with_state(state)
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub(crate) async fn signup_handler<S>(
    State(state): State<Arc<AccountApiState<S>>>,
    axum::Json(request): axum::Json<SignupRequest>,
) -> Response
where
    S: AccountStore + 'static,
{
    // Argon2 runs on the blocking pool.
    let signup = tokio::task::spawn_blocking(move || state.identity.signup(request)).await;
    match signup {
        Ok(Ok(account)) => (StatusCode::CREATED, axum::Json(account)).into_response(),
        Ok(Err(error)) => error_response(error),
        Err(error) => worker_failure(error),
    }
}

pub(crate) async fn login_handler<S>(
    State(state): State<Arc<AccountApiState<S>>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    S: AccountStore + 'static,
{
    let worker = Arc::clone(&state);
    let signin = tokio::task::spawn_blocking(move || {
        worker.identity.signin(&request.email, &request.password)
    })
    .await;

    match signin {
        Ok(Ok(session)) => {
            let token = state.sessions.issue(session.clone());
            let payload = json!({
                "token": token,
                "session": session,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(Err(error)) => error_response(error),
        Err(error) => worker_failure(error),
    }
}

pub(crate) async fn logout_handler<S>(
    State(state): State<Arc<AccountApiState<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: AccountStore + 'static,
{
    match bearer_token(&headers) {
        Some(token) if state.sessions.revoke(token) => StatusCode::NO_CONTENT.into_response(),
        _ => {
            let payload = json!({ "error": "not signed in" });
            (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
        }
    }
}

fn worker_failure(error: tokio::task::JoinError) -> Response {
    tracing::error!(%error, "credential worker failed");
    let payload = json!({ "error": "credential check failed" });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

fn error_response(error: AccountError) -> Response {
    let status = match &error {
        AccountError::InvalidEmail
        | AccountError::WeakPassword { .. }
        | AccountError::MissingField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AccountError::Store(
            AccountStoreError::DuplicateEmail | AccountStoreError::DuplicateMembership,
        ) => StatusCode::CONFLICT,
        AccountError::EmailNotFound | AccountError::IncorrectPassword => StatusCode::UNAUTHORIZED,
        AccountError::Deactivated => StatusCode::FORBIDDEN,
        AccountError::Hashing(_) | AccountError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
