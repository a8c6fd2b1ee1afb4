use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;

use super::domain::{Gstin, VendorAttributes, VendorRecord};
use super::repository::{RepositoryError, VendorRepository, VendorRiskView};
use super::service::{PortfolioSummary, VendorService, VendorServiceError};
use crate::accounts::{bearer_token, AuthSession, Role, SessionRegistry};
use crate::workflows::ledger::CsvLedgerImport;
use crate::workflows::registry::SyntheticRegistry;

/// Shared handler state; every vendor route requires a session.
pub struct VendorApiState<R> {
    pub service: Arc<VendorService<R>>,
    pub sessions: Arc<SessionRegistry>,
    pub registry: Arc<SyntheticRegistry>,
}

impl<R> Clone for VendorApiState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: Arc::clone(&self.sessions),
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Router builder exposing vendor intake, scoring, dashboard, and watchlist endpoints.
pub fn vendor_router<R>(state: VendorApiState<R>) -> Router
where
    R: VendorRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/vendors",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route("/api/v1/vendors/import", post(import_handler::<R>))
        .route("/api/v1/vendors/rescore", post(rescore_handler::<R>))
        .route("/api/v1/vendors/:gstin", get(vendor_handler::<R>))
        .route("/api/v1/vendors/:gstin/checks", post(checks_handler::<R>))
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .route("/api/v1/watchlist", get(watchlist_handler::<R>))
        .route(
            "/api/v1/watchlist/:gstin",
            put(watch_handler::<R>).delete(unwatch_handler::<R>),
        )
        .with_state(state)
}

struct Authorized {
    token: String,
    session: AuthSession,
}

fn authorize<R>(state: &VendorApiState<R>, headers: &HeaderMap) -> Result<Authorized, Response> {
    let token = bearer_token(headers).ok_or_else(|| {
        error_response(StatusCode::UNAUTHORIZED, "missing bearer token".to_string())
    })?;
    let session = state.sessions.resolve(token).ok_or_else(unknown_session)?;
    Ok(Authorized {
        token: token.to_string(),
        session,
    })
}

fn unknown_session() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "unknown session".to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

fn parse_path_gstin(raw: &str) -> Result<Gstin, Response> {
    Gstin::parse(raw).map_err(|err| {
        let payload = json!({
            "error": format!("invalid GSTIN '{raw}': {err}"),
            "field": "gstin",
        });
        (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
    })
}

fn service_error_response(error: VendorServiceError) -> Response {
    match error {
        VendorServiceError::Engine(error) => {
            let payload = json!({
                "error": error.to_string(),
                "field": error.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        VendorServiceError::Provider(error) => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        VendorServiceError::Repository(RepositoryError::Conflict) => {
            error_response(StatusCode::CONFLICT, "vendor already exists".to_string())
        }
        VendorServiceError::Repository(RepositoryError::NotFound) => {
            error_response(StatusCode::NOT_FOUND, "vendor not found".to_string())
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn views(records: &[VendorRecord]) -> Vec<VendorRiskView> {
    records.iter().map(VendorRecord::status_view).collect()
}

pub(crate) async fn submit_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
    axum::Json(attributes): axum::Json<VendorAttributes>,
) -> Response
where
    R: VendorRepository + 'static,
{
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match state.service.submit(attributes) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: VendorRepository + 'static,
{
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match state.service.list() {
        Ok(records) => (StatusCode::OK, axum::Json(views(&records))).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn vendor_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
    Path(gstin): Path<String>,
) -> Response
where
    R: VendorRepository + 'static,
{
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let gstin = match parse_path_gstin(&gstin) {
        Ok(gstin) => gstin,
        Err(response) => return response,
    };

    match state.service.get(&gstin) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(error) => service_error_response(error),
    }
}

/// Body is the raw CSV export.
pub(crate) async fn import_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
    body: String,
) -> Response
where
    R: VendorRepository + 'static,
{
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let import = match CsvLedgerImport::from_bytes(body.as_bytes()) {
        Ok(import) => import,
        Err(error) => return service_error_response(error.into()),
    };

    match state.service.ingest(&import) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => service_error_response(error),
    }
}

/// Run the registry checks for one GSTIN and fold the result into the store.
pub(crate) async fn checks_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
    Path(gstin): Path<String>,
) -> Response
where
    R: VendorRepository + 'static,
{
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }
    let gstin = match parse_path_gstin(&gstin) {
        Ok(gstin) => gstin,
        Err(response) => return response,
    };

    let lookup = state.registry.lookup(std::slice::from_ref(&gstin));
    let ingest = match state.service.ingest(&lookup) {
        Ok(report) => report,
        Err(error) => return service_error_response(error),
    };
    let vendor = match state.service.get(&gstin) {
        Ok(record) => record.status_view(),
        Err(error) => return service_error_response(error),
    };

    let payload = json!({
        "checks": lookup.reports().first(),
        "ingest": ingest,
        "vendor": vendor,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn rescore_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: VendorRepository + 'static,
{
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    match state.service.rescore_all() {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => service_error_response(error),
    }
}

/// Clients get their headline exposure; chartered accountants also get a
/// roll-up of the vendors they are watching.
pub(crate) async fn dashboard_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: VendorRepository + 'static,
{
    let authorized = match authorize(&state, &headers) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };

    let portfolio = match state.service.portfolio() {
        Ok(portfolio) => portfolio,
        Err(error) => return service_error_response(error),
    };

    let payload = match authorized.session.role {
        Role::Client => json!({
            "role": authorized.session.role,
            "total_vendors": portfolio.total_vendors,
            "critical_vendors": portfolio.tiers.critical,
            "high_risk_vendors": portfolio.tiers.high,
            "itc_at_risk": portfolio.itc_at_risk,
            "portfolio": portfolio,
        }),
        Role::Ca => {
            let watchlist = state
                .sessions
                .watchlist(&authorized.token)
                .unwrap_or_default();
            let watched = match state.service.watched(&watchlist) {
                Ok(records) => PortfolioSummary::from_records(&records),
                Err(error) => return service_error_response(error),
            };
            json!({
                "role": authorized.session.role,
                "portfolio": portfolio,
                "watchlist": watched,
            })
        }
    };

    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn watchlist_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: VendorRepository + 'static,
{
    let authorized = match authorize(&state, &headers) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };

    let watchlist = state
        .sessions
        .watchlist(&authorized.token)
        .unwrap_or_default();
    match state.service.watched(&watchlist) {
        Ok(records) => {
            let payload = json!({
                "entries": watchlist.iter().collect::<Vec<_>>(),
                "vendors": views(&records),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn watch_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
    Path(gstin): Path<String>,
) -> Response
where
    R: VendorRepository + 'static,
{
    let authorized = match authorize(&state, &headers) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };
    let gstin = match parse_path_gstin(&gstin) {
        Ok(gstin) => gstin,
        Err(response) => return response,
    };

    match state
        .sessions
        .update_watchlist(&authorized.token, |watchlist| watchlist.add(gstin.clone()))
    {
        Some(added) => {
            let status = if added {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, axum::Json(json!({ "watching": gstin }))).into_response()
        }
        None => unknown_session(),
    }
}

pub(crate) async fn unwatch_handler<R>(
    State(state): State<VendorApiState<R>>,
    headers: HeaderMap,
    Path(gstin): Path<String>,
) -> Response
where
    R: VendorRepository + 'static,
{
    let authorized = match authorize(&state, &headers) {
        Ok(authorized) => authorized,
        Err(response) => return response,
    };
    let gstin = match parse_path_gstin(&gstin) {
        Ok(gstin) => gstin,
        Err(response) => return response,
    };

    match state
        .sessions
        .update_watchlist(&authorized.token, |watchlist| watchlist.remove(&gstin))
    {
        Some(true) => StatusCode::NO_CONTENT.into_response(),
        Some(false) => error_response(
            StatusCode::NOT_FOUND,
            format!("{gstin} is not on the watchlist"),
        ),
        None => unknown_session(),
    }
}
