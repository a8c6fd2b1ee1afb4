use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Extension;
use axum::Json;
use bloodhound::accounts::{account_router, AccountStore, IdentityService};
use bloodhound::workflows::vendors::{vendor_router, VendorApiState, VendorRepository};
use serde_json::json;

/// Vendor and account APIs sharing one session registry, plus health checks.
pub(crate) fn platform_router<R, S>(
    vendors: VendorApiState<R>,
    identity: IdentityService<S>,
) -> axum::Router
where
    R: VendorRepository + 'static,
    S: AccountStore + 'static,
{
    let sessions = vendors.sessions.clone();
    vendor_router(vendors)
        .merge(account_router(identity, sessions))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
