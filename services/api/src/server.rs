use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAccountStore, InMemoryVendorRepository};
use crate::routes::platform_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use bloodhound::accounts::{IdentityService, SessionRegistry};
use bloodhound::config::AppConfig;
use bloodhound::error::AppError;
use bloodhound::telemetry;
use bloodhound::workflows::registry::SyntheticRegistry;
use bloodhound::workflows::vendors::{VendorApiState, VendorService};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let scoring = config.risk.scoring_config()?;
    let registry = match config.risk.registry_seed {
        Some(seed) => SyntheticRegistry::seeded(seed),
        None => SyntheticRegistry::new(),
    };

    let vendor_service = Arc::new(VendorService::new(
        Arc::new(InMemoryVendorRepository::default()),
        scoring,
    ));
    let identity = IdentityService::new(Arc::new(InMemoryAccountStore::default()));
    let vendors = VendorApiState {
        service: vendor_service,
        sessions: Arc::new(SessionRegistry::new()),
        registry: Arc::new(registry),
    };

    let app = platform_router(vendors, identity)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        registry_seed = ?config.risk.registry_seed,
        "vendor risk service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
