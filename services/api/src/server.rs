use crate::cli::ServeArgs;
use crate::infra::{AppState, SummaryNotifier};
use crate::routes::with_occupancy_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use lettings::config::AppConfig;
use lettings::error::AppError;
use lettings::occupancy::{AssignmentEngine, InMemoryStore};
use lettings::telemetry;
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

    let store = Arc::new(InMemoryStore::new());
    let notifier = Arc::new(SummaryNotifier::new(store.clone()));
    let engine = Arc::new(AssignmentEngine::new(
        store,
        notifier,
        config.assignment_policy,
    ));

    let app = with_occupancy_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tenancy assignment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
