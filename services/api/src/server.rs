use crate::cli::ServeArgs;
use crate::infra::{
    seed_demo_applications, AppState, InMemoryApplicationRepository, InMemoryReviewRepository,
};
use crate::routes::portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scholarship_portal::config::{AppConfig, AppEnvironment};
use scholarship_portal::diagnostics::{
    DiagnosticsService, HttpEgressIpResolver, MySqlConnectionProbe,
};
use scholarship_portal::error::AppError;
use scholarship_portal::telemetry;
use scholarship_portal::workflows::review::ReviewService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let applications = Arc::new(InMemoryApplicationRepository::default());
    if config.environment == AppEnvironment::Development {
        match seed_demo_applications(applications.as_ref()) {
            Ok(count) => info!(count, "seeded demo applications"),
            Err(err) => warn!(error = %err, "failed to seed demo applications"),
        }
    }
    let review_service = Arc::new(ReviewService::new(
        applications,
        Arc::new(InMemoryReviewRepository::default()),
    ));

    let probe = Arc::new(MySqlConnectionProbe::new(&config.database));
    let egress = Arc::new(HttpEgressIpResolver::new(&config.egress)?);
    let diagnostics_service = Arc::new(DiagnosticsService::new(probe, egress));

    let app = portal_routes(review_service, diagnostics_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        db_host = %config.database.host,
        "scholarship portal api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
