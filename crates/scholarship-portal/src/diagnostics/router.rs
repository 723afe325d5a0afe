use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::egress::EgressIpResolver;
use super::probe::ConnectionProbe;
use super::service::DiagnosticsService;

/// Router exposing the connection test and egress IP endpoints.
pub fn diagnostics_router<P, E>(service: Arc<DiagnosticsService<P, E>>) -> Router
where
    P: ConnectionProbe + 'static,
    E: EgressIpResolver + 'static,
{
    Router::new()
        .route("/api/test/connection", get(connection_handler::<P, E>))
        .route("/api/test/egress-ip", get(egress_ip_handler::<P, E>))
        .with_state(service)
}

pub(crate) async fn connection_handler<P, E>(
    State(service): State<Arc<DiagnosticsService<P, E>>>,
) -> Response
where
    P: ConnectionProbe + 'static,
    E: EgressIpResolver + 'static,
{
    let report = service.check_connection().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

pub(crate) async fn egress_ip_handler<P, E>(
    State(service): State<Arc<DiagnosticsService<P, E>>>,
) -> Response
where
    P: ConnectionProbe + 'static,
    E: EgressIpResolver + 'static,
{
    let report = service.egress_ip().await;
    let status = if report.ip.is_some() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(report)).into_response()
}
