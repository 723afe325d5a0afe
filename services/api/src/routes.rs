use crate::infra::AppState;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use scholarship_portal::diagnostics::{
    diagnostics_router, ConnectionProbe, DiagnosticsService, EgressIpResolver,
};
use scholarship_portal::workflows::review::{
    review_router, ApplicationRepository, ReviewRepository, ReviewService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn portal_routes<A, R, P, E>(
    reviews: Arc<ReviewService<A, R>>,
    diagnostics: Arc<DiagnosticsService<P, E>>,
) -> Router
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
    P: ConnectionProbe + 'static,
    E: EgressIpResolver + 'static,
{
    review_router(reviews)
        .merge(diagnostics_router(diagnostics))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/ping", get(ping_endpoint))
        .fallback(not_found)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    if ready {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn ping_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub(crate) async fn not_found(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "API endpoint not found" })),
        )
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryApplicationRepository, InMemoryReviewRepository};
    use axum::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use scholarship_portal::diagnostics::{ConnectionTarget, EgressError, ProbeError};
    use serde_json::Value;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    struct RefusingProbe(ConnectionTarget);

    #[async_trait]
    impl ConnectionProbe for RefusingProbe {
        fn target(&self) -> &ConnectionTarget {
            &self.0
        }

        async fn ping(&self) -> Result<(), ProbeError> {
            Err(ProbeError::Driver(
                "error communicating with database: Connection refused (os error 111)".to_string(),
            ))
        }
    }

    struct LoopbackEgress;

    #[async_trait]
    impl EgressIpResolver for LoopbackEgress {
        async fn resolve(&self) -> Result<IpAddr, EgressError> {
            Ok(IpAddr::from([198, 51, 100, 7]))
        }
    }

    fn app(ready: bool) -> Router {
        let reviews = Arc::new(ReviewService::new(
            Arc::new(InMemoryApplicationRepository::default()),
            Arc::new(InMemoryReviewRepository::default()),
        ));
        let diagnostics = Arc::new(DiagnosticsService::new(
            Arc::new(RefusingProbe(ConnectionTarget {
                host: "db.internal".to_string(),
                port: 3306,
                user: "portal".to_string(),
                database: "scholarships".to_string(),
            })),
            Arc::new(LoopbackEgress),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(ready, Ordering::Release);

        portal_routes(reviews, diagnostics).layer(Extension(state))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Option<Value>) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).ok())
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let (status, body) = get(app(false), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.expect("json")["status"], "initializing");

        let (status, body) = get(app(true), "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.expect("json")["status"], "ready");
    }

    #[tokio::test]
    async fn ping_reports_running_server() {
        let (status, body) = get(app(true), "/api/ping").await;
        let body = body.expect("json");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Server is running");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn unknown_api_paths_return_json_not_found() {
        let (status, body) = get(app(true), "/api/does-not-exist").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.expect("json")["error"], "API endpoint not found");

        let (status, body) = get(app(true), "/favicon.ico").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn merged_routes_serve_diagnostics_and_reviews() {
        let (status, body) = get(app(true), "/api/test/connection").await;
        let body = body.expect("json");
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["kind"], "connection_refused");
        assert_eq!(body["results"]["database"]["host"], "db.internal");

        let (status, body) = get(app(true), "/api/test/egress-ip").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.expect("json")["ip"], "198.51.100.7");

        let (status, _) = get(app(true), "/api/reviewer/stats").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let (status, body) = get(app(true), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.expect("json")["status"], "ok");

        let (status, _) = get(app(true), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
    }
}
