use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::review::domain::{ApplicationStatus, PageRequest};
use crate::workflows::review::router::{list_handler, ReviewerIdentity};
use crate::workflows::review::{review_router, ReviewService, REVIEWER_HEADER};

fn router_with(applications: Vec<crate::workflows::review::Application>) -> axum::Router {
    let (service, _, _) = build_service(applications);
    review_router(Arc::new(service))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(REVIEWER_HEADER, REVIEWER.0.to_string())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header(REVIEWER_HEADER, REVIEWER.0.to_string())
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn list_route_requires_reviewer_header() {
    let router = router_with(vec![application(1, ApplicationStatus::Submitted)]);

    let response = router
        .oneshot(
            Request::get("/api/reviewer/applications")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_route_applies_pagination_query() {
    let router = router_with(vec![
        application(1, ApplicationStatus::Submitted),
        application(2, ApplicationStatus::Submitted),
        application(3, ApplicationStatus::Submitted),
    ]);

    let response = router
        .oneshot(get_request("/api/reviewer/applications?page=2&limit=1"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["data"][0]["id"], 2);
}

#[tokio::test]
async fn list_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(ReviewService::new(
        Arc::new(UnavailableApplications),
        Arc::new(MemoryReviews::default()),
    ));

    let response = list_handler::<UnavailableApplications, MemoryReviews>(
        State(service),
        ReviewerIdentity(REVIEWER),
        axum::extract::Query(PageRequest::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn patch_route_records_decision() {
    let router = router_with(vec![application(1, ApplicationStatus::UnderReview)]);

    let response = router
        .oneshot(json_request(
            "PATCH",
            "/api/reviewer/applications/1",
            json!({ "status": "approved", "score": 93, "review_notes": "Outstanding record" }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["score"], 93);
    assert_eq!(body["review_notes"], "Outstanding record");
}

#[tokio::test]
async fn patch_route_maps_validation_errors() {
    let router = router_with(vec![
        application(1, ApplicationStatus::UnderReview),
        application(2, ApplicationStatus::Approved),
    ]);

    let missing_notes = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/reviewer/applications/1",
            json!({ "status": "approved", "review_notes": "" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(missing_notes.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let out_of_range = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/reviewer/applications/1",
            json!({ "status": "rejected", "score": 140 }),
        ))
        .await
        .expect("router responds");
    assert_eq!(out_of_range.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let terminal = router
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/reviewer/applications/2",
            json!({ "status": "rejected" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(terminal.status(), StatusCode::CONFLICT);

    let missing = router
        .oneshot(json_request(
            "PATCH",
            "/api/reviewer/applications/99",
            json!({ "status": "rejected" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn foreign_assignments_are_forbidden() {
    let mut foreign = application(5, ApplicationStatus::Submitted);
    foreign.assigned_reviewer = Some(OTHER_REVIEWER);
    let router = router_with(vec![foreign]);

    let response = router
        .oneshot(get_request("/api/reviewer/applications/5"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("not assigned"));
}

#[tokio::test]
async fn review_routes_create_and_list_records() {
    let router = router_with(vec![application(1, ApplicationStatus::Rejected)]);

    let created = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/reviews",
            json!({
                "application_id": 1,
                "overall_score": 35,
                "comments": null,
                "recommendation": "reject"
            }),
        ))
        .await
        .expect("router responds");
    assert_eq!(created.status(), StatusCode::CREATED);
    let review = read_json_body(created).await;
    assert_eq!(review["recommendation"], "reject");
    assert_eq!(review["reviewer_id"], REVIEWER.0);

    let listed = router
        .oneshot(get_request("/api/reviewer/applications/1/reviews"))
        .await
        .expect("router responds");
    assert_eq!(listed.status(), StatusCode::OK);
    let body = read_json_body(listed).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn stats_route_counts_statuses() {
    let router = router_with(vec![
        application(1, ApplicationStatus::Submitted),
        application(2, ApplicationStatus::Rejected),
    ]);

    let response = router
        .oneshot(get_request("/api/reviewer/stats"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["submitted"], 1);
    assert_eq!(body["rejected"], 1);
    assert_eq!(body["approved"], 0);
}

#[tokio::test]
async fn review_route_refuses_undecided_and_duplicate_reviews() {
    let router = router_with(vec![
        application(1, ApplicationStatus::UnderReview),
        application(2, ApplicationStatus::Approved),
    ]);
    let review = |id: u64| {
        json_request(
            "POST",
            "/api/reviews",
            json!({ "application_id": id, "overall_score": 80, "recommendation": "approve" }),
        )
    };

    let undecided = router
        .clone()
        .oneshot(review(1))
        .await
        .expect("router responds");
    assert_eq!(undecided.status(), StatusCode::CONFLICT);
    let body = read_json_body(undecided).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("under_review"));

    let first = router
        .clone()
        .oneshot(review(2))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::CREATED);

    let duplicate = router.clone().oneshot(review(2)).await.expect("router responds");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let listed = router
        .oneshot(get_request("/api/reviewer/applications/2/reviews"))
        .await
        .expect("router responds");
    let body = read_json_body(listed).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}
