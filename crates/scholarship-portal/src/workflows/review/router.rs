use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::{ApplicationId, ApplicationUpdate, NewReview, PageRequest, ReviewerId};
use super::repository::{ApplicationRepository, RepositoryError, ReviewRepository};
use super::service::{ReviewService, ReviewServiceError};

pub const REVIEWER_HEADER: &str = "x-reviewer-id";

/// Reviewer identity taken from the `x-reviewer-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewerIdentity(pub ReviewerId);

#[async_trait]
impl<S> FromRequestParts<S> for ReviewerIdentity
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(REVIEWER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(|id| ReviewerIdentity(ReviewerId(id)))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "missing or invalid x-reviewer-id header" })),
                )
            })
    }
}

/// Router builder exposing the reviewer endpoints.
pub fn review_router<A, R>(service: Arc<ReviewService<A, R>>) -> Router
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    Router::new()
        .route("/api/reviewer/applications", get(list_handler::<A, R>))
        .route(
            "/api/reviewer/applications/:application_id",
            get(get_handler::<A, R>).patch(update_handler::<A, R>),
        )
        .route(
            "/api/reviewer/applications/:application_id/reviews",
            get(reviews_handler::<A, R>),
        )
        .route("/api/reviewer/stats", get(stats_handler::<A, R>))
        .route("/api/reviews", post(create_review_handler::<A, R>))
        .with_state(service)
}

pub(crate) async fn list_handler<A, R>(
    State(service): State<Arc<ReviewService<A, R>>>,
    ReviewerIdentity(reviewer): ReviewerIdentity,
    Query(page): Query<PageRequest>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    match service.list_assigned(reviewer, page) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<A, R>(
    State(service): State<Arc<ReviewService<A, R>>>,
    ReviewerIdentity(reviewer): ReviewerIdentity,
    Path(application_id): Path<u64>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    match service.get_assigned(reviewer, ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<A, R>(
    State(service): State<Arc<ReviewService<A, R>>>,
    ReviewerIdentity(reviewer): ReviewerIdentity,
    Path(application_id): Path<u64>,
    Json(update): Json<ApplicationUpdate>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    match service.update_assigned(reviewer, ApplicationId(application_id), update) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reviews_handler<A, R>(
    State(service): State<Arc<ReviewService<A, R>>>,
    ReviewerIdentity(reviewer): ReviewerIdentity,
    Path(application_id): Path<u64>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    match service.reviews_for(reviewer, ApplicationId(application_id)) {
        Ok(reviews) => (StatusCode::OK, Json(reviews)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_review_handler<A, R>(
    State(service): State<Arc<ReviewService<A, R>>>,
    ReviewerIdentity(reviewer): ReviewerIdentity,
    Json(new_review): Json<NewReview>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    match service.create_review(reviewer, new_review) {
        Ok(review) => (StatusCode::CREATED, Json(review)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<A, R>(
    State(service): State<Arc<ReviewService<A, R>>>,
    ReviewerIdentity(reviewer): ReviewerIdentity,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    match service.stats(reviewer) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ReviewServiceError) -> Response {
    let status = match &error {
        ReviewServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ReviewServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReviewServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ReviewServiceError::NotAssigned { .. } => StatusCode::FORBIDDEN,
        ReviewServiceError::InvalidTransition { .. }
        | ReviewServiceError::RecommendationMismatch { .. } => StatusCode::CONFLICT,
        ReviewServiceError::NotesRequired => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
