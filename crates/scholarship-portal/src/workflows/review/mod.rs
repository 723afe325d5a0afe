//! Reviewer workflow: assignment-scoped listing, status transitions, scoring, and the
//! append-only review trail, plus the dashboard state that drives decisions over HTTP.

pub mod client;
pub mod dashboard;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use crate::api_client::ApiError;
pub use client::{HttpReviewerApi, ReviewerApi};
pub use dashboard::{ApplicationCard, DashboardError, DecisionOutcome, ReviewerDashboard};
pub use domain::{
    ApplicantId, ApplicantSummary, Application, ApplicationId, ApplicationStatus,
    ApplicationUpdate, AssignedPage, Decision, DocumentReference, NewReview, PageRequest,
    Recommendation, Review, ReviewId, ReviewerId, ReviewerStats, ScholarshipId,
    ScholarshipSummary, Score, ScoreError,
};
pub use repository::{ApplicationRepository, RepositoryError, ReviewRepository};
pub use router::{review_router, ReviewerIdentity, REVIEWER_HEADER};
pub use service::{ReviewService, ReviewServiceError};
