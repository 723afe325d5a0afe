use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationUpdate, AssignedPage, NewReview,
    PageRequest, Recommendation, Review, ReviewId, ReviewerId, ReviewerStats,
};
use super::repository::{ApplicationRepository, RepositoryError, ReviewRepository};

/// Service enforcing reviewer assignment, status transitions and review bookkeeping.
pub struct ReviewService<A, R> {
    applications: Arc<A>,
    reviews: Arc<R>,
    review_sequence: AtomicU64,
}

impl<A, R> ReviewService<A, R>
where
    A: ApplicationRepository + 'static,
    R: ReviewRepository + 'static,
{
    pub fn new(applications: Arc<A>, reviews: Arc<R>) -> Self {
        Self {
            applications,
            reviews,
            review_sequence: AtomicU64::new(1),
        }
    }

    /// Page through the reviewer's assignments, newest submission first.
    pub fn list_assigned(
        &self,
        reviewer: ReviewerId,
        page: PageRequest,
    ) -> Result<AssignedPage, ReviewServiceError> {
        let page = page.normalized();
        let mut assigned = self.applications.assigned_to(reviewer)?;
        assigned.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = assigned.len();
        let data = assigned
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .collect();

        Ok(AssignedPage {
            data,
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    pub fn get_assigned(
        &self,
        reviewer: ReviewerId,
        id: ApplicationId,
    ) -> Result<Application, ReviewServiceError> {
        let application = self
            .applications
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if !application.is_assigned_to(reviewer) {
            return Err(ReviewServiceError::NotAssigned {
                application_id: id,
                reviewer_id: reviewer,
            });
        }

        Ok(application)
    }

    /// Apply a reviewer's status, score and notes to an assigned application.
    pub fn update_assigned(
        &self,
        reviewer: ReviewerId,
        id: ApplicationId,
        update: ApplicationUpdate,
    ) -> Result<Application, ReviewServiceError> {
        let mut application = self.get_assigned(reviewer, id)?;

        if !application.status.can_transition_to(update.status) {
            return Err(ReviewServiceError::InvalidTransition {
                from: application.status,
                to: update.status,
            });
        }

        // Omitted notes keep what is stored; blank notes clear it.
        let notes = match update.review_notes {
            Some(notes) => Some(notes.trim().to_string()).filter(|notes| !notes.is_empty()),
            None => application.review_notes.clone(),
        };

        if update.status == ApplicationStatus::Approved && notes.is_none() {
            return Err(ReviewServiceError::NotesRequired);
        }

        application.status = update.status;
        application.review_notes = notes;
        if update.score.is_some() {
            application.score = update.score;
        }

        self.applications.update(application.clone())?;

        info!(
            application_id = %id,
            reviewer_id = %reviewer,
            status = application.status.label(),
            score = application.score.map(|score| score.value()),
            "application updated by reviewer"
        );

        Ok(application)
    }

    /// Append an immutable review record for an assigned application.
    pub fn create_review(
        &self,
        reviewer: ReviewerId,
        new_review: NewReview,
    ) -> Result<Review, ReviewServiceError> {
        let application = self.get_assigned(reviewer, new_review.application_id)?;

        if application.status != new_review.recommendation.decided_status() {
            return Err(ReviewServiceError::RecommendationMismatch {
                status: application.status,
                recommendation: new_review.recommendation,
            });
        }
        if !self
            .reviews
            .for_application(new_review.application_id)?
            .is_empty()
        {
            return Err(RepositoryError::Conflict.into());
        }

        let review = Review {
            id: ReviewId(self.review_sequence.fetch_add(1, Ordering::Relaxed)),
            application_id: new_review.application_id,
            reviewer_id: reviewer,
            recommendation: new_review.recommendation,
            overall_score: new_review.overall_score,
            comments: new_review
                .comments
                .map(|comments| comments.trim().to_string())
                .filter(|comments| !comments.is_empty()),
            created_at: Utc::now(),
        };

        let stored = self.reviews.append(review)?;

        info!(
            review_id = %stored.id,
            application_id = %stored.application_id,
            reviewer_id = %reviewer,
            recommendation = ?stored.recommendation,
            "review recorded"
        );

        Ok(stored)
    }

    pub fn reviews_for(
        &self,
        reviewer: ReviewerId,
        id: ApplicationId,
    ) -> Result<Vec<Review>, ReviewServiceError> {
        self.get_assigned(reviewer, id)?;
        Ok(self.reviews.for_application(id)?)
    }

    pub fn stats(&self, reviewer: ReviewerId) -> Result<ReviewerStats, ReviewServiceError> {
        let mut stats = ReviewerStats::default();
        for application in self.applications.assigned_to(reviewer)? {
            stats.record(application.status);
        }
        Ok(stats)
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("application {application_id} is not assigned to reviewer {reviewer_id}")]
    NotAssigned {
        application_id: ApplicationId,
        reviewer_id: ReviewerId,
    },
    #[error("cannot move application from {} to {}", .from.label(), .to.label())]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error(
        "cannot record a {} review for an application that is {}",
        .recommendation.label(),
        .status.label()
    )]
    RecommendationMismatch {
        status: ApplicationStatus,
        recommendation: Recommendation,
    },
    #[error("review notes are required to approve an application")]
    NotesRequired,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
