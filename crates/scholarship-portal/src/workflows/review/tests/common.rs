use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::api_client::ApiError;
use crate::workflows::review::client::ReviewerApi;
use crate::workflows::review::domain::{
    ApplicantId, ApplicantSummary, Application, ApplicationId, ApplicationStatus,
    ApplicationUpdate, AssignedPage, DocumentReference, NewReview, PageRequest, Review, ReviewId,
    ReviewerId, ReviewerStats, ScholarshipId, ScholarshipSummary,
};
use crate::workflows::review::repository::{
    ApplicationRepository, RepositoryError, ReviewRepository,
};
use crate::workflows::review::ReviewService;

pub(super) const REVIEWER: ReviewerId = ReviewerId(7);
pub(super) const OTHER_REVIEWER: ReviewerId = ReviewerId(8);

pub(super) fn submitted_on(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn application(id: u64, status: ApplicationStatus) -> Application {
    Application {
        id: ApplicationId(id),
        applicant: ApplicantSummary {
            id: ApplicantId(100 + id),
            name: Some(format!("Student {id}")),
            email: Some(format!("student{id}@example.org")),
            phone: None,
        },
        scholarship: ScholarshipSummary {
            id: ScholarshipId(3),
            title: Some("STEM Excellence Grant".to_string()),
            amount: Some(50_000),
            currency: "INR".to_string(),
        },
        assigned_reviewer: Some(REVIEWER),
        status,
        score: None,
        review_notes: None,
        amount_awarded: None,
        submitted_at: submitted_on((id % 28) as u32 + 1),
        documents: vec![DocumentReference {
            name: "Marksheet".to_string(),
            storage_key: format!("uploads/applications/{id}/marksheet.pdf"),
        }],
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl MemoryApplications {
    pub(super) fn seeded(applications: Vec<Application>) -> Self {
        let repository = Self::default();
        for application in applications {
            repository.insert(application).expect("seed application");
        }
        repository
    }

    pub(super) fn stored(&self, id: ApplicationId) -> Application {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&id)
            .cloned()
            .expect("application stored")
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id, application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(application.id, application);
        Ok(())
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn assigned_to(&self, reviewer: ReviewerId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|application| application.is_assigned_to(reviewer))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryReviews {
    pub(super) records: Arc<Mutex<Vec<Review>>>,
}

impl MemoryReviews {
    pub(super) fn all(&self) -> Vec<Review> {
        self.records.lock().expect("review mutex poisoned").clone()
    }
}

impl ReviewRepository for MemoryReviews {
    fn append(&self, review: Review) -> Result<Review, RepositoryError> {
        self.records
            .lock()
            .expect("review mutex poisoned")
            .push(review.clone());
        Ok(review)
    }

    fn for_application(&self, id: ApplicationId) -> Result<Vec<Review>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("review mutex poisoned")
            .iter()
            .filter(|review| review.application_id == id)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn assigned_to(&self, _reviewer: ReviewerId) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service(
    applications: Vec<Application>,
) -> (
    ReviewService<MemoryApplications, MemoryReviews>,
    MemoryApplications,
    MemoryReviews,
) {
    let repository = MemoryApplications::seeded(applications);
    let reviews = MemoryReviews::default();
    let service = ReviewService::new(Arc::new(repository.clone()), Arc::new(reviews.clone()));
    (service, repository, reviews)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Lets a test hold `update_application` open to observe the in-flight guard.
#[derive(Default)]
pub(super) struct Gate {
    pub(super) entered: Notify,
    pub(super) release: Notify,
}

#[derive(Default)]
pub(super) struct FakeReviewerApi {
    pub(super) applications: Mutex<Vec<Application>>,
    pub(super) fail_update: bool,
    pub(super) fail_review: bool,
    pub(super) gate: Option<Arc<Gate>>,
    pub(super) updates: Mutex<Vec<(ApplicationId, ApplicationUpdate)>>,
    pub(super) reviews: Mutex<Vec<NewReview>>,
}

impl FakeReviewerApi {
    pub(super) fn with_applications(applications: Vec<Application>) -> Self {
        Self {
            applications: Mutex::new(applications),
            ..Self::default()
        }
    }

    pub(super) fn updates(&self) -> Vec<(ApplicationId, ApplicationUpdate)> {
        self.updates.lock().expect("updates mutex poisoned").clone()
    }

    pub(super) fn reviews(&self) -> Vec<NewReview> {
        self.reviews.lock().expect("reviews mutex poisoned").clone()
    }
}

fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: message.to_string(),
    }
}

#[async_trait]
impl ReviewerApi for FakeReviewerApi {
    async fn list_assigned(&self, page: PageRequest) -> Result<AssignedPage, ApiError> {
        let data = self
            .applications
            .lock()
            .expect("applications mutex poisoned")
            .clone();
        Ok(AssignedPage {
            total: data.len(),
            data,
            page: page.page,
            limit: page.limit,
        })
    }

    async fn update_application(
        &self,
        id: ApplicationId,
        update: &ApplicationUpdate,
    ) -> Result<Application, ApiError> {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.updates
            .lock()
            .expect("updates mutex poisoned")
            .push((id, update.clone()));

        if self.fail_update {
            return Err(server_error("update rejected"));
        }

        let mut application = application(id.0, update.status);
        application.score = update.score;
        application.review_notes = update.review_notes.clone();
        Ok(application)
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let mut reviews = self.reviews.lock().expect("reviews mutex poisoned");
        reviews.push(review.clone());

        if self.fail_review {
            return Err(server_error("review store offline"));
        }

        Ok(Review {
            id: ReviewId(reviews.len() as u64),
            application_id: review.application_id,
            reviewer_id: REVIEWER,
            recommendation: review.recommendation,
            overall_score: review.overall_score,
            comments: review.comments.clone(),
            created_at: submitted_on(20),
        })
    }

    async fn stats(&self) -> Result<ReviewerStats, ApiError> {
        let mut stats = ReviewerStats::default();
        for application in self
            .applications
            .lock()
            .expect("applications mutex poisoned")
            .iter()
        {
            stats.record(application.status);
        }
        Ok(stats)
    }
}
