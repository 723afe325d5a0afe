use chrono::{Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use scholarship_portal::workflows::review::{
    ApplicantId, ApplicantSummary, Application, ApplicationId, ApplicationRepository,
    ApplicationStatus, DocumentReference, RepositoryError, Review, ReviewRepository, ReviewerId,
    ScholarshipId, ScholarshipSummary,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, Application>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id, application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.get_mut(&application.id) {
            Some(slot) => {
                *slot = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(&id).cloned())
    }

    fn assigned_to(&self, reviewer: ReviewerId) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard
            .values()
            .filter(|application| application.is_assigned_to(reviewer))
            .cloned()
            .collect())
    }
}

/// Append-only review trail.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewRepository {
    records: Arc<Mutex<Vec<Review>>>,
}

impl ReviewRepository for InMemoryReviewRepository {
    fn append(&self, review: Review) -> Result<Review, RepositoryError> {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.iter().any(|existing| existing.id == review.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(review.clone());
        Ok(review)
    }

    fn for_application(&self, id: ApplicationId) -> Result<Vec<Review>, RepositoryError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard
            .iter()
            .filter(|review| review.application_id == id)
            .cloned()
            .collect())
    }
}

struct DemoApplication {
    id: u64,
    applicant: &'static str,
    scholarship: (u64, &'static str, u32),
    reviewer: u64,
    status: ApplicationStatus,
    days_ago: i64,
}

const DEMO_APPLICATIONS: &[DemoApplication] = &[
    DemoApplication {
        id: 1001,
        applicant: "Ananya Rao",
        scholarship: (11, "STEM Excellence Grant", 50_000),
        reviewer: 1,
        status: ApplicationStatus::Submitted,
        days_ago: 1,
    },
    DemoApplication {
        id: 1002,
        applicant: "Rohan Mehta",
        scholarship: (11, "STEM Excellence Grant", 50_000),
        reviewer: 1,
        status: ApplicationStatus::UnderReview,
        days_ago: 3,
    },
    DemoApplication {
        id: 1003,
        applicant: "Fatima Sheikh",
        scholarship: (12, "Rural Girls Education Fund", 25_000),
        reviewer: 1,
        status: ApplicationStatus::UnderReview,
        days_ago: 6,
    },
    DemoApplication {
        id: 1004,
        applicant: "Karthik Iyer",
        scholarship: (13, "First Generation Scholars Award", 75_000),
        reviewer: 2,
        status: ApplicationStatus::Submitted,
        days_ago: 2,
    },
];

/// Load a handful of assigned applications so a development server has something to review.
pub(crate) fn seed_demo_applications<A>(repository: &A) -> Result<usize, RepositoryError>
where
    A: ApplicationRepository + ?Sized,
{
    let now = Utc::now();
    for demo in DEMO_APPLICATIONS {
        let (scholarship_id, title, amount) = demo.scholarship;
        repository.insert(Application {
            id: ApplicationId(demo.id),
            applicant: ApplicantSummary {
                id: ApplicantId(demo.id + 5_000),
                name: Some(demo.applicant.to_string()),
                email: None,
                phone: None,
            },
            scholarship: ScholarshipSummary {
                id: ScholarshipId(scholarship_id),
                title: Some(title.to_string()),
                amount: Some(amount),
                currency: "INR".to_string(),
            },
            assigned_reviewer: Some(ReviewerId(demo.reviewer)),
            status: demo.status,
            score: None,
            review_notes: None,
            amount_awarded: None,
            submitted_at: now - Duration::days(demo.days_ago),
            documents: vec![DocumentReference {
                name: "Transcript".to_string(),
                storage_key: format!("applications/{}/transcript.pdf", demo.id),
            }],
        })?;
    }
    Ok(DEMO_APPLICATIONS.len())
}
