//! Client-side reviewer dashboard state.
//!
//! A decision is two independent calls: the application update, then the review record.
//! The local list follows the update even when the review record could not be written;
//! there is no compensation for that partial failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::api_client::ApiError;

use super::client::ReviewerApi;
use super::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationUpdate, Decision,
    DocumentReference, NewReview, PageRequest, ReviewId, ReviewerStats, Score,
};

/// Display-ready row for one assigned application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationCard {
    pub id: ApplicationId,
    pub applicant_name: String,
    pub applicant_email: Option<String>,
    pub scholarship_title: String,
    pub amount_label: String,
    pub submitted_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub score: Option<Score>,
    pub review_notes: Option<String>,
    pub documents: Vec<DocumentReference>,
}

impl ApplicationCard {
    pub fn status_label(&self) -> &'static str {
        self.status.display_label()
    }
}

impl From<Application> for ApplicationCard {
    fn from(application: Application) -> Self {
        let amount_label = amount_label(&application);
        let applicant_name = application
            .applicant
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("Student #{}", application.applicant.id));
        let scholarship_title = application
            .scholarship
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| format!("Scholarship #{}", application.scholarship.id));

        Self {
            id: application.id,
            applicant_name,
            applicant_email: application.applicant.email,
            scholarship_title,
            amount_label,
            submitted_at: application.submitted_at,
            status: application.status,
            score: application.score,
            review_notes: application.review_notes,
            documents: application.documents,
        }
    }
}

fn amount_label(application: &Application) -> String {
    match application.amount_awarded.or(application.scholarship.amount) {
        Some(amount) if application.scholarship.currency.eq_ignore_ascii_case("INR") => {
            format!("₹{amount}")
        }
        Some(amount) => amount.to_string(),
        None => String::new(),
    }
}

/// What the dashboard now shows for a decided application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub score: Option<Score>,
    /// `None` when the review record could not be created.
    pub review_id: Option<ReviewId>,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("a decision is already being saved")]
    DecisionInFlight,
    #[error("please add review notes to approve")]
    NotesRequired,
    #[error("application {0} is not on the dashboard")]
    UnknownApplication(ApplicationId),
    #[error("failed to update application: {0}")]
    Update(#[source] ApiError),
}

/// Releases the in-flight flag however the decision ends.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ReviewerDashboard<C> {
    api: Arc<C>,
    page: PageRequest,
    cards: Mutex<Vec<ApplicationCard>>,
    stats: Mutex<ReviewerStats>,
    saving: AtomicBool,
}

impl<C> ReviewerDashboard<C>
where
    C: ReviewerApi + 'static,
{
    pub fn new(api: Arc<C>) -> Self {
        Self {
            api,
            page: PageRequest::default(),
            cards: Mutex::new(Vec::new()),
            stats: Mutex::new(ReviewerStats::default()),
            saving: AtomicBool::new(false),
        }
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page.normalized();
        self
    }

    /// Replace the local list with the reviewer's current assignments.
    pub async fn load(&self) -> Result<usize, ApiError> {
        let page = self.api.list_assigned(self.page).await?;
        let cards: Vec<ApplicationCard> =
            page.data.into_iter().map(ApplicationCard::from).collect();
        let count = cards.len();
        *self.cards_guard() = cards;
        Ok(count)
    }

    pub async fn refresh_stats(&self) -> Result<ReviewerStats, ApiError> {
        let stats = self.api.stats().await?;
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = stats;
        Ok(stats)
    }

    pub fn cards(&self) -> Vec<ApplicationCard> {
        self.cards_guard().clone()
    }

    pub fn card(&self, id: ApplicationId) -> Option<ApplicationCard> {
        self.cards_guard().iter().find(|card| card.id == id).cloned()
    }

    pub fn stats(&self) -> ReviewerStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    /// Record a decision: update the application, then append the review, then refresh the card.
    pub async fn decide(
        &self,
        id: ApplicationId,
        decision: Decision,
        notes: &str,
        score: Option<Score>,
    ) -> Result<DecisionOutcome, DashboardError> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DashboardError::DecisionInFlight);
        }
        let _saving = SavingGuard(&self.saving);

        let typed = notes.trim();
        let notes = Some(typed.to_string()).filter(|notes| !notes.is_empty());
        if decision == Decision::Approve && notes.is_none() {
            return Err(DashboardError::NotesRequired);
        }
        if self.card(id).is_none() {
            return Err(DashboardError::UnknownApplication(id));
        }

        let update = ApplicationUpdate {
            status: decision.status(),
            score,
            // Sent even when blank so the stored notes are cleared.
            review_notes: Some(typed.to_string()),
        };
        self.api
            .update_application(id, &update)
            .await
            .map_err(DashboardError::Update)?;

        let review = NewReview {
            application_id: id,
            overall_score: score,
            comments: notes.clone(),
            recommendation: decision.recommendation(),
        };
        let review_id = match self.api.create_review(&review).await {
            Ok(review) => Some(review.id),
            Err(err) => {
                warn!(application_id = %id, error = %err, "review record not created after status update");
                None
            }
        };

        let mut cards = self.cards_guard();
        let shown_score = match cards.iter_mut().find(|card| card.id == id) {
            Some(card) => {
                card.status = decision.status();
                card.review_notes = notes;
                if score.is_some() {
                    card.score = score;
                }
                card.score
            }
            None => score,
        };
        drop(cards);

        info!(application_id = %id, status = decision.status().label(), "decision saved");

        Ok(DecisionOutcome {
            application_id: id,
            status: decision.status(),
            score: shown_score,
            review_id,
        })
    }

    fn cards_guard(&self) -> MutexGuard<'_, Vec<ApplicationCard>> {
        self.cards.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
