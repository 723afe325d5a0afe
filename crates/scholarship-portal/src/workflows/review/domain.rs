use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier wrapper for submitted applications.
    ApplicationId
);
numeric_id!(ApplicantId);
numeric_id!(ScholarshipId);
numeric_id!(
    /// Reviewer account an application is assigned to.
    ReviewerId
);
numeric_id!(ReviewId);

/// Reviewer score, bounded to 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if value > Self::MAX {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreError {
    #[error("score must be between 0 and 100 (got {0})")]
    OutOfRange(u8),
}

/// Lifecycle of an application. Approved, rejected and waitlisted are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Waitlisted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Waitlisted => "waitlisted",
        }
    }

    pub const fn display_label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Waitlisted => "Waitlisted",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::Rejected | ApplicationStatus::Waitlisted
        )
    }

    /// Submitted applications may be decided directly; opening one for a decision implies review.
    /// Staying in a non-terminal status is allowed so score and notes can be saved as drafts.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        match self {
            ApplicationStatus::Submitted => true,
            ApplicationStatus::UnderReview => next != ApplicationStatus::Submitted,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantSummary {
    pub id: ApplicantId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipSummary {
    pub id: ScholarshipId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub amount: Option<u32>,
    pub currency: String,
}

/// Reference to an uploaded supporting document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub name: String,
    pub storage_key: String,
}

/// Scholarship application as reviewers see it. Never deleted, only transitioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant: ApplicantSummary,
    pub scholarship: ScholarshipSummary,
    #[serde(default)]
    pub assigned_reviewer: Option<ReviewerId>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(default)]
    pub amount_awarded: Option<u32>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub documents: Vec<DocumentReference>,
}

impl Application {
    pub fn is_assigned_to(&self, reviewer: ReviewerId) -> bool {
        self.assigned_reviewer == Some(reviewer)
    }
}

/// Reviewer-supplied change to an application's status, score and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
    #[serde(default)]
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Approve,
    Reject,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Recommendation::Approve => "approve",
            Recommendation::Reject => "reject",
        }
    }

    /// Status an application must already hold before this review can be recorded.
    pub const fn decided_status(self) -> ApplicationStatus {
        match self {
            Recommendation::Approve => ApplicationStatus::Approved,
            Recommendation::Reject => ApplicationStatus::Rejected,
        }
    }
}

/// Append-only audit record of a reviewer decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub application_id: ApplicationId,
    pub reviewer_id: ReviewerId,
    pub recommendation: Recommendation,
    pub overall_score: Option<Score>,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub application_id: ApplicationId,
    #[serde(default)]
    pub overall_score: Option<Score>,
    #[serde(default)]
    pub comments: Option<String>,
    pub recommendation: Recommendation,
}

/// A reviewer's final call from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub const fn status(self) -> ApplicationStatus {
        match self {
            Decision::Approve => ApplicationStatus::Approved,
            Decision::Reject => ApplicationStatus::Rejected,
        }
    }

    pub const fn recommendation(self) -> Recommendation {
        match self {
            Decision::Approve => Recommendation::Approve,
            Decision::Reject => Recommendation::Reject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "PageRequest::default_page")]
    pub page: usize,
    #[serde(default = "PageRequest::default_limit")]
    pub limit: usize,
}

impl PageRequest {
    pub const MAX_LIMIT: usize = 100;

    fn default_page() -> usize {
        1
    }

    fn default_limit() -> usize {
        5
    }

    /// Clamp to page >= 1 and 1 <= limit <= MAX_LIMIT.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(self) -> usize {
        let page = self.normalized();
        (page.page - 1).saturating_mul(page.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::default_page(),
            limit: Self::default_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedPage {
    pub data: Vec<Application>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

/// Per-status counts for the reviewer's assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerStats {
    pub submitted: usize,
    pub under_review: usize,
    pub approved: usize,
    pub rejected: usize,
    pub waitlisted: usize,
}

impl ReviewerStats {
    pub fn record(&mut self, status: ApplicationStatus) {
        match status {
            ApplicationStatus::Submitted => self.submitted += 1,
            ApplicationStatus::UnderReview => self.under_review += 1,
            ApplicationStatus::Approved => self.approved += 1,
            ApplicationStatus::Rejected => self.rejected += 1,
            ApplicationStatus::Waitlisted => self.waitlisted += 1,
        }
    }
}
