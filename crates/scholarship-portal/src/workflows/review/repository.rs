use super::domain::{Application, ApplicationId, Review, ReviewerId};

/// Storage abstraction for applications so the service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn assigned_to(&self, reviewer: ReviewerId) -> Result<Vec<Application>, RepositoryError>;
}

/// Append-only storage for review records.
pub trait ReviewRepository: Send + Sync {
    fn append(&self, review: Review) -> Result<Review, RepositoryError>;
    fn for_application(&self, id: ApplicationId) -> Result<Vec<Review>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
