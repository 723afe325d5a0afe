use async_trait::async_trait;

use crate::api_client::{ApiClient, ApiError};

use super::domain::{
    Application, ApplicationId, ApplicationUpdate, AssignedPage, NewReview, PageRequest, Review,
    ReviewerId, ReviewerStats,
};
use super::router::REVIEWER_HEADER;

/// Remote operations the reviewer dashboard depends on.
#[async_trait]
pub trait ReviewerApi: Send + Sync {
    async fn list_assigned(&self, page: PageRequest) -> Result<AssignedPage, ApiError>;

    async fn update_application(
        &self,
        id: ApplicationId,
        update: &ApplicationUpdate,
    ) -> Result<Application, ApiError>;

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError>;

    async fn stats(&self) -> Result<ReviewerStats, ApiError>;
}

/// `ReviewerApi` over the portal's REST endpoints, acting as a single reviewer.
#[derive(Debug, Clone)]
pub struct HttpReviewerApi {
    api: ApiClient,
    reviewer: ReviewerId,
}

impl HttpReviewerApi {
    pub fn new(api: ApiClient, reviewer: ReviewerId) -> Self {
        Self { api, reviewer }
    }

    fn reviewer_header(&self) -> String {
        self.reviewer.to_string()
    }
}

#[async_trait]
impl ReviewerApi for HttpReviewerApi {
    async fn list_assigned(&self, page: PageRequest) -> Result<AssignedPage, ApiError> {
        let request = self
            .api
            .get("/api/reviewer/applications")
            .header(REVIEWER_HEADER, self.reviewer_header())
            .query(&[("page", page.page), ("limit", page.limit)]);
        ApiClient::send_json(request).await
    }

    async fn update_application(
        &self,
        id: ApplicationId,
        update: &ApplicationUpdate,
    ) -> Result<Application, ApiError> {
        let request = self
            .api
            .patch(&format!("/api/reviewer/applications/{id}"))
            .header(REVIEWER_HEADER, self.reviewer_header())
            .json(update);
        ApiClient::send_json(request).await
    }

    async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        let request = self
            .api
            .post("/api/reviews")
            .header(REVIEWER_HEADER, self.reviewer_header())
            .json(review);
        ApiClient::send_json(request).await
    }

    async fn stats(&self) -> Result<ReviewerStats, ApiError> {
        let request = self
            .api
            .get("/api/reviewer/stats")
            .header(REVIEWER_HEADER, self.reviewer_header());
        ApiClient::send_json(request).await
    }
}
