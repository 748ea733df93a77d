//! Matchmaking backend API.
//!
//! [`MatchmakingApi`] is the seam between the job monitor and the network;
//! [`HttpMatchmakingApi`] is the production implementation.

pub mod client;
pub mod envelope;
pub mod query;
pub mod timestamp;
pub mod types;

use async_trait::async_trait;

use crate::error::ApiError;

pub use client::HttpMatchmakingApi;
pub use query::MatchQuery;
pub use types::{
    ExternalId, Job, JobId, JobStatus, MatchPage, MatchResult, PaginationState, StatusInfo, Tier,
};

/// Operations the job monitor needs from the backend.
///
/// Contract: `job_for_project` returns `Ok(None)` when the backend answers
/// 404, meaning no job has been created for the key yet.
#[async_trait]
pub trait MatchmakingApi: Send + Sync {
    /// `POST /jobs/create`
    async fn create_job(&self, project_key: &str) -> Result<Job, ApiError>;

    /// `GET /jobs/project/{key}`
    async fn job_for_project(&self, project_key: &str) -> Result<Option<Job>, ApiError>;

    /// `POST /jobs/{id}/retry`
    async fn retry_job(&self, job_id: &JobId) -> Result<Job, ApiError>;

    /// `GET /matchmaking/top-matches/{key}`
    async fn top_matches(&self, project_key: &str, query: &MatchQuery)
        -> Result<MatchPage, ApiError>;
}
