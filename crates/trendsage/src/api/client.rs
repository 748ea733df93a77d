//! reqwest-backed implementation of [`MatchmakingApi`].

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::Instrument;

use super::envelope::{error_message, unwrap_envelope};
use super::query::MatchQuery;
use super::types::{CreateJobRequest, Job, JobId, MatchPage};
use super::MatchmakingApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::sanitize::{redact_url, truncate_body};

/// HTTP client for the matchmaking backend.
///
/// Every request carries the client-enforced connect/request timeouts from
/// [`ClientConfig`]; a timeout surfaces as [`ApiError::Timeout`].
#[derive(Debug, Clone)]
pub struct HttpMatchmakingApi {
    client: Client,
    base_url: Url,
}

impl HttpMatchmakingApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(config.trimmed_base_url())
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|e| ApiError::Client(format!("Invalid API key header: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| {
            let err = ApiError::from_transport(e);
            warn!("Request failed: {}", err);
            err
        })
    }

    /// Reads a successful JSON body, or converts the response into [`ApiError::Http`].
    async fn read_json(response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let url = redact_url(response.url().as_str());
            let body = response.text().await.unwrap_or_default();
            warn!(
                "{} returned {}: {}",
                url,
                status.as_u16(),
                truncate_body(&body)
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: error_message(status.as_u16(), &body),
            });
        }

        response.json::<Value>().await.map_err(ApiError::from_transport)
    }
}

#[async_trait]
impl MatchmakingApi for HttpMatchmakingApi {
    async fn create_job(&self, project_key: &str) -> Result<Job, ApiError> {
        let url = self.endpoint(&["jobs", "create"])?;
        let span = tracing::info_span!("api.create_job", project = project_key);

        async {
            debug!("Creating job for project '{}'", project_key);
            let request = self.client.post(url).json(&CreateJobRequest {
                project_id: project_key,
            });
            let body = Self::read_json(self.send(request).await?).await?;
            unwrap_envelope(body)
        }
        .instrument(span)
        .await
    }

    async fn job_for_project(&self, project_key: &str) -> Result<Option<Job>, ApiError> {
        let url = self.endpoint(&["jobs", "project", project_key])?;
        let span = tracing::debug_span!("api.job_for_project", project = project_key);

        async {
            let response = self.send(self.client.get(url)).await?;
            if response.status() == StatusCode::NOT_FOUND {
                debug!("No job exists for project '{}'", project_key);
                return Ok(None);
            }
            let body = Self::read_json(response).await?;
            unwrap_envelope(body).map(Some)
        }
        .instrument(span)
        .await
    }

    async fn retry_job(&self, job_id: &JobId) -> Result<Job, ApiError> {
        let url = self.endpoint(&["jobs", job_id.as_str(), "retry"])?;
        let span = tracing::info_span!("api.retry_job", job_id = %job_id);

        async {
            debug!("Retrying job {}", job_id);
            let body = Self::read_json(self.send(self.client.post(url)).await?).await?;
            unwrap_envelope(body)
        }
        .instrument(span)
        .await
    }

    async fn top_matches(
        &self,
        project_key: &str,
        query: &MatchQuery,
    ) -> Result<MatchPage, ApiError> {
        let url = self.endpoint(&["matchmaking", "top-matches", project_key])?;
        let span = tracing::debug_span!(
            "api.top_matches",
            project = project_key,
            page = query.page,
            page_size = query.page_size
        );

        async {
            let request = self.client.get(url).query(&query.to_params());
            let body = Self::read_json(self.send(request).await?).await?;
            unwrap_envelope(body)
        }
        .instrument(span)
        .await
    }
}
