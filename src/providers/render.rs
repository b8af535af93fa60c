use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::time::Duration;

use super::{map_request_error, parse_json_body, read_success_body};
use crate::composition::CompositionDocument;
use crate::errors::ProviderError;
use crate::render_service::{MovieStatus, RenderJobHandle, RenderService, StatusResponse, SubmitResponse};

const SERVICE: &str = "Renderer";

/// Client for the movie rendering API
#[derive(Debug)]
pub struct RenderClient {
    /// HTTP client for API requests
    client: Client,
    /// API key sent as `x-api-key`
    api_key: String,
    /// Base URL, e.g. `https://api.json2video.com/v2`
    endpoint: String,
}

impl RenderClient {
    /// Create a new rendering client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    fn movies_url(&self) -> String {
        format!("{}/movies", self.endpoint)
    }
}

#[async_trait]
impl RenderService for RenderClient {
    async fn submit(&self, document: &CompositionDocument) -> Result<RenderJobHandle, ProviderError> {
        debug!(
            "Submitting movie with {} scene(s), {:.1}s",
            document.scenes.len(),
            document.total_duration()
        );

        let response = self
            .client
            .post(self.movies_url())
            .header("x-api-key", &self.api_key)
            .json(document)
            .send()
            .await
            .map_err(|e| map_request_error(SERVICE, e))?;

        let body = read_success_body(SERVICE, response).await?;
        let submitted: SubmitResponse = parse_json_body(SERVICE, &body)?;
        submitted.into_handle()
    }

    async fn status(&self, job_id: &str) -> Result<MovieStatus, ProviderError> {
        let response = self
            .client
            .get(self.movies_url())
            .header("x-api-key", &self.api_key)
            .query(&[("project", job_id)])
            .send()
            .await
            .map_err(|e| map_request_error(SERVICE, e))?;

        let body = read_success_body(SERVICE, response).await?;
        let status: StatusResponse = parse_json_body(SERVICE, &body)?;
        status.into_movie()
    }
}
