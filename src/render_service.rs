/*!
 * The rendering collaborator.
 *
 * Rendering is fully remote: a composition document is submitted once and
 * the returned job id is polled until the movie is done or has failed.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::composition::CompositionDocument;
use crate::errors::ProviderError;

/// Accepted render job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJobHandle {
    /// Identifier used for status polling
    pub job_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// Something that can render composition documents
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Submit a document; the job keeps running remotely once accepted
    async fn submit(&self, document: &CompositionDocument) -> Result<RenderJobHandle, ProviderError>;

    /// Current state of a previously submitted job
    async fn status(&self, job_id: &str) -> Result<MovieStatus, ProviderError>;
}

/// Renderer answer to a submission
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Renderer answer to a status query
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub movie: Option<MovieStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Lifecycle of a remote render job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderState {
    Pending,
    Running,
    Done,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RenderState {
    /// Whether polling can stop
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// Render job details as reported by the renderer
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MovieStatus {
    #[serde(default)]
    pub status: RenderState,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "ass", alias = "subtitles")]
    pub subtitles_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    /// Movie length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// File size in bytes
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Seconds the renderer spent
    #[serde(default)]
    pub rendering_time: Option<f64>,
}

impl SubmitResponse {
    /// Turn the answer into a job handle, rejecting unsuccessful submissions
    pub fn into_handle(self) -> Result<RenderJobHandle, ProviderError> {
        if !self.success {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: self
                    .message
                    .unwrap_or_else(|| "renderer rejected the movie".to_string()),
            });
        }

        let job_id = self
            .project
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ProviderError::ParseError("submission accepted without a project id".to_string()))?;

        let submitted_at = self
            .timestamp
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        Ok(RenderJobHandle { job_id, submitted_at })
    }
}

impl StatusResponse {
    /// Extract the movie details, rejecting unsuccessful queries
    pub fn into_movie(self) -> Result<MovieStatus, ProviderError> {
        if !self.success {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: self
                    .message
                    .unwrap_or_else(|| "renderer could not report the status".to_string()),
            });
        }
        self.movie
            .ok_or_else(|| ProviderError::ParseError("status response without movie details".to_string()))
    }
}
