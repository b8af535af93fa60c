/*!
 * HTTP clients for the external collaborators.
 *
 * This module contains client implementations for the language models that
 * produce word pairs and for the rendering service:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 * - Render: the movie rendering API
 */

use async_trait::async_trait;
use log::error;
use reqwest::StatusCode;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the word-pair source.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `String` - The extracted text
    fn extract_text(response: &Self::Response) -> String;
}

/// Maximum number of response characters kept in logs and error messages
const MAX_LOGGED_CHARS: usize = 500;

/// Shorten a response body for logging
pub(crate) fn truncate_for_log(text: &str) -> String {
    if text.chars().count() > MAX_LOGGED_CHARS {
        let mut truncated: String = text.chars().take(MAX_LOGGED_CHARS).collect();
        truncated.push('…');
        truncated
    } else {
        text.to_string()
    }
}

/// Classify a transport failure
pub(crate) fn map_request_error(service: &str, error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(format!("{}: {}", service, error))
    } else if error.is_connect() {
        ProviderError::ConnectionError(format!("{}: {}", service, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", service, error))
    }
}

/// Classify a non-success HTTP status, logging the body
pub(crate) fn map_status_error(service: &str, status: StatusCode, body: &str) -> ProviderError {
    let body = truncate_for_log(body);
    error!("{} API error ({}): {}", service, status, body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProviderError::Timeout(format!("{} returned {}", service, status))
        }
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

/// Read a response body, turning non-success statuses into errors
pub(crate) async fn read_success_body(
    service: &str,
    response: reqwest::Response,
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| map_request_error(service, e))?;

    if !status.is_success() {
        return Err(map_status_error(service, status, &body));
    }
    Ok(body)
}

/// Parse a JSON body, logging it when it does not match the expected shape
pub(crate) fn parse_json_body<T: serde::de::DeserializeOwned>(
    service: &str,
    body: &str,
) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        error!(
            "Failed to parse {} API response: {}. Raw response (first {} chars): {}",
            service,
            e,
            MAX_LOGGED_CHARS,
            truncate_for_log(body)
        );
        ProviderError::ParseError(format!("{} response: {}", service, e))
    })
}

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod render;
