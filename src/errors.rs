/*!
 * Error types for the vocabreel application.
 *
 * This module contains custom error types for the different layers of the
 * service, using the thiserror crate for ergonomic error definitions:
 * - `ProviderError`: transport-level failures of any HTTP collaborator
 * - `GenerationError`: the failure taxonomy surfaced to callers
 * - `AppError`: everything the binary can run into
 */

use thiserror::Error;

/// Errors that can occur when talking to an external HTTP collaborator
/// (the word-pair language model or the rendering service)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not complete within its allotted time
    #[error("Request timed out: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Failures of a video generation request
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Bad input shape or range, rejected before any network call
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A language code with no known voice
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Network/HTTP failure or a non-success answer from a collaborator
    #[error("{service} failed: {message}")]
    Collaborator {
        /// Which collaborator failed
        service: String,
        /// Human-readable failure
        message: String,
    },

    /// Malformed or missing data in a collaborator response
    #[error("Could not understand the response: {0}")]
    Parse(String),

    /// A collaborator call exceeded its allotted time
    #[error("{service} timed out: {message}")]
    Timeout {
        /// Which collaborator timed out
        service: String,
        /// Details from the transport
        message: String,
    },

    /// The caller cancelled the request
    #[error("Request cancelled while {stage}")]
    Cancelled {
        /// Pipeline stage that was interrupted
        stage: &'static str,
    },
}

impl GenerationError {
    /// Wrap a transport failure with the name of the collaborator that produced it
    pub fn from_provider(service: &str, error: ProviderError) -> Self {
        match error {
            ProviderError::ParseError(message) => Self::Parse(message),
            ProviderError::Timeout(message) => Self::Timeout {
                service: service.to_string(),
                message,
            },
            other => Self::Collaborator {
                service: service.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Whether the failure is the caller's fault (bad input) rather than the server's
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnsupportedLanguage(_))
    }
}

impl From<ProviderError> for GenerationError {
    fn from(error: ProviderError) -> Self {
        Self::from_provider("collaborator", error)
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the generation pipeline
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
