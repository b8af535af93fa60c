/*!
 * Retry and timeout decorator for the external collaborators.
 *
 * `Retrying<T>` wraps any [`WordPairSource`] or [`RenderService`] and applies
 * the same policy to every call: each attempt is bounded by a timeout, and
 * retryable failures are repeated with exponential backoff plus jitter.
 */

use async_trait::async_trait;
use log::warn;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::composition::CompositionDocument;
use crate::errors::ProviderError;
use crate::render_service::{MovieStatus, RenderJobHandle, RenderService};
use crate::timeline::WordPair;
use crate::word_source::{WordPairSource, WordQuery};

/// How often and how patiently to call a collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub backoff_base_ms: u64,
    /// Upper bound for a single attempt
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base_ms: u64, timeout: Duration) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
            timeout,
        }
    }

    /// Single attempt, no backoff
    pub fn no_retry(timeout: Duration) -> Self {
        Self::new(0, 0, timeout)
    }

    /// Delay before retry number `attempt` (1-based), without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << exponent))
    }

    /// Run `operation` under this policy.
    ///
    /// `should_retry` decides which failures are worth repeating.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        should_retry: impl Fn(&ProviderError) -> bool,
        mut operation: F,
    ) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(format!(
                    "{} did not answer within {:?}",
                    label, self.timeout
                ))),
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if attempt >= self.max_retries || !should_retry(&error) {
                return Err(error);
            }

            attempt += 1;
            let delay = with_jitter(self.backoff(attempt));
            warn!(
                "{} failed: {} - retrying in {:?} (attempt {}/{})",
                label,
                error,
                delay,
                attempt + 1,
                self.max_retries + 1
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Add up to 25% random jitter
fn with_jitter(delay: Duration) -> Duration {
    let millis = delay.as_millis() as u64;
    if millis == 0 {
        return delay;
    }
    let jitter = rand::rng().random_range(0..=millis / 4);
    Duration::from_millis(millis + jitter)
}

/// A collaborator wrapped in a retry policy
#[derive(Debug)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: WordPairSource> WordPairSource for Retrying<T> {
    async fn generate_pairs(&self, query: &WordQuery) -> Result<Vec<WordPair>, ProviderError> {
        self.policy
            .run("Word generation", ProviderError::is_retryable, || {
                self.inner.generate_pairs(query)
            })
            .await
    }
}

#[async_trait]
impl<T: RenderService> RenderService for Retrying<T> {
    async fn submit(&self, document: &CompositionDocument) -> Result<RenderJobHandle, ProviderError> {
        // Only retry when the request never reached the renderer; otherwise a duplicate job may exist
        self.policy
            .run(
                "Render submission",
                |e| matches!(e, ProviderError::ConnectionError(_)),
                || self.inner.submit(document),
            )
            .await
    }

    async fn status(&self, job_id: &str) -> Result<MovieStatus, ProviderError> {
        self.policy
            .run("Render status", ProviderError::is_retryable, || {
                self.inner.status(job_id)
            })
            .await
    }
}
