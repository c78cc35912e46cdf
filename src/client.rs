//! The configured client a test issues its HTTP calls through.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, VcrError};
use crate::ports::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Status codes the retry policy treats as transient.
const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

/// Bounded retry with exponential backoff.
///
/// Retried attempts go back through the transport, so in recording mode
/// every attempt lands in the cassette and replay walks the same sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles after each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_millis(200) }
    }
}

impl RetryPolicy {
    /// A policy that sends each request exactly once.
    #[must_use]
    pub fn none() -> Self {
        Self { max_attempts: 1, base_delay: Duration::ZERO }
    }

    /// The same attempt budget with no wait between attempts.
    #[must_use]
    pub fn without_delay(self) -> Self {
        Self { base_delay: Duration::ZERO, ..self }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// HTTP client bound to one test's transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
}

impl Client {
    /// Creates a client with the default retry policy.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, retry: RetryPolicy::default() }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Retry policy in effect.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends a request, retrying transient failures.
    ///
    /// The last retryable response is returned once attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the last attempt, or the first
    /// non-retryable one.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut attempt = 1;
        loop {
            let result = self.transport.send(request.clone()).await;
            let retry = match &result {
                Ok(response) => RETRYABLE_STATUSES.contains(&response.status),
                Err(err) => err.is_retryable(),
            };
            if !retry || attempt >= self.retry.max_attempts {
                return result;
            }

            let delay = self.retry.delay_for(attempt);
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt,
                ?delay,
                "retrying request"
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    /// Sends a `GET` request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, url: impl Into<String>) -> Result<HttpResponse> {
        self.send(HttpRequest::new("GET", url)).await
    }

    /// Sends a `POST` request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: impl Into<String>,
        body: &T,
    ) -> Result<HttpResponse> {
        let body = serde_json::to_vec(body)
            .map_err(|e| VcrError::InvalidRequest(format!("failed to encode JSON body: {e}")))?;
        let request = HttpRequest::new("POST", url)
            .with_header("Content-Type", "application/json")
            .with_body(body);
        self.send(request).await
    }
}
