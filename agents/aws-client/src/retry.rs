//! Retry policy for outbound calls.
//!
//! A policy decides which responses are worth another attempt (by status
//! and by HTTP method), how many attempts a call gets in total, and how long
//! to wait between them. It is handed to [`crate::SignedClient`] at
//! construction so each service chooses its own budget.

use std::future::Future;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use tracing::{error, warn};

use crate::error::{Error, Result};

/// Anything that carries an HTTP status the policy can inspect
pub trait StatusCarrier {
    fn status(&self) -> StatusCode;
}

impl StatusCarrier for reqwest::Response {
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }
}

impl StatusCarrier for StatusCode {
    fn status(&self) -> StatusCode {
        *self
    }
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Base of the exponential backoff
    pub backoff_factor: Duration,
    /// Upper bound for a single wait
    pub max_backoff: Duration,
    /// Statuses that trigger another attempt
    pub retry_statuses: Vec<StatusCode>,
    /// Methods that may be retried at all
    pub retry_methods: Vec<Method>,
}

impl RetryPolicy {
    /// Budget used against the search cluster: 6 attempts, 500/403 retried
    pub fn opensearch() -> Self {
        Self {
            max_attempts: 6,
            backoff_factor: Duration::from_secs(2),
            max_backoff: Duration::from_secs(120),
            retry_statuses: vec![StatusCode::INTERNAL_SERVER_ERROR, StatusCode::FORBIDDEN],
            retry_methods: vec![Method::PATCH, Method::PUT, Method::POST, Method::GET],
        }
    }

    /// Single attempt, never retried
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_factor: Duration::ZERO,
            max_backoff: Duration::ZERO,
            retry_statuses: Vec::new(),
            retry_methods: Vec::new(),
        }
    }

    /// Same budget, no waiting between attempts
    pub fn without_backoff(mut self) -> Self {
        self.backoff_factor = Duration::ZERO;
        self
    }

    pub fn is_retryable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    pub fn is_retryable_method(&self, method: &Method) -> bool {
        self.retry_methods.contains(method)
    }

    /// Wait before the given retry (1-based).
    ///
    /// The first retry goes out immediately, later ones wait
    /// `backoff_factor * 2^(retry - 1)`, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let multiplier = 2u32.saturating_pow(retry - 1);
        self.backoff_factor
            .saturating_mul(multiplier)
            .min(self.max_backoff)
    }

    /// Run `operation` under this policy.
    ///
    /// Returns the first response whose status is not retryable (the caller
    /// judges success), or [`Error::RetriesExhausted`] once the budget is
    /// spent on retryable statuses. Connect and timeout errors use up
    /// attempts like retryable statuses do; other transport errors are
    /// returned at once.
    pub async fn execute<F, Fut, T>(
        &self,
        method: &Method,
        operation_name: &str,
        mut operation: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
        T: StatusCarrier,
    {
        let retryable_method = self.is_retryable_method(method);
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let exhausted = !retryable_method || attempt >= max_attempts;

            match operation().await {
                Ok(response) => {
                    let status = response.status();
                    if !retryable_method || !self.is_retryable_status(status) {
                        return Ok(response);
                    }
                    if exhausted {
                        error!(
                            operation = %operation_name,
                            attempt = attempt,
                            status = %status,
                            "Request failed after max retries"
                        );
                        return Err(Error::RetriesExhausted {
                            attempts: attempt,
                            status,
                        });
                    }
                    warn!(
                        operation = %operation_name,
                        attempt = attempt,
                        status = %status,
                        "Retryable response, retrying"
                    );
                }
                Err(e) => {
                    if exhausted || !(e.is_connect() || e.is_timeout()) {
                        return Err(Error::Http(e));
                    }
                    warn!(
                        operation = %operation_name,
                        attempt = attempt,
                        error = %e,
                        "Request failed, retrying"
                    );
                }
            }

            let delay = self.backoff(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::opensearch()
    }
}
