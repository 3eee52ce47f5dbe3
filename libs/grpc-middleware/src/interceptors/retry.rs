//! Retry of unary client calls on transient failures.
//!
//! Only [`Code::Unavailable`] and [`Code::DeadlineExceeded`] are retried.
//! Everything else is returned on the first attempt.
//!
//! **Retried calls must be idempotent.** Each retry re-runs every interceptor
//! that follows this one, then the invoker, with a clone of the original call.

use std::time::Duration;

use figment::Figment;
use futures::future::BoxFuture;
use grpc_credential::ConfigError;
use serde::{Deserialize, Serialize};
use tonic::{Code, Status};

use crate::chain::{Interceptor, Next};
use crate::shape::{UnaryClient, UnaryClientCall};

fn duration_to_i64_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Retry policy.
///
/// ```yaml
/// retry:
///   max_retries: 3
///   base_backoff_ms: 100
///   max_backoff_ms: 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[must_use]
pub struct RetryConfig {
    /// Retries after the initial attempt.
    pub max_retries: u32,

    /// The backoff before retry `n` is `base_backoff_ms * n`, capped at
    /// `max_backoff_ms`.
    pub base_backoff_ms: u64,

    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 100,
            max_backoff_ms: 5_000,
        }
    }
}

impl RetryConfig {
    pub const SECTION: &'static str = "retry";

    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_base_backoff(mut self, duration: Duration) -> Self {
        self.base_backoff_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Extract the `retry` section, falling back to defaults when absent.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the section does not match the expected
    /// shape.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        if !figment.contains(Self::SECTION) {
            return Ok(Self::default());
        }
        Ok(figment.extract_inner(Self::SECTION)?)
    }

    /// Backoff before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let millis = self
            .base_backoff_ms
            .saturating_mul(u64::from(attempt))
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

fn is_retryable(code: Code) -> bool {
    matches!(code, Code::Unavailable | Code::DeadlineExceeded)
}

/// Re-runs the remainder of the chain on transient failures.
///
/// Backoff sleeps end early when the call is cancelled. No retry is started
/// once the call deadline has passed.
#[derive(Debug, Clone, Default)]
pub struct RetryInterceptor {
    config: RetryConfig,
}

impl RetryInterceptor {
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl<Req, Reply> Interceptor<UnaryClient<Req, Reply>> for RetryInterceptor
where
    Req: Clone + Send + 'static,
    Reply: Send + 'static,
{
    fn intercept<'a>(
        &'a self,
        call: UnaryClientCall<Req>,
        _info: &'a (),
        next: Next<'a, UnaryClient<Req, Reply>>,
    ) -> BoxFuture<'a, Result<Reply, Status>> {
        Box::pin(async move {
            let mut attempt: u32 = 0;
            loop {
                attempt = attempt.saturating_add(1);
                let status = match next.run(call.clone()).await {
                    Ok(reply) => {
                        if attempt > 1 {
                            tracing::info!(
                                method = %call.method,
                                attempt,
                                "gRPC call succeeded after retries"
                            );
                        }
                        return Ok(reply);
                    }
                    Err(status) => status,
                };

                let code = status.code();
                if !is_retryable(code) {
                    return Err(status);
                }
                let exhausted = attempt > self.config.max_retries;
                if exhausted || call.ctx.is_cancelled() || call.ctx.is_expired() {
                    tracing::error!(
                        method = %call.method,
                        attempt,
                        code = ?code,
                        "gRPC call giving up"
                    );
                    return Err(status);
                }

                let backoff = self.config.backoff_for(attempt);
                tracing::debug!(
                    method = %call.method,
                    attempt,
                    code = ?code,
                    backoff_ms = duration_to_i64_ms(backoff),
                    "Retrying gRPC call after backoff"
                );

                tokio::select! {
                    () = tokio::time::sleep(backoff) => {}
                    () = call.ctx.cancellation_token().cancelled() => {
                        tracing::debug!(
                            method = %call.method,
                            attempt,
                            "gRPC call cancelled during backoff"
                        );
                        return Err(Status::cancelled("call cancelled while waiting to retry"));
                    }
                }
            }
        })
    }
}
