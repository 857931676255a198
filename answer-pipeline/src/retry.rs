use std::{
    future::Future,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use common::{
    error::AppError,
    llm::{LlmClient, LlmDocument, LlmResponse},
};
use tokio_retry::RetryIf;
use tracing::warn;

/// Backoff schedule applied to rate-limited LLM calls.
///
/// `max_attempts` counts the first call. The wait before retry `n` is
/// `base_units * 2^(n-1)` units, so the defaults wait 2, 4, 8 and 16 units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_units: u64,
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_units: 2,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Waits between consecutive attempts.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let first = self
            .unit
            .checked_mul(u32::try_from(self.base_units).unwrap_or(u32::MAX))
            .unwrap_or(Duration::MAX);

        std::iter::successors(Some(first), |delay| delay.checked_mul(2))
            .take(self.max_attempts.saturating_sub(1))
    }

    /// Run `operation`, retrying only rate-limit failures along [`Self::delays`].
    ///
    /// Any other error, or the error of the final attempt, is returned as-is.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let attempts = AtomicUsize::new(0);
        let max_attempts = self.max_attempts.max(1);

        RetryIf::spawn(
            self.delays(),
            || {
                attempts.fetch_add(1, Ordering::Relaxed);
                operation()
            },
            |err: &AppError| {
                let attempt = attempts.load(Ordering::Relaxed);
                let retry = err.is_rate_limit() && attempt < max_attempts;
                if retry {
                    let retry_in_ms = self
                        .delays()
                        .nth(attempt.saturating_sub(1))
                        .map_or(0, |delay| u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
                    warn!(
                        label,
                        attempt,
                        max_attempts,
                        retry_in_ms,
                        error = %err,
                        "rate limited; backing off before retry"
                    );
                }
                retry
            },
        )
        .await
    }
}

/// Issue one LLM query, bounded by `timeout` when set.
pub(crate) async fn timed_query(
    client: &dyn LlmClient,
    prompt: &str,
    document: &LlmDocument,
    timeout: Option<Duration>,
) -> Result<LlmResponse, AppError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, client.query(prompt, document))
            .await
            .map_err(|_| {
                AppError::Timeout(format!(
                    "{} did not answer within {}ms",
                    document.name,
                    limit.as_millis()
                ))
            })?,
        None => client.query(prompt, document).await,
    }
}
