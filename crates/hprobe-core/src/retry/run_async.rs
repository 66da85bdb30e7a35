//! Async flavour of the retry loop for operations that are futures.

use std::future::Future;

use tokio::time::Instant;

use super::outcome::ExecutionOutcome;
use super::policy::{RetryConfig, RetryDecision};

/// Async counterpart of [`run_until`](super::run_until): same budget and delay
/// rules, suspending on `tokio::time::sleep` instead of blocking the thread.
pub async fn run_until_async<T, E, F, Fut, P>(
    config: &RetryConfig<P>,
    mut op: F,
) -> Result<ExecutionOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
{
    let timing = config.timing();
    let start = Instant::now();
    let mut attempt = 1u32;
    loop {
        let result = op().await?;
        if (config.accept)(&result) {
            tracing::debug!(attempt, "result accepted");
            return Ok(ExecutionOutcome::Accepted(result));
        }
        match timing.decide(start.elapsed()) {
            RetryDecision::Stop => {
                tracing::warn!(attempts = attempt, budget = ?timing.budget, "retry budget exhausted");
                return Ok(ExecutionOutcome::TimedOut(result));
            }
            RetryDecision::RetryAfter(d) => {
                tokio::time::sleep(d).await;
                attempt += 1;
            }
        }
    }
}
