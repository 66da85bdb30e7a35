//! Blocking retry loop.

use std::time::{Duration, Instant};

use super::outcome::ExecutionOutcome;
use super::policy::{RetryConfig, RetryDecision};
use crate::control::CancelToken;

/// Runs `op` until `config.accept` holds for its result or the budget is spent.
///
/// The first attempt starts immediately. After a rejected result the loop
/// sleeps for `config.delay`, unless the next attempt would start at or past
/// the budget, in which case the last result is returned as
/// [`ExecutionOutcome::TimedOut`]. An `Err` from `op` is returned straight away
/// and never retried.
pub fn run_until<T, E, F, P>(config: &RetryConfig<P>, op: F) -> Result<ExecutionOutcome<T>, E>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&T) -> bool,
{
    run_loop(config, op, |d| {
        std::thread::sleep(d);
        false
    })
}

/// Same as [`run_until`], but the wait between attempts ends early when
/// `cancel` fires, yielding [`ExecutionOutcome::Cancelled`] with the last result.
pub fn run_until_cancelled<T, E, F, P>(
    config: &RetryConfig<P>,
    cancel: &CancelToken,
    op: F,
) -> Result<ExecutionOutcome<T>, E>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&T) -> bool,
{
    run_loop(config, op, |d| cancel.wait_timeout(d))
}

/// `wait` sleeps for the given duration and returns true if the loop should
/// stop as cancelled.
fn run_loop<T, E, F, P, W>(config: &RetryConfig<P>, mut op: F, mut wait: W) -> Result<ExecutionOutcome<T>, E>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&T) -> bool,
    W: FnMut(Duration) -> bool,
{
    let timing = config.timing();
    let start = Instant::now();
    let mut attempt = 1u32;
    loop {
        let result = op()?;
        if (config.accept)(&result) {
            tracing::debug!(attempt, elapsed = ?start.elapsed(), "result accepted");
            return Ok(ExecutionOutcome::Accepted(result));
        }
        match timing.decide(start.elapsed()) {
            RetryDecision::Stop => {
                tracing::warn!(
                    attempts = attempt,
                    budget = ?timing.budget,
                    "retry budget exhausted without an accepted result"
                );
                return Ok(ExecutionOutcome::TimedOut(result));
            }
            RetryDecision::RetryAfter(d) => {
                tracing::debug!(attempt, delay = ?d, "result rejected, retrying");
                if wait(d) {
                    tracing::debug!(attempt, "retry loop cancelled");
                    return Ok(ExecutionOutcome::Cancelled(result));
                }
                attempt += 1;
            }
        }
    }
}
