//! Errors for retry timing validation and hard-failure conversion.

use std::time::Duration;
use thiserror::Error;

/// Rejected retry timing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryConfigError {
    /// A zero delay would make the loop spin.
    #[error("retry delay must be greater than zero")]
    ZeroDelay,
    /// With a budget shorter than the delay, only one attempt could ever run.
    #[error("retry budget {budget:?} is shorter than the delay {delay:?}")]
    BudgetBelowDelay { delay: Duration, budget: Duration },
    /// Non-finite or negative seconds in a config file.
    #[error("invalid duration for {field}: {value}")]
    InvalidSeconds { field: &'static str, value: f64 },
}

/// Returned by [`ExecutionOutcome::into_accepted`](super::ExecutionOutcome::into_accepted)
/// when the caller treats anything but acceptance as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("no acceptable result within {budget:?}")]
    TimedOut { budget: Duration },
    #[error("retry loop cancelled before an acceptable result")]
    Cancelled,
}
