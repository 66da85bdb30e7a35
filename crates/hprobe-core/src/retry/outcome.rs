//! Final answer of a retry loop.

use std::time::Duration;

use super::error::RetryError;

/// How a retry loop ended. Every variant carries the last result the
/// operation produced, so a timeout can still be diagnosed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome<T> {
    /// The acceptance predicate held for this result.
    Accepted(T),
    /// The budget ran out; this is the last rejected result.
    TimedOut(T),
    /// The cancel token fired while waiting between attempts.
    Cancelled(T),
}

impl<T> ExecutionOutcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ExecutionOutcome::Accepted(_))
    }

    /// Last result produced by the operation, whatever the outcome.
    pub fn last(&self) -> &T {
        match self {
            ExecutionOutcome::Accepted(t)
            | ExecutionOutcome::TimedOut(t)
            | ExecutionOutcome::Cancelled(t) => t,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            ExecutionOutcome::Accepted(t)
            | ExecutionOutcome::TimedOut(t)
            | ExecutionOutcome::Cancelled(t) => t,
        }
    }

    /// Turn a non-accepted outcome into an error. `budget` is only used for the
    /// error message.
    pub fn into_accepted(self, budget: Duration) -> Result<T, RetryError> {
        match self {
            ExecutionOutcome::Accepted(t) => Ok(t),
            ExecutionOutcome::TimedOut(_) => Err(RetryError::TimedOut { budget }),
            ExecutionOutcome::Cancelled(_) => Err(RetryError::Cancelled),
        }
    }
}
