use std::time::Duration;

use super::error::RetryConfigError;

/// Decision taken after an attempt whose result was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The next attempt would start at or past the budget.
    Stop,
    /// Sleep for the given delay, then try again.
    RetryAfter(Duration),
}

/// Fixed-delay timing for a retry loop.
///
/// `budget` is measured from the start of the first attempt. Fields are public
/// so a degenerate timing (budget shorter than delay) can still be built by
/// hand; such a loop makes exactly one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTiming {
    /// Pause between the end of one attempt and the start of the next.
    pub delay: Duration,
    /// Total wall-clock allowance for the loop.
    pub budget: Duration,
}

impl Default for RetryTiming {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            budget: Duration::from_secs(5 * 60),
        }
    }
}

impl RetryTiming {
    /// Validated constructor: `delay > 0` and `budget >= delay`.
    pub fn new(delay: Duration, budget: Duration) -> Result<Self, RetryConfigError> {
        if delay.is_zero() {
            return Err(RetryConfigError::ZeroDelay);
        }
        if budget < delay {
            return Err(RetryConfigError::BudgetBelowDelay { delay, budget });
        }
        Ok(Self { delay, budget })
    }

    /// Build from fractional seconds (config files, CLI flags).
    pub fn from_secs_f64(delay_secs: f64, budget_secs: f64) -> Result<Self, RetryConfigError> {
        let delay = secs("delay_secs", delay_secs)?;
        let budget = secs("budget_secs", budget_secs)?;
        Self::new(delay, budget)
    }

    /// Decide whether another attempt fits, given the time elapsed since the
    /// first attempt started.
    pub fn decide(&self, elapsed: Duration) -> RetryDecision {
        if elapsed.saturating_add(self.delay) >= self.budget {
            RetryDecision::Stop
        } else {
            RetryDecision::RetryAfter(self.delay)
        }
    }

    /// Pair this timing with an acceptance predicate.
    pub fn accept_when<P>(self, accept: P) -> RetryConfig<P> {
        RetryConfig::new(self, accept)
    }
}

fn secs(field: &'static str, value: f64) -> Result<Duration, RetryConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| RetryConfigError::InvalidSeconds { field, value })
}

/// Per-call retry configuration: timing plus the predicate that ends the loop.
#[derive(Clone)]
pub struct RetryConfig<P> {
    pub delay: Duration,
    pub budget: Duration,
    /// Returns true when a result is good enough to stop retrying.
    pub accept: P,
}

impl<P> RetryConfig<P> {
    pub fn new(timing: RetryTiming, accept: P) -> Self {
        Self {
            delay: timing.delay,
            budget: timing.budget,
            accept,
        }
    }

    pub fn timing(&self) -> RetryTiming {
        RetryTiming {
            delay: self.delay,
            budget: self.budget,
        }
    }
}

impl<P> std::fmt::Debug for RetryConfig<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryConfig")
            .field("delay", &self.delay)
            .field("budget", &self.budget)
            .field("accept", &"<predicate>")
            .finish()
    }
}
