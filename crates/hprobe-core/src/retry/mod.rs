//! Bounded retry with result-based acceptance.
//!
//! An operation is run immediately, then re-run after a fixed delay for as
//! long as the acceptance predicate rejects its result and the wall-clock
//! budget (measured from the first attempt) allows another attempt. Errors
//! returned by the operation itself are never retried; they propagate to the
//! caller as-is.

mod error;
mod outcome;
mod policy;
mod run;
mod run_async;

pub use error::{RetryConfigError, RetryError};
pub use outcome::ExecutionOutcome;
pub use policy::{RetryConfig, RetryDecision, RetryTiming};
pub use run::{run_until, run_until_cancelled};
pub use run_async::run_until_async;
