//! `hprobe check-running` – wait until enough tasks are running.

use anyhow::{Context, Result};
use hprobe_core::retry::RetryTiming;
use hprobe_core::runner::CommandRunner;
use hprobe_core::tasks;

pub fn run_check_running<R: CommandRunner>(
    runner: &R,
    list_command: &str,
    count: usize,
    timing: RetryTiming,
) -> Result<()> {
    let outcome = tasks::wait_for_running(runner, list_command, count, timing, None)?;
    let running = *outcome.last();
    outcome
        .into_accepted(timing.budget)
        .with_context(|| format!("{}/{} tasks running", running, count))?;
    println!("{}/{} tasks running", running, count);
    Ok(())
}
