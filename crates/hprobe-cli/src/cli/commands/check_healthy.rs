//! `hprobe check-healthy` – plans complete and tasks running.

use anyhow::Result;
use hprobe_core::plan::{self, HealthCheck};
use hprobe_core::retry::RetryTiming;
use hprobe_core::runner::CommandRunner;

pub fn run_check_healthy<R: CommandRunner>(
    runner: &R,
    check: &HealthCheck,
    plan_timing: RetryTiming,
    task_timing: RetryTiming,
) -> Result<()> {
    plan::check_healthy(runner, check, plan_timing, task_timing, None)?;
    if check.recovery_expected {
        println!("recovered; {} tasks running", check.task_count);
    } else {
        println!("healthy; {} tasks running", check.task_count);
    }
    Ok(())
}
