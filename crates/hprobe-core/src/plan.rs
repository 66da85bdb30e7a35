//! Deployment and recovery plan waits, and the combined health check.
//!
//! Plan status comes from the service CLI as JSON, e.g.
//! `{"status": "IN_PROGRESS", "phases": [{"name": "data", "status": "PENDING"}]}`.
//! While the scheduler restarts, the plan command may fail; such attempts are
//! retried like a plan that has not reached the wanted state.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::control::CancelToken;
use crate::retry::{self, ExecutionOutcome, RetryConfig, RetryTiming};
use crate::runner::CommandRunner;
use crate::tasks::{self, TaskError};

pub const STATUS_COMPLETE: &str = "COMPLETE";

/// Statuses of a plan that has been picked up but not finished.
const STATUS_ACTIVE: [&str; 3] = ["PENDING", "STARTING", "IN_PROGRESS"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Phase {
    pub name: String,
    pub status: String,
}

/// One plan as reported by the service CLI. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanStatus {
    pub status: String,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl PlanStatus {
    pub fn is_complete(&self) -> bool {
        self.status == STATUS_COMPLETE
    }

    /// Recovery has been kicked off once the plan holds a phase or is active.
    /// An idle recovery plan is `COMPLETE` with no phases.
    pub fn has_started(&self) -> bool {
        !self.phases.is_empty() || STATUS_ACTIVE.contains(&self.status.as_str())
    }
}

pub fn parse_plan(json: &str) -> Result<PlanStatus, serde_json::Error> {
    serde_json::from_str(json.trim())
}

/// Poll `plan_command` until `accept` holds for the reported plan.
///
/// The outcome carries the last plan seen, or `None` if the command never
/// succeeded.
pub fn wait_for_plan<R, P>(
    runner: &R,
    plan_command: &str,
    accept: P,
    timing: RetryTiming,
    cancel: Option<&CancelToken>,
) -> Result<ExecutionOutcome<Option<PlanStatus>>, TaskError>
where
    R: CommandRunner,
    P: Fn(&PlanStatus) -> bool,
{
    let config = RetryConfig::new(timing, |plan: &Option<PlanStatus>| {
        plan.as_ref().is_some_and(&accept)
    });
    let op = || -> Result<Option<PlanStatus>, TaskError> {
        let out = runner.run(plan_command)?;
        if !out.success {
            tracing::debug!(command = plan_command, "plan status unavailable");
            return Ok(None);
        }
        let plan = parse_plan(&out.output)?;
        tracing::debug!(status = %plan.status, phases = plan.phases.len(), "plan status");
        Ok(Some(plan))
    };
    match cancel {
        Some(token) => retry::run_until_cancelled(&config, token, op),
        None => retry::run_until(&config, op),
    }
}

/// Step of [`check_healthy`] that failed to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStage {
    DeploymentComplete,
    RecoveryStarted,
    RecoveryComplete,
    TasksRunning,
}

impl fmt::Display for HealthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealthStage::DeploymentComplete => "deployment plan completion",
            HealthStage::RecoveryStarted => "recovery plan start",
            HealthStage::RecoveryComplete => "recovery plan completion",
            HealthStage::TasksRunning => "running tasks",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum HealthError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("timed out after {budget:?} waiting for {stage}")]
    TimedOut { stage: HealthStage, budget: Duration },
    #[error("cancelled while waiting for {stage}")]
    Cancelled { stage: HealthStage },
}

/// Commands and expectations for a health check.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub deploy_plan_command: String,
    pub recovery_plan_command: String,
    pub task_list_command: String,
    /// Tasks that must be running at the end.
    pub task_count: usize,
    /// Also wait for a recovery to be kicked off before waiting for it to finish.
    pub recovery_expected: bool,
}

/// Wait for the deploy plan to complete, optionally for a recovery to start,
/// for the recovery plan to complete, then for `task_count` running tasks.
///
/// Plan waits use `plan_timing`; the task wait uses `task_timing`.
pub fn check_healthy<R: CommandRunner>(
    runner: &R,
    check: &HealthCheck,
    plan_timing: RetryTiming,
    task_timing: RetryTiming,
    cancel: Option<&CancelToken>,
) -> Result<(), HealthError> {
    let deploy = wait_for_plan(
        runner,
        &check.deploy_plan_command,
        PlanStatus::is_complete,
        plan_timing,
        cancel,
    )?;
    require(deploy, HealthStage::DeploymentComplete, plan_timing)?;

    if check.recovery_expected {
        let started = wait_for_plan(
            runner,
            &check.recovery_plan_command,
            PlanStatus::has_started,
            plan_timing,
            cancel,
        )?;
        require(started, HealthStage::RecoveryStarted, plan_timing)?;
    }

    let recovered = wait_for_plan(
        runner,
        &check.recovery_plan_command,
        PlanStatus::is_complete,
        plan_timing,
        cancel,
    )?;
    require(recovered, HealthStage::RecoveryComplete, plan_timing)?;

    let running = tasks::wait_for_running(
        runner,
        &check.task_list_command,
        check.task_count,
        task_timing,
        cancel,
    )?;
    require(running, HealthStage::TasksRunning, task_timing)?;
    tracing::info!(tasks = check.task_count, "service healthy");
    Ok(())
}

fn require<T>(outcome: ExecutionOutcome<T>, stage: HealthStage, timing: RetryTiming) -> Result<T, HealthError> {
    match outcome {
        ExecutionOutcome::Accepted(t) => Ok(t),
        ExecutionOutcome::TimedOut(_) => Err(HealthError::TimedOut {
            stage,
            budget: timing.budget,
        }),
        ExecutionOutcome::Cancelled(_) => Err(HealthError::Cancelled { stage }),
    }
}
