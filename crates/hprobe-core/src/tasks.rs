//! Pod and task listings from the service CLI.
//!
//! The service CLI prints pods as a JSON array of names and tasks as a JSON
//! array of objects with at least `name` and `state`. Listing commands are
//! configurable and run through a [`CommandRunner`].

use serde::Deserialize;
use thiserror::Error;

use crate::control::CancelToken;
use crate::retry::{self, ExecutionOutcome, RetryConfig, RetryTiming};
use crate::runner::{CommandRunner, RunError};

pub const TASK_RUNNING: &str = "TASK_RUNNING";

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("`{command}` failed: {output}")]
    CommandFailed { command: String, output: String },
    #[error("unexpected listing output")]
    Parse(#[from] serde_json::Error),
}

/// One entry of a task listing. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    pub name: String,
    pub state: String,
}

impl Task {
    pub fn is_running(&self) -> bool {
        self.state == TASK_RUNNING
    }
}

pub fn parse_pod_list(json: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(json.trim())
}

/// Pods whose name starts with `prefix` (e.g. `data` matches `data-0`, `data-1`).
pub fn pod_type_instances<'a>(pods: &'a [String], prefix: &str) -> Vec<&'a str> {
    pods.iter()
        .map(String::as_str)
        .filter(|p| p.starts_with(prefix))
        .collect()
}

pub fn parse_task_list(json: &str) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_str(json.trim())
}

pub fn count_running(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| t.is_running()).count()
}

/// Run `list_command` once and return the pods starting with `prefix`.
pub fn list_pod_instances<R: CommandRunner>(
    runner: &R,
    list_command: &str,
    prefix: &str,
) -> Result<Vec<String>, TaskError> {
    let out = runner.run(list_command)?;
    if !out.success {
        return Err(TaskError::CommandFailed {
            command: list_command.to_string(),
            output: out.output,
        });
    }
    let pods = parse_pod_list(&out.output)?;
    Ok(pod_type_instances(&pods, prefix)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Poll `list_command` until at least `count` tasks are running.
///
/// A failing listing command counts as zero running tasks and is retried;
/// output that is not a task listing is an error. The outcome carries the last
/// observed running count.
pub fn wait_for_running<R: CommandRunner>(
    runner: &R,
    list_command: &str,
    count: usize,
    timing: RetryTiming,
    cancel: Option<&CancelToken>,
) -> Result<ExecutionOutcome<usize>, TaskError> {
    let config = RetryConfig::new(timing, |running: &usize| *running >= count);
    let op = || -> Result<usize, TaskError> {
        let out = runner.run(list_command)?;
        if !out.success {
            tracing::debug!(command = list_command, "task listing failed, counting 0 running");
            return Ok(0);
        }
        let running = count_running(&parse_task_list(&out.output)?);
        tracing::debug!(running, expected = count, "running tasks");
        Ok(running)
    };
    match cancel {
        Some(token) => retry::run_until_cancelled(&config, token, op),
        None => retry::run_until(&config, op),
    }
}
