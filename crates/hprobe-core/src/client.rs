//! HDFS operations run through the containerized client.
//!
//! Every operation wraps an `hdfs` command in `docker run` of the client image and
//! retries it with the client's [`RetryTiming`] until the command succeeds.

use std::time::Duration;

use thiserror::Error;

use crate::control::CancelToken;
use crate::hdfs;
use crate::retry::{self, ExecutionOutcome, RetryConfig, RetryTiming};
use crate::runner::{CommandOutput, CommandRunner, RunError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("{what}: no successful result within {budget:?}")]
    TimedOut { what: String, budget: Duration },
    #[error("{what}: cancelled")]
    Cancelled { what: String },
    #[error("failed to determine active name node")]
    NoActiveNameNode,
}

/// Runs HDFS commands for one service through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct HdfsClient<R> {
    runner: R,
    service_name: String,
    image: String,
    timing: RetryTiming,
    cancel: Option<CancelToken>,
}

impl<R: CommandRunner> HdfsClient<R> {
    pub fn new(runner: R, service_name: impl Into<String>) -> Self {
        Self {
            runner,
            service_name: service_name.into(),
            image: hdfs::DEFAULT_DOCKER_IMAGE.to_string(),
            timing: RetryTiming::default(),
            cancel: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_timing(mut self, timing: RetryTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Stop waiting between attempts once `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn timing(&self) -> RetryTiming {
        self.timing
    }

    /// The exact shell line used to run `command` in the client container.
    pub fn container_command(&self, command: &str) -> String {
        hdfs::docker_run(&self.service_name, &self.image, command)
    }

    /// Run `command` in the client container until it exits successfully or
    /// the budget runs out. The outcome carries the last output either way.
    pub fn run_hdfs_command(&self, command: &str) -> Result<ExecutionOutcome<CommandOutput>, RunError> {
        let full = self.container_command(command);
        self.retry(|out: &CommandOutput| out.success, || self.runner.run(&full))
    }

    pub fn write_data(&self, filename: &str, content: &str) -> Result<bool, RunError> {
        Ok(self
            .run_hdfs_command(&hdfs::write(content, filename))?
            .is_accepted())
    }

    /// True when the file could be read and its content matches `expected`.
    pub fn read_data(&self, filename: &str, expected: &str) -> Result<bool, RunError> {
        let outcome = self.run_hdfs_command(&hdfs::read(filename))?;
        Ok(outcome.is_accepted() && outcome.last().output.trim_end() == expected)
    }

    pub fn delete_data(&self, filename: &str) -> Result<bool, RunError> {
        Ok(self
            .run_hdfs_command(&hdfs::delete(filename))?
            .is_accepted())
    }

    pub fn write_large_data(&self, filename: &str) -> Result<bool, RunError> {
        let cmd = hdfs::write_from_url(hdfs::TEST_CONTENT_LARGE_SOURCE, filename);
        Ok(self.run_hdfs_command(&cmd)?.is_accepted())
    }

    /// HA state (`active`, `standby`) reported for `name_node`.
    pub fn name_node_status(&self, name_node: &str) -> Result<String, ClientError> {
        let full = self.container_command(&hdfs::service_state(name_node));
        let outcome = self.retry(
            |state: &String| !state.is_empty(),
            || -> Result<String, RunError> {
                let out = self.runner.run(&full)?;
                Ok(if out.success {
                    last_line(&out.output).to_string()
                } else {
                    String::new()
                })
            },
        )?;
        let what = format!("service state of {}", name_node);
        self.require(outcome, what)
    }

    /// The first name node reporting `active`.
    pub fn active_name_node(&self) -> Result<&'static str, ClientError> {
        for name_node in hdfs::NAME_NODES {
            let status = self.name_node_status(name_node)?;
            tracing::debug!(name_node, %status, "name node status");
            if status == "active" {
                return Ok(name_node);
            }
        }
        Err(ClientError::NoActiveNameNode)
    }

    /// Turn a non-accepted outcome into the matching error.
    fn require<T>(&self, outcome: ExecutionOutcome<T>, what: String) -> Result<T, ClientError> {
        match outcome {
            ExecutionOutcome::Accepted(t) => Ok(t),
            ExecutionOutcome::TimedOut(_) => Err(ClientError::TimedOut {
                what,
                budget: self.timing.budget,
            }),
            ExecutionOutcome::Cancelled(_) => Err(ClientError::Cancelled { what }),
        }
    }

    fn retry<T, E, F, P>(&self, accept: P, op: F) -> Result<ExecutionOutcome<T>, E>
    where
        F: FnMut() -> Result<T, E>,
        P: Fn(&T) -> bool,
    {
        let config = RetryConfig::new(self.timing, accept);
        match &self.cancel {
            Some(token) => retry::run_until_cancelled(&config, token, op),
            None => retry::run_until(&config, op),
        }
    }
}

/// Tool output may be preceded by log noise; the answer is the last line.
fn last_line(output: &str) -> &str {
    output
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_line_skips_trailing_blank_lines() {
        assert_eq!(last_line("log noise\nactive\n\n"), "active");
        assert_eq!(last_line("  standby  "), "standby");
        assert_eq!(last_line(""), "");
    }
}
