//! External command execution.
//!
//! `CommandRunner` is the seam between checks and the outside world: checks
//! build a shell string, a runner executes it and reports whether it exited
//! successfully along with its text output. `ProcessRunner` is the real
//! implementation; tests substitute scripted runners.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::control::CancelToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Exit status and combined output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Stdout followed by stderr.
    pub output: String,
}

impl CommandOutput {
    pub fn new(success: bool, output: impl Into<String>) -> Self {
        Self {
            success,
            output: output.into(),
        }
    }
}

/// The command could not produce a [`CommandOutput`] at all.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for `{command}`")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` did not finish within {timeout:?}")]
    TimedOut { command: String, timeout: Duration },
    #[error("`{command}` was cancelled")]
    Cancelled { command: String },
}

/// Runs a shell command and returns its outcome.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, RunError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &str) -> Result<CommandOutput, RunError> {
        (**self).run(command)
    }
}

/// Runs commands through `sh -c` on the local host.
///
/// With a timeout or cancel token set, the child is killed when either fires
/// and the run fails with [`RunError::TimedOut`] or [`RunError::Cancelled`].
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shell: String,
    timeout: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            timeout: None,
            cancel: None,
        }
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Kill any single command that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn wait_child(&self, command: &str, child: &mut Child) -> Result<ExitStatus, RunError> {
        let start = Instant::now();
        loop {
            let polled = child.try_wait().map_err(|source| RunError::Wait {
                command: command.to_string(),
                source,
            })?;
            if let Some(status) = polled {
                return Ok(status);
            }
            if let Some(timeout) = self.timeout {
                if start.elapsed() >= timeout {
                    kill(child);
                    return Err(RunError::TimedOut {
                        command: command.to_string(),
                        timeout,
                    });
                }
            }
            let cancelled = match &self.cancel {
                Some(token) => token.wait_timeout(POLL_INTERVAL),
                None => {
                    std::thread::sleep(POLL_INTERVAL);
                    false
                }
            };
            if cancelled {
                kill(child);
                return Err(RunError::Cancelled {
                    command: command.to_string(),
                });
            }
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, RunError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(RunError::Cancelled {
                command: command.to_string(),
            });
        }
        tracing::debug!(shell = %self.shell, command, "running command");
        let mut child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RunError::Spawn {
                command: command.to_string(),
                source,
            })?;

        // Drain both pipes on their own threads so a chatty child cannot block
        // on a full pipe while we poll for exit.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        // On timeout or cancel the readers are left detached: a grandchild of
        // the shell may still hold the pipes open.
        let status = self.wait_child(command, &mut child)?;
        let mut output = collect(stdout);
        output.push_str(&collect(stderr));

        let result = CommandOutput::new(status.success(), output);
        tracing::info!(
            "command output ({} bytes, success={}):\n{}",
            result.output.len(),
            result.success,
            result.output
        );
        Ok(result)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        // A read error just truncates the captured output.
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::warn!("failed to kill child process: {}", e);
    }
    let _ = child.wait();
}
