//! CLI for hprobe.

mod commands;

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use hprobe_core::client::HdfsClient;
use hprobe_core::config::{self, HprobeConfig};
use hprobe_core::hdfs;
use hprobe_core::plan::HealthCheck;
use hprobe_core::retry::RetryTiming;
use hprobe_core::runner::ProcessRunner;
use std::path::PathBuf;

use commands::{
    run_active_name_node, run_check_healthy, run_check_running, run_delete, run_exec, run_pods, run_read, run_status,
    run_write, run_write_large,
};

/// Top-level CLI for hprobe.
#[derive(Debug, Parser)]
#[command(name = "hprobe")]
#[command(about = "hprobe: retried HDFS checks for operational testing", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Overrides applied on top of the config file.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file to use instead of ~/.config/hprobe/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seconds to wait between attempts.
    #[arg(long, global = true, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Total seconds allowed for one retried check.
    #[arg(long, global = true, value_name = "SECS")]
    pub budget: Option<f64>,

    /// HDFS service name (overrides config).
    #[arg(long, global = true)]
    pub service_name: Option<String>,

    /// Kill any single command after this many seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub command_timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Retry a raw shell command until it exits successfully.
    Exec {
        /// Command and arguments. They are joined with single spaces and
        /// re-split by `sh -c`, so quote the whole command to keep inner
        /// whitespace or shell operators intact.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Write test content to an HDFS file through the client container.
    Write {
        /// HDFS path.
        file: String,
        /// Content to write.
        #[arg(long, default_value = hdfs::TEST_CONTENT_SMALL)]
        content: String,
    },

    /// Read an HDFS file and check it holds the expected content.
    Read {
        /// HDFS path.
        file: String,
        /// Expected content.
        #[arg(long, default_value = hdfs::TEST_CONTENT_SMALL)]
        content: String,
    },

    /// Delete an HDFS file.
    Delete {
        /// HDFS path (relative to /).
        file: String,
    },

    /// Stream the large test source into an HDFS file.
    WriteLarge {
        /// HDFS path (relative to /).
        file: String,
    },

    /// Show the HA state of a name node.
    Status {
        /// Name node id, e.g. name-0-node.
        name_node: String,
    },

    /// Print which name node is active.
    ActiveNameNode,

    /// List pods whose name starts with a prefix.
    Pods {
        /// Pod type prefix.
        #[arg(value_parser = PossibleValuesParser::new(hdfs::POD_TYPES))]
        prefix: String,
        /// Command printing pods as JSON (overrides config).
        #[arg(long)]
        list_command: Option<String>,
    },

    /// Wait until enough tasks are running.
    CheckRunning {
        /// Expected running tasks (default from config).
        #[arg(long)]
        count: Option<usize>,
        /// Command printing tasks as JSON (overrides config).
        #[arg(long)]
        list_command: Option<String>,
    },

    /// Wait for deployment and recovery plans to complete and tasks to run.
    CheckHealthy {
        /// Wait for a recovery to be kicked off before waiting for it to finish.
        #[arg(long)]
        recovery_expected: bool,
        /// Expected running tasks (default from config).
        #[arg(long)]
        count: Option<usize>,
    },
}

impl GlobalArgs {
    fn load_config(&self) -> Result<HprobeConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        if let Some(name) = &self.service_name {
            cfg.service_name = name.clone();
        }
        if let Some(secs) = self.command_timeout {
            cfg.command_timeout_secs = Some(secs);
        }
        Ok(cfg)
    }

    /// Config timing with any `--delay` / `--budget` overrides applied.
    fn timing(&self, cfg: &HprobeConfig) -> Result<RetryTiming> {
        let base = cfg.retry_timing()?;
        if self.delay.is_none() && self.budget.is_none() {
            return Ok(base);
        }
        let delay = self.delay.unwrap_or(base.delay.as_secs_f64());
        let budget = self.budget.unwrap_or(base.budget.as_secs_f64());
        Ok(RetryTiming::from_secs_f64(delay, budget)?)
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.global.load_config()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let timing = cli.global.timing(&cfg)?;

        let mut runner = ProcessRunner::new();
        if let Some(timeout) = cfg.command_timeout() {
            runner = runner.with_timeout(timeout);
        }
        let client = HdfsClient::new(runner.clone(), cfg.service_name.as_str())
            .with_image(cfg.docker_image.as_str())
            .with_timing(timing);

        match cli.command {
            CliCommand::Exec { command } => run_exec(&runner, timing, &command)?,
            CliCommand::Write { file, content } => run_write(&client, &file, &content)?,
            CliCommand::Read { file, content } => run_read(&client, &file, &content)?,
            CliCommand::Delete { file } => run_delete(&client, &file)?,
            CliCommand::WriteLarge { file } => run_write_large(&client, &file)?,
            CliCommand::Status { name_node } => run_status(&client, &name_node)?,
            CliCommand::ActiveNameNode => run_active_name_node(&client)?,
            CliCommand::Pods {
                prefix,
                list_command,
            } => {
                let cmd = list_command.unwrap_or(cfg.pod_list_command);
                run_pods(&runner, &cmd, &prefix)?;
            }
            CliCommand::CheckRunning {
                count,
                list_command,
            } => {
                let cmd = list_command.unwrap_or(cfg.task_list_command);
                run_check_running(&runner, &cmd, count.unwrap_or(cfg.task_count), timing)?;
            }
            CliCommand::CheckHealthy {
                recovery_expected,
                count,
            } => {
                let plan_timing = RetryTiming::new(timing.delay, cfg.plan_timing()?.budget)?;
                let check = HealthCheck {
                    deploy_plan_command: cfg.deploy_plan_command,
                    recovery_plan_command: cfg.recovery_plan_command,
                    task_list_command: cfg.task_list_command,
                    task_count: count.unwrap_or(cfg.task_count),
                    recovery_expected,
                };
                run_check_healthy(&runner, &check, plan_timing, timing)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
