use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::hdfs;
use crate::retry::RetryTiming;

/// Retry timing parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Delay in seconds between attempts (e.g. 0.5 = 500ms).
    pub delay_secs: f64,
    /// Total budget in seconds for one retried check.
    pub budget_secs: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            delay_secs: 1.0,
            budget_secs: 5.0 * 60.0,
        }
    }
}

/// Deployments and recoveries of a full HDFS cluster can take a long time.
const DEFAULT_PLAN_BUDGET_SECS: f64 = 25.0 * 60.0;

fn default_deploy_plan_command() -> String {
    "dcos hdfs --name=hdfs plan status deploy --json".to_string()
}

fn default_recovery_plan_command() -> String {
    "dcos hdfs --name=hdfs plan status recovery --json".to_string()
}

/// Global configuration loaded from `~/.config/hprobe/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HprobeConfig {
    /// Service name passed to the client container as `HDFS_SERVICE_NAME`.
    pub service_name: String,
    /// HDFS client image used for every `docker run`.
    pub docker_image: String,
    /// Number of tasks expected to be running in a healthy deployment.
    pub task_count: usize,
    /// Command printing the service's pods as a JSON array of names.
    pub pod_list_command: String,
    /// Command printing tasks as a JSON array of `{name, state}` objects.
    pub task_list_command: String,
    /// Command printing the deploy plan status as JSON.
    #[serde(default = "default_deploy_plan_command")]
    pub deploy_plan_command: String,
    /// Command printing the recovery plan status as JSON.
    #[serde(default = "default_recovery_plan_command")]
    pub recovery_plan_command: String,
    /// Budget in seconds for each plan wait of a health check (None = 25 minutes).
    #[serde(default)]
    pub plan_budget_secs: Option<f64>,
    /// Kill any single command running longer than this (None = no limit).
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,
    /// Optional retry timing; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
}

impl Default for HprobeConfig {
    fn default() -> Self {
        Self {
            service_name: "hdfs".to_string(),
            docker_image: hdfs::DEFAULT_DOCKER_IMAGE.to_string(),
            task_count: hdfs::DEFAULT_TASK_COUNT,
            pod_list_command: "dcos hdfs --name=hdfs pod list --json".to_string(),
            task_list_command: "dcos task --json".to_string(),
            deploy_plan_command: default_deploy_plan_command(),
            recovery_plan_command: default_recovery_plan_command(),
            plan_budget_secs: None,
            command_timeout_secs: None,
            retry: None,
        }
    }
}

impl HprobeConfig {
    /// Validated retry timing from the `[retry]` section, or the defaults.
    pub fn retry_timing(&self) -> Result<RetryTiming> {
        match &self.retry {
            Some(r) => RetryTiming::from_secs_f64(r.delay_secs, r.budget_secs)
                .context("invalid [retry] section"),
            None => Ok(RetryTiming::default()),
        }
    }

    /// Timing for plan waits: the retry delay with the plan budget.
    pub fn plan_timing(&self) -> Result<RetryTiming> {
        let delay = self.retry_timing()?.delay;
        let budget_secs = self.plan_budget_secs.unwrap_or(DEFAULT_PLAN_BUDGET_SECS);
        RetryTiming::from_secs_f64(delay.as_secs_f64(), budget_secs).context("invalid plan_budget_secs")
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hprobe")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<HprobeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = HprobeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path; the file must exist.
pub fn load_from(path: &Path) -> Result<HprobeConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HprobeConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.retry_timing()?;
    cfg.plan_timing()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = HprobeConfig::default();
        assert_eq!(cfg.service_name, "hdfs");
        assert_eq!(cfg.docker_image, "elezar/hdfs-client:dev");
        assert_eq!(cfg.task_count, 10);
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.retry_timing().unwrap(), RetryTiming::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = HprobeConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: HprobeConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.service_name, cfg.service_name);
        assert_eq!(parsed.docker_image, cfg.docker_image);
        assert_eq!(parsed.task_count, cfg.task_count);
        assert_eq!(parsed.pod_list_command, cfg.pod_list_command);
    }

    #[test]
    fn config_toml_retry_section() {
        let toml = r#"
            service_name = "data/hdfs"
            docker_image = "hdfs-client:test"
            task_count = 6
            pod_list_command = "cat pods.json"
            task_list_command = "cat tasks.json"
            command_timeout_secs = 90

            [retry]
            delay_secs = 0.5
            budget_secs = 30.0
        "#;
        let cfg: HprobeConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.task_count, 6);
        assert_eq!(cfg.command_timeout(), Some(Duration::from_secs(90)));
        let timing = cfg.retry_timing().unwrap();
        assert_eq!(timing.delay, Duration::from_millis(500));
        assert_eq!(timing.budget, Duration::from_secs(30));
    }

    #[test]
    fn retry_section_budget_below_delay_is_rejected() {
        let mut cfg = HprobeConfig::default();
        cfg.retry = Some(RetrySettings {
            delay_secs: 10.0,
            budget_secs: 1.0,
        });
        assert!(cfg.retry_timing().is_err());
    }

    #[test]
    fn load_from_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let toml = toml::to_string_pretty(&HprobeConfig::default()).unwrap();
        f.write_all(toml.as_bytes()).unwrap();
        f.flush().unwrap();
        let cfg = load_from(f.path()).unwrap();
        assert_eq!(cfg.service_name, "hdfs");
    }

    #[test]
    fn load_from_rejects_invalid_retry() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = HprobeConfig::default();
        cfg.retry = Some(RetrySettings {
            delay_secs: 0.0,
            budget_secs: 1.0,
        });
        f.write_all(toml::to_string_pretty(&cfg).unwrap().as_bytes())
            .unwrap();
        f.flush().unwrap();
        assert!(load_from(f.path()).is_err());
    }

    #[test]
    fn load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn plan_commands_default_when_missing() {
        let toml = r#"
            service_name = "hdfs"
            docker_image = "img"
            task_count = 10
            pod_list_command = "pods"
            task_list_command = "tasks"
        "#;
        let cfg: HprobeConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.deploy_plan_command, "dcos hdfs --name=hdfs plan status deploy --json");
        assert!(cfg.recovery_plan_command.ends_with("plan status recovery --json"));
        let timing = cfg.plan_timing().unwrap();
        assert_eq!(timing.delay, Duration::from_secs(1));
        assert_eq!(timing.budget, Duration::from_secs(25 * 60));
    }

    #[test]
    fn plan_timing_uses_retry_delay_and_plan_budget() {
        let mut cfg = HprobeConfig::default();
        cfg.plan_budget_secs = Some(60.0);
        cfg.retry = Some(RetrySettings {
            delay_secs: 2.0,
            budget_secs: 10.0,
        });
        let timing = cfg.plan_timing().unwrap();
        assert_eq!(timing.delay, Duration::from_secs(2));
        assert_eq!(timing.budget, Duration::from_secs(60));

        cfg.plan_budget_secs = Some(1.0);
        assert!(cfg.plan_timing().is_err());
    }
}
