//! Tests for global overrides.

use super::parse_cli;
use hprobe_core::config::{HprobeConfig, RetrySettings};
use std::time::Duration;

#[test]
fn cli_parse_global_flags_after_subcommand() {
    let cli = parse_cli(&[
        "hprobe",
        "status",
        "name-1-node",
        "--delay",
        "0.5",
        "--budget",
        "10",
        "--service-name",
        "hdfs2",
    ]);
    assert_eq!(cli.global.delay, Some(0.5));
    assert_eq!(cli.global.budget, Some(10.0));
    assert_eq!(cli.global.service_name.as_deref(), Some("hdfs2"));
    assert!(cli.global.config.is_none());
}

#[test]
fn timing_without_overrides_uses_config() {
    let cli = parse_cli(&["hprobe", "active-name-node"]);
    let mut cfg = HprobeConfig::default();
    cfg.retry = Some(RetrySettings {
        delay_secs: 2.0,
        budget_secs: 20.0,
    });
    let timing = cli.global.timing(&cfg).unwrap();
    assert_eq!(timing.delay, Duration::from_secs(2));
    assert_eq!(timing.budget, Duration::from_secs(20));
}

#[test]
fn timing_overrides_only_given_fields() {
    let cli = parse_cli(&["hprobe", "--budget", "30", "active-name-node"]);
    let timing = cli.global.timing(&HprobeConfig::default()).unwrap();
    assert_eq!(timing.delay, Duration::from_secs(1));
    assert_eq!(timing.budget, Duration::from_secs(30));
}

#[test]
fn timing_override_below_delay_is_rejected() {
    let cli = parse_cli(&["hprobe", "--delay", "5", "--budget", "1", "active-name-node"]);
    assert!(cli.global.timing(&HprobeConfig::default()).is_err());
}
