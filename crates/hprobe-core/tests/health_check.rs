//! Plan waits and the combined health check against a scripted runner.

mod common;

use std::time::Duration;

use common::ScriptedRunner;
use hprobe_core::control::CancelToken;
use hprobe_core::plan::{self, HealthCheck, HealthError, HealthStage, PlanStatus};
use hprobe_core::retry::{ExecutionOutcome, RetryTiming};
use hprobe_core::runner::CommandOutput;
use hprobe_core::tasks::TaskError;

const DEPLOY_COMPLETE: &str = r#"{"status": "COMPLETE", "phases": [{"name": "journal", "status": "COMPLETE"}]}"#;
const DEPLOY_IN_PROGRESS: &str = r#"{"status": "IN_PROGRESS", "phases": [{"name": "data", "status": "STARTING"}]}"#;
const RECOVERY_IDLE: &str = r#"{"status": "COMPLETE", "phases": []}"#;
const RECOVERY_RUNNING: &str = r#"{"status": "IN_PROGRESS", "phases": [{"name": "name-0", "status": "IN_PROGRESS"}]}"#;
const RECOVERY_DONE: &str = r#"{"status": "COMPLETE", "phases": [{"name": "name-0", "status": "COMPLETE"}]}"#;
const TWO_RUNNING: &str = r#"[
    {"name": "data-0-node", "state": "TASK_RUNNING"},
    {"name": "name-0-node", "state": "TASK_RUNNING"}
]"#;

fn fast() -> RetryTiming {
    RetryTiming::new(Duration::from_millis(5), Duration::from_millis(200)).unwrap()
}

fn check(recovery_expected: bool) -> HealthCheck {
    HealthCheck {
        deploy_plan_command: "plan deploy".to_string(),
        recovery_plan_command: "plan recovery".to_string(),
        task_list_command: "task list".to_string(),
        task_count: 2,
        recovery_expected,
    }
}

#[test]
fn wait_for_plan_retries_failed_command_and_incomplete_plan() {
    let runner = ScriptedRunner::new(CommandOutput::new(true, DEPLOY_COMPLETE))
        .then_ok(false, "503 Service Unavailable")
        .then_ok(true, DEPLOY_IN_PROGRESS);
    let outcome =
        plan::wait_for_plan(&runner, "plan deploy", PlanStatus::is_complete, fast(), None).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.last().as_ref().map(|p| p.status.as_str()), Some("COMPLETE"));
    assert_eq!(runner.calls(), 3);
}

#[test]
fn wait_for_plan_times_out_without_any_plan() {
    let runner = ScriptedRunner::new(CommandOutput::new(false, "unreachable"));
    let timing = RetryTiming::new(Duration::from_millis(5), Duration::from_millis(20)).unwrap();
    let outcome =
        plan::wait_for_plan(&runner, "plan deploy", PlanStatus::is_complete, timing, None).unwrap();
    assert_eq!(outcome, ExecutionOutcome::TimedOut(None));
}

#[test]
fn wait_for_plan_rejects_garbage_output() {
    let runner = ScriptedRunner::new(CommandOutput::new(true, "<html>"));
    let err = plan::wait_for_plan(&runner, "plan deploy", PlanStatus::is_complete, fast(), None)
        .unwrap_err();
    assert!(matches!(err, TaskError::Parse(_)));
}

#[test]
fn healthy_service_without_recovery() {
    let runner = ScriptedRunner::new(CommandOutput::new(true, TWO_RUNNING))
        .then_ok(true, DEPLOY_IN_PROGRESS)
        .then_ok(true, DEPLOY_COMPLETE)
        .then_ok(true, RECOVERY_IDLE);
    plan::check_healthy(&runner, &check(false), fast(), fast(), None).unwrap();
    let commands = runner.commands.borrow();
    assert_eq!(
        *commands,
        vec!["plan deploy", "plan deploy", "plan recovery", "task list"]
    );
}

#[test]
fn expected_recovery_waits_for_start_then_completion() {
    let runner = ScriptedRunner::new(CommandOutput::new(true, TWO_RUNNING))
        .then_ok(true, DEPLOY_COMPLETE)
        .then_ok(true, RECOVERY_IDLE)
        .then_ok(true, RECOVERY_RUNNING)
        .then_ok(true, RECOVERY_RUNNING)
        .then_ok(true, RECOVERY_DONE);
    plan::check_healthy(&runner, &check(true), fast(), fast(), None).unwrap();
    let commands = runner.commands.borrow();
    assert_eq!(
        *commands,
        vec![
            "plan deploy",
            "plan recovery",
            "plan recovery",
            "plan recovery",
            "plan recovery",
            "task list"
        ]
    );
}

#[test]
fn recovery_that_never_starts_reports_stage() {
    let runner = ScriptedRunner::new(CommandOutput::new(true, RECOVERY_IDLE))
        .then_ok(true, DEPLOY_COMPLETE);
    let timing = RetryTiming::new(Duration::from_millis(5), Duration::from_millis(20)).unwrap();
    let err = plan::check_healthy(&runner, &check(true), timing, fast(), None).unwrap_err();
    assert!(matches!(
        err,
        HealthError::TimedOut {
            stage: HealthStage::RecoveryStarted,
            ..
        }
    ));
}

#[test]
fn too_few_running_tasks_reports_stage() {
    let runner = ScriptedRunner::new(CommandOutput::new(true, r#"[]"#))
        .then_ok(true, DEPLOY_COMPLETE)
        .then_ok(true, RECOVERY_IDLE);
    let timing = RetryTiming::new(Duration::from_millis(5), Duration::from_millis(20)).unwrap();
    let err = plan::check_healthy(&runner, &check(false), fast(), timing, None).unwrap_err();
    assert!(matches!(
        err,
        HealthError::TimedOut {
            stage: HealthStage::TasksRunning,
            ..
        }
    ));
}

#[test]
fn cancelled_health_check_stops_at_first_wait() {
    let runner = ScriptedRunner::new(CommandOutput::new(true, DEPLOY_IN_PROGRESS));
    let token = CancelToken::new();
    token.cancel();
    let err = plan::check_healthy(&runner, &check(false), fast(), fast(), Some(&token)).unwrap_err();
    assert!(matches!(
        err,
        HealthError::Cancelled {
            stage: HealthStage::DeploymentComplete
        }
    ));
    assert_eq!(runner.calls(), 1);
}
