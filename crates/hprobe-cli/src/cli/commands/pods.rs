//! `hprobe pods` – list pods of one type.

use anyhow::Result;
use hprobe_core::runner::CommandRunner;
use hprobe_core::tasks;

pub fn run_pods<R: CommandRunner>(runner: &R, list_command: &str, prefix: &str) -> Result<()> {
    let pods = tasks::list_pod_instances(runner, list_command, prefix)?;
    if pods.is_empty() {
        println!("No pods matching '{}'.", prefix);
    }
    for pod in pods {
        println!("{}", pod);
    }
    Ok(())
}
