//! `hprobe exec` – retry an arbitrary shell command until it succeeds.

use anyhow::Result;
use hprobe_core::retry::{self, RetryTiming};
use hprobe_core::runner::{CommandOutput, CommandRunner};

pub fn run_exec<R: CommandRunner>(runner: &R, timing: RetryTiming, args: &[String]) -> Result<()> {
    let command = args.join(" ");
    tracing::info!(%command, ?timing, "exec");
    let config = timing.accept_when(|out: &CommandOutput| out.success);
    let outcome = retry::run_until(&config, || runner.run(&command))?;
    print!("{}", outcome.last().output);
    outcome.into_accepted(timing.budget)?;
    Ok(())
}
