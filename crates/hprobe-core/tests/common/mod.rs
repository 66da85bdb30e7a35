//! Scripted `CommandRunner` for driving checks without docker.

use std::cell::RefCell;
use std::collections::VecDeque;

use hprobe_core::runner::{CommandOutput, CommandRunner, RunError};

/// Replays queued results in order; once the script runs out, repeats `fallback`.
pub struct ScriptedRunner {
    script: RefCell<VecDeque<Result<CommandOutput, RunError>>>,
    fallback: CommandOutput,
    pub commands: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(fallback: CommandOutput) -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            fallback,
            commands: RefCell::new(Vec::new()),
        }
    }

    pub fn then_ok(self, success: bool, output: &str) -> Self {
        self.script
            .borrow_mut()
            .push_back(Ok(CommandOutput::new(success, output)));
        self
    }

    pub fn then_err(self, err: RunError) -> Self {
        self.script.borrow_mut().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.commands.borrow().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str) -> Result<CommandOutput, RunError> {
        self.commands.borrow_mut().push(command.to_string());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}
