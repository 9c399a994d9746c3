// ABOUTME: Runner that records commands instead of executing them.
// ABOUTME: Backs --dry-run and lets tests script exit codes per command.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::{CommandOutput, CommandRunner, CommandSpec};

/// Records every command it is asked to run and reports success, unless a
/// failure was scripted for a command line starting with a given prefix.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<CommandSpec>>,
    failures: Mutex<HashMap<String, i32>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any command whose rendered form starts with `prefix` exit with `code`.
    pub fn fail_on(&self, prefix: impl Into<String>, code: i32) {
        self.failures.lock().insert(prefix.into(), code);
    }

    /// Snapshot of the recorded commands, in execution order.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().clone()
    }

    /// Recorded commands rendered as `program arg ...`.
    pub fn command_lines(&self) -> Vec<String> {
        self.commands.lock().iter().map(|c| c.to_string()).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn execute(&self, command: &CommandSpec) -> std::io::Result<CommandOutput> {
        let line = command.to_string();
        tracing::info!(command = %line, "dry run");
        self.commands.lock().push(command.clone());

        let exit_code = self
            .failures
            .lock()
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, code)| *code)
            .unwrap_or(0);

        Ok(CommandOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: Some(exit_code),
        })
    }
}
