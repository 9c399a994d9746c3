// ABOUTME: Process runner seam and the fail-fast policy applied on top of it.
// ABOUTME: ProcessRunner spawns real processes via tokio; tests substitute their own runner.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::{CommandError, CommandOutput, CommandSpec, format_output};
use crate::diagnostics::{Diagnostics, Warning};

/// Executes a command and captures its output. Exit status is not interpreted here.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, command: &CommandSpec) -> std::io::Result<CommandOutput>;
}

/// Spawns the command as a child process and waits for it to finish.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, command: &CommandSpec) -> std::io::Result<CommandOutput> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = command.cwd() {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }
}

/// What a non-zero exit means for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Failure aborts the run.
    FailFast,
    /// Failure is logged as a warning and execution continues.
    /// Reserved for idempotent cleanup such as removing things that may not exist.
    Ignore,
}

/// Run `command` and apply `policy` to its outcome.
///
/// Under [`ErrorPolicy::FailFast`] a non-zero exit (or a failure to spawn)
/// becomes a [`CommandError`]; under [`ErrorPolicy::Ignore`] it is recorded in
/// `diag` and the captured output is returned.
pub async fn run(
    runner: &dyn CommandRunner,
    command: &CommandSpec,
    policy: ErrorPolicy,
    diag: &mut Diagnostics,
) -> Result<CommandOutput, CommandError> {
    let event = command.event_name();
    let service = command.service_name().unwrap_or("-");
    tracing::debug!(%event, %service, command = %command, "running command");

    let output = match runner.execute(command).await {
        Ok(output) => output,
        Err(source) => {
            if policy == ErrorPolicy::Ignore {
                diag.warn(Warning::ignored_command(format!(
                    "could not execute {command}: {source}"
                )));
                return Ok(CommandOutput {
                    stderr: source.to_string(),
                    ..Default::default()
                });
            }
            tracing::error!(%event, %service, command = %command, "failed to execute: {}", source);
            return Err(CommandError::Spawn {
                command: command.to_string(),
                source,
            });
        }
    };

    if !output.stdout.trim().is_empty() {
        tracing::debug!(%event, %service, "{} output:\n{}", event, format_output(&output.stdout));
    }
    if !output.stderr.trim().is_empty() {
        tracing::debug!(%event, %service, "{} stderr:\n{}", event, format_output(&output.stderr));
    }

    if output.success() {
        tracing::info!(%event, %service, "command succeeded: {}", command);
        return Ok(output);
    }

    match policy {
        ErrorPolicy::Ignore => {
            diag.warn(Warning::ignored_command(format!(
                "command failed (ignored): {command}"
            )));
            Ok(output)
        }
        ErrorPolicy::FailFast => {
            tracing::error!(%event, %service, "command failed: {}", command);
            Err(CommandError::Failed {
                command: command.to_string(),
                service: command.service_name().map(str::to_string),
                event,
                exit_code: output.exit_code,
                stderr: format_output(&output.stderr),
            })
        }
    }
}
