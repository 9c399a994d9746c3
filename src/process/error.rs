// ABOUTME: Error type for external command failures.
// ABOUTME: Keeps enough context (service, event, argv) to reproduce the failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    /// The process ran and exited non-zero.
    #[error("command failed{}: {command} (exit code {})", service_suffix(.service), exit_label(.exit_code))]
    Failed {
        command: String,
        service: Option<String>,
        event: &'static str,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The process could not be started at all.
    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { exit_code, .. } => *exit_code,
            CommandError::Spawn { .. } => None,
        }
    }
}

fn service_suffix(service: &Option<String>) -> String {
    service
        .as_ref()
        .map(|s| format!(" for {s}"))
        .unwrap_or_default()
}

fn exit_label(code: &Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}
