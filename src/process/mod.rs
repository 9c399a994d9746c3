// ABOUTME: External process invocation with fail-fast-unless-ignored semantics.
// ABOUTME: Commands are structured argument lists, never interpolated shell strings.

mod command;
mod error;
mod output;
mod recording;
mod runner;

pub use command::{CommandOutput, CommandSpec};
pub use error::CommandError;
pub use output::format_output;
pub use recording::RecordingRunner;
pub use runner::{CommandRunner, ErrorPolicy, ProcessRunner, run};
