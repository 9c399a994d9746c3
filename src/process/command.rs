// ABOUTME: Structured command description and captured process output.
// ABOUTME: Carries service and event context for logging alongside the argv.

use std::fmt;
use std::path::{Path, PathBuf};

/// A program, its arguments, and the directory to run it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    /// Indices into `args` rendered as `***`.
    masked: Vec<usize>,
    cwd: Option<PathBuf>,
    event: &'static str,
    service: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            masked: Vec::new(),
            cwd: None,
            event: "command",
            service: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// An argument passed to the process as-is but hidden when displayed.
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.masked.push(self.args.len());
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Short event label used in log records, e.g. `push_image`.
    pub fn event(mut self, event: &'static str) -> Self {
        self.event = event;
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn event_name(&self) -> &'static str {
        self.event
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.masked.contains(&i) {
                f.write_str(" ***")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_argv() {
        let cmd = CommandSpec::new("docker")
            .args(["tag", "acme/auth:1.0.1", "acme/auth:latest"])
            .event("tag_image");
        assert_eq!(cmd.to_string(), "docker tag acme/auth:1.0.1 acme/auth:latest");
        assert_eq!(cmd.event_name(), "tag_image");
    }

    #[test]
    fn secret_arguments_are_masked_in_display_only() {
        let cmd = CommandSpec::new("postman")
            .args(["login", "--with-api-key"])
            .secret_arg("pmak-123");
        assert_eq!(cmd.to_string(), "postman login --with-api-key ***");
        assert_eq!(cmd.argv(), ["postman", "login", "--with-api-key", "pmak-123"]);
    }

    #[test]
    fn arguments_are_not_split() {
        let cmd = CommandSpec::new("postman").arg("collection run").arg("a b");
        assert_eq!(cmd.get_args(), ["collection run", "a b"]);
    }
}
