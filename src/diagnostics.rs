// ABOUTME: Diagnostics accumulator for non-fatal problems during a run.
// ABOUTME: Ignored cleanup failures, lost version bumps, and health timeouts land here.

/// Collects non-fatal warnings during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A command that failed under the ignore policy.
    pub fn ignored_command(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::IgnoredCommand,
            message: message.into(),
        }
    }

    /// The version record could not be saved.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Persistence,
            message: message.into(),
        }
    }

    /// A service never became healthy within its retry budget.
    pub fn health_timeout(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HealthTimeout,
            message: message.into(),
        }
    }

    /// The integration test step did not run.
    pub fn tests_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TestsSkipped,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    IgnoredCommand,
    Persistence,
    HealthTimeout,
    TestsSkipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_counts_by_kind() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::ignored_command("docker stop auth"));
        diag.warn(Warning::ignored_command("docker rm auth"));
        diag.warn(Warning::persistence("read-only file system"));

        assert!(diag.has_warnings());
        assert_eq!(diag.count(WarningKind::IgnoredCommand), 2);
        assert_eq!(diag.count(WarningKind::Persistence), 1);
        assert_eq!(diag.count(WarningKind::HealthTimeout), 0);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(
            Warning::health_timeout("x").kind,
            WarningKind::HealthTimeout
        );
        assert_eq!(Warning::tests_skipped("x").kind, WarningKind::TestsSkipped);
    }
}
